pub mod control;
pub mod runner;
pub mod state;

mod calls;
mod data;
mod radio;
mod urc_handler;

use core::cell::RefCell;

use atat::asynch::AtatClient;
use atat::AtatCmd;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Duration;

use crate::card::Subscriptions;
use crate::config::RilConfig;
use crate::error::{Error, RequestError};
use crate::host::{Deferred, Event, Host, InstanceId, Token, MAX_INSTANCES};
use crate::response::Response;

use self::calls::CallTracker;
use self::state::State;
use self::urc_handler::Simulation;

/// Serialized access to the AT channel. Both phases of a two-phase command
/// run under the same lock.
pub struct AtHandle<M: RawMutex, AT: AtatClient>(Mutex<M, AT>);

impl<M: RawMutex, AT: AtatClient> AtHandle<M, AT> {
    pub fn new(at: AT) -> Self {
        Self(Mutex::new(at))
    }

    async fn send<Cmd: AtatCmd>(&self, cmd: &Cmd) -> Result<Cmd::Response, atat::Error> {
        self.0.lock().await.send(cmd).await
    }

    /// Sends `cmd`, then `payload` if the modem prompted for it.
    async fn send_with_payload<Cmd: AtatCmd, P: AtatCmd>(
        &self,
        cmd: &Cmd,
        payload: &P,
    ) -> Result<P::Response, atat::Error> {
        let mut at = self.0.lock().await;
        at.send(cmd).await?;
        trace!("AT> <payload>");
        at.send(payload).await
    }
}

/// The adapter: every piece of state shared between the request
/// dispatcher, the deferred tasks and the unsolicited line router.
pub struct Ril<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> {
    at: AtHandle<M, AT>,
    host: H,
    config: C,
    instances: u8,
    state: State<M>,
    calls: BlockingMutex<M, RefCell<[CallTracker; MAX_INSTANCES]>>,
    subscriptions: BlockingMutex<M, RefCell<Subscriptions>>,
    simulation: BlockingMutex<M, RefCell<Simulation>>,
}

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    pub fn new(at: AT, host: H, config: C) -> Self {
        let instances = if config.is_multi_instance() { 2 } else { 1 };
        info!("Serving {} instance(s)", instances);

        Self {
            at: AtHandle::new(at),
            host,
            config,
            instances,
            state: State::new(),
            calls: BlockingMutex::new(RefCell::new(Default::default())),
            subscriptions: BlockingMutex::new(RefCell::new(Subscriptions::new())),
            simulation: BlockingMutex::new(RefCell::new(Simulation::default())),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// The configured instance with id `id`.
    pub fn instance(&self, id: u8) -> Option<InstanceId> {
        InstanceId::new(id).filter(|i| i.id() < self.instances)
    }

    pub fn instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        (0..self.instances).filter_map(InstanceId::new)
    }

    pub fn is_multi_instance(&self) -> bool {
        self.instances > 1
    }

    pub fn version(&self) -> &'static str {
        concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
    }

    /// Sends one command. A modem that answers, even with an error or a
    /// malformed reply, keeps the channel open; read, write and timeout
    /// failures close the session before being returned.
    pub(crate) async fn send<Cmd: AtatCmd>(&self, cmd: &Cmd) -> Result<Cmd::Response, Error> {
        if self.state.is_closed(None) {
            return Err(Error::ChannelClosed);
        }
        let result = self.at.send(cmd).await;
        self.classify(result)
    }

    /// Sends a command whose outcome does not matter. Only channel failures
    /// are returned.
    pub(crate) async fn send_unchecked<Cmd: AtatCmd>(&self, cmd: &Cmd) -> Result<(), Error> {
        match self.send(cmd).await {
            Ok(_) | Err(Error::Rejected(_)) | Err(Error::Parse(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Sends a command, then `payload` once the modem prompts for it.
    pub(crate) async fn send_with_payload<Cmd: AtatCmd, P: AtatCmd>(
        &self,
        cmd: &Cmd,
        payload: &P,
    ) -> Result<P::Response, Error> {
        if self.state.is_closed(None) {
            return Err(Error::ChannelClosed);
        }
        let result = self.at.send_with_payload(cmd, payload).await;
        self.classify(result)
    }

    fn classify<T>(&self, result: Result<T, atat::Error>) -> Result<T, Error> {
        result.map_err(|e| {
            let e = Error::from(e);
            if e.is_channel_failure() {
                error!("AT channel failure: {:?}", e);
                self.on_channel_timeout();
            } else {
                debug!("AT command failed: {:?}", e);
            }
            e
        })
    }

    fn is_active(&self, instance: InstanceId) -> bool {
        instance.id() < self.instances
    }

    pub(crate) fn complete(
        &self,
        instance: InstanceId,
        token: Token,
        result: Result<Response, RequestError>,
    ) {
        if let Err(e) = &result {
            debug!("[{}] request {:?} failed: {:?}", instance.id(), token, e);
        }
        self.host.complete(instance, token, result);
    }

    pub(crate) fn notify(&self, instance: InstanceId, event: Event) {
        if !self.is_active(instance) {
            debug!("[{}] dropping event for inactive instance", instance.id());
            return;
        }
        self.host.notify(instance, event);
    }

    pub(crate) fn schedule(&self, instance: InstanceId, task: Deferred, delay: Duration) {
        if !self.is_active(instance) {
            debug!("[{}] dropping task for inactive instance", instance.id());
            return;
        }
        trace!("[{}] scheduling {:?} in {} ms", instance.id(), task, delay.as_millis());
        self.host.schedule(instance, task, delay);
    }

    /// Runs a task previously handed to [`Host::schedule`]. Must be called on
    /// the command context.
    pub async fn run_deferred(&self, instance: InstanceId, task: Deferred) {
        debug!("[{}] running {:?}", instance.id(), task);
        let result = match task {
            Deferred::Initialize => self.initialize(instance).await,
            Deferred::RadioPowerOn => self.on_radio_power_on(instance).await,
            Deferred::PollSimState => self.poll_sim_state(instance).await,
            Deferred::SimReady => self.on_sim_ready(instance).await,
            Deferred::CallStateChanged => {
                self.notify(instance, Event::CallStateChanged);
                Ok(())
            }
            Deferred::DataCallListChanged => {
                self.report_data_calls(instance).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("[{}] {:?} failed: {:?}", instance.id(), task, e);
        }
    }
}
