use atat::asynch::AtatClient;
use atat::CmeError;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use super::state::RadioState;
use super::Ril;
use crate::card::{CardStatus, SimStatus};
use crate::command::bounded;
use crate::command::call_control::{
    SetCallWaitingPresentation, SetConnectedLinePresentation, SetSupplementaryServiceNotifications,
};
use crate::command::device_lock::{EnterPin, GetPinStatus, MAX_PIN_LEN};
use crate::command::general::{SetAutoAnswer, SetCharacterSet, SetResultPresentation};
use crate::command::mobile_control::{
    Functionality, GetModuleFunctionality, SetCallMode, SetModuleFunctionality, SetMute,
    SetReportMobileTerminationError, TerminationErrorMode,
};
use crate::command::network_service::SetNetworkRegistrationStatus;
use crate::command::psn::{SetGprsRegistrationStatus, SetPacketDomainEventReporting};
use crate::command::sms::{SelectMessageService, SetMessageFormat, SetNewMessageIndication};
use crate::command::supplementary::SetUssd;
use crate::config::RilConfig;
use crate::error::{Error, RequestError};
use crate::host::{Deferred, Event, Host, InstanceId};
use crate::request::{PinKind, PinRequest};
use crate::response::Response;
use crate::tokenizer::Tokenizer;

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    pub fn query_state(&self, instance: InstanceId) -> RadioState {
        self.state.radio_state(instance)
    }

    /// Writes the readiness of `instance`, reporting the change to the host
    /// and scheduling the follow-up work of the new state.
    pub(crate) fn set_radio_state(&self, instance: InstanceId, state: RadioState) {
        let transition = self.state.set_radio_state(instance, state);
        if !transition.changed() {
            return;
        }

        info!(
            "[{}] radio state {:?} -> {:?}",
            instance.id(),
            transition.previous,
            transition.current
        );
        self.notify(instance, Event::RadioStateChanged(transition.current));

        match transition.current {
            RadioState::On => self.schedule(instance, Deferred::RadioPowerOn, Duration::from_ticks(0)),
            RadioState::SimReady => self.schedule(instance, Deferred::SimReady, Duration::from_ticks(0)),
            _ => {}
        }
    }

    /// Brings a freshly opened channel into a known configuration.
    /// Rejected setup commands are tolerated.
    pub(crate) async fn initialize(&self, instance: InstanceId) -> Result<(), Error> {
        self.set_radio_state(instance, RadioState::Off);

        self.send_unchecked(&SetResultPresentation).await?;
        self.send_unchecked(&SetAutoAnswer { rings: 0 }).await?;
        self.send_unchecked(&SetReportMobileTerminationError {
            n: TerminationErrorMode::Enabled,
        })
        .await?;

        // Location reporting, not every modem supports the extended form
        match self.send(&SetNetworkRegistrationStatus { n: 2 }).await {
            Err(Error::Rejected(_)) => {
                self.send_unchecked(&SetNetworkRegistrationStatus { n: 1 }).await?
            }
            Err(e) if e.is_channel_failure() => return Err(e),
            _ => {}
        }

        self.send_unchecked(&SetGprsRegistrationStatus { n: 1 }).await?;
        self.send_unchecked(&SetCallWaitingPresentation { n: 1 }).await?;
        self.send_unchecked(&SetCallMode { mode: 0 }).await?;
        self.send_unchecked(&SetMute { muted: 0 }).await?;
        self.send_unchecked(&SetSupplementaryServiceNotifications { n: 0, m: 1 })
            .await?;
        self.send_unchecked(&SetConnectedLinePresentation { n: 0 }).await?;
        self.send_unchecked(&SetCharacterSet { chset: "HEX" }).await?;
        self.send_unchecked(&SetUssd { n: 1 }).await?;
        self.send_unchecked(&SetPacketDomainEventReporting { mode: 1, bfr: 0 })
            .await?;
        self.send_unchecked(&SetMessageFormat { mode: 0 }).await?;

        #[cfg(feature = "ti-commands")]
        {
            use crate::command::vendor::{SetCallProgressIndication, SetStatusIndication};

            self.send_unchecked(&SetCallProgressIndication { mode: 3 }).await?;
            self.send_unchecked(&SetStatusIndication { mode: 1 }).await?;
        }

        if self.is_radio_on().await? {
            self.set_radio_state(instance, RadioState::On);
        }

        Ok(())
    }

    pub(crate) async fn on_radio_power_on(&self, instance: InstanceId) -> Result<(), Error> {
        #[cfg(feature = "ti-commands")]
        {
            use crate::command::vendor::{SetCphs, SetNetworkTimeReporting};

            self.send_unchecked(&SetCphs { mode: 1 }).await?;
            self.send_unchecked(&SetNetworkTimeReporting { mode: 1 }).await?;
        }

        self.poll_sim_state(instance).await
    }

    pub(crate) async fn on_sim_ready(&self, _instance: InstanceId) -> Result<(), Error> {
        self.send_unchecked(&SelectMessageService { service: 1 }).await?;
        self.send_unchecked(&SetNewMessageIndication {
            mode: 1,
            mt: 2,
            bm: 2,
            ds: 1,
            bfr: 1,
        })
        .await
    }

    /// One step of the SIM poll. A stale poll, left over from a state that
    /// has since moved on, returns without querying.
    pub(crate) async fn poll_sim_state(&self, instance: InstanceId) -> Result<(), Error> {
        match self.state.radio_state(instance) {
            RadioState::On | RadioState::SimNotReady => {}
            _ => return Ok(()),
        }

        match self.sim_status(instance).await {
            SimStatus::NotReady => {
                self.set_radio_state(instance, RadioState::SimNotReady);
                self.schedule(instance, Deferred::PollSimState, C::SIM_POLL_INTERVAL);
            }
            SimStatus::Ready => self.set_radio_state(instance, RadioState::SimReady),
            status => {
                debug_assert!(status.is_locked_or_absent());
                self.set_radio_state(instance, RadioState::SimLockedOrAbsent);
            }
        }

        Ok(())
    }

    /// Classifies `+CPIN?`. Failures other than a missing SIM are transient.
    pub(crate) async fn sim_status(&self, instance: InstanceId) -> SimStatus {
        if !self.state.radio_state(instance).is_on() {
            return SimStatus::NotReady;
        }

        let reply = match self.send(&GetPinStatus).await {
            Ok(reply) => reply,
            Err(Error::Rejected(Some(CmeError::SimNotInserted))) => return SimStatus::Absent,
            Err(_) => return SimStatus::NotReady,
        };

        let Ok(line) = reply.first_prefixed("+CPIN:") else {
            return SimStatus::Ready;
        };

        match Tokenizer::start(line).and_then(|mut tok| tok.next_str()) {
            Ok(code) => SimStatus::from_code(code),
            Err(_) => {
                warn!("[{}] malformed +CPIN reply", instance.id());
                SimStatus::NotReady
            }
        }
    }

    pub(crate) async fn card_status(&self, instance: InstanceId) -> Result<Response, RequestError> {
        let status = self.sim_status(instance).await;
        let activated = self
            .subscriptions
            .lock(|subs| subs.borrow().is_app_ready(instance.id(), 0));

        Ok(Response::CardStatus(CardStatus::new(status, activated)))
    }

    /// `+CFUN?` reports full functionality. A rejected or malformed reply
    /// counts as off.
    pub(crate) async fn is_radio_on(&self) -> Result<bool, Error> {
        match self.send(&GetModuleFunctionality).await {
            Ok(functionality) => Ok(functionality.is_on()),
            Err(Error::Rejected(_)) | Err(Error::Parse(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn set_radio_power(
        &self,
        instance: InstanceId,
        on: bool,
    ) -> Result<Response, RequestError> {
        let current = self.state.radio_state(instance);

        if !on && current != RadioState::Off {
            self.send(&SetModuleFunctionality {
                fun: Functionality::Minimum,
            })
            .await?;
            self.set_radio_state(instance, RadioState::Off);
        } else if on && current == RadioState::Off {
            let result = self
                .send(&SetModuleFunctionality {
                    fun: Functionality::Full,
                })
                .await;
            match result {
                Ok(_) => {}
                // Some modems reject the command when already on
                Err(Error::Rejected(_)) if self.is_radio_on().await? => {}
                Err(e) => return Err(e.into()),
            }
            self.set_radio_state(instance, RadioState::On);
        }

        Ok(Response::None)
    }

    pub(crate) async fn enter_sim_pin(
        &self,
        instance: InstanceId,
        req: &PinRequest<'_>,
    ) -> Result<Response, RequestError> {
        let needs_new_code = matches!(
            req.kind,
            PinKind::EnterPuk | PinKind::EnterPuk2 | PinKind::ChangePin | PinKind::ChangePin2
        );
        if needs_new_code && req.new_code.is_none() {
            return Err(RequestError::GenericFailure);
        }

        let cmd = EnterPin {
            pin: bounded(req.code, MAX_PIN_LEN)?,
            new_pin: req
                .new_code
                .map(|code| bounded(code, MAX_PIN_LEN))
                .transpose()?,
        };
        match self.send(&cmd).await {
            Ok(_) => {}
            Err(Error::Rejected(_)) => return Err(RequestError::PasswordIncorrect),
            Err(_) => return Err(RequestError::GenericFailure),
        }

        if self.state.radio_state(instance) == RadioState::SimLockedOrAbsent {
            self.set_radio_state(instance, RadioState::SimNotReady);
            self.schedule(instance, Deferred::PollSimState, Duration::from_ticks(0));
        }

        Ok(Response::None)
    }

    /// The channel to the modem is up. Every instance is brought up from
    /// scratch.
    pub fn on_channel_opened(&self) {
        info!("AT channel opened");
        self.state.set_closed(false);
        for instance in self.instances() {
            self.schedule(instance, Deferred::Initialize, Duration::from_ticks(0));
        }
    }

    /// The channel is gone for good. Every instance becomes unavailable.
    pub fn on_channel_closed(&self) {
        info!("AT channel closed");
        self.state.set_closed(true);
        for instance in self.instances() {
            self.set_radio_state(instance, RadioState::Unavailable);
        }
    }

    pub fn on_channel_timeout(&self) {
        error!("AT channel timed out");
        self.on_channel_closed();
    }

    /// Resolves once the channel has been closed.
    pub async fn wait_for_close(&self) {
        self.state.wait_for_close().await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asynch::test_support::{run_scheduled, TestRil};
    use crate::card::{AppState, CardState, SubscriptionStatus, UiccSubscription};
    use crate::host::Token;
    use crate::request::Request;
    use crate::test_helpers::{Reply, ScriptedModem, RecordingHost, TestConfig};
    use embassy_futures::block_on;

    fn ril(modem: &ScriptedModem, config: TestConfig) -> TestRil {
        Ril::new(modem.clone(), RecordingHost::default(), config)
    }

    fn powered_off(modem: &ScriptedModem) -> TestRil {
        let ril = ril(modem, TestConfig::default());
        ril.set_radio_state(InstanceId::FIRST, RadioState::Off);
        ril.host().take();
        ril
    }

    #[test]
    fn power_on_reaches_sim_ready() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CFUN=1", Reply::ok(""));
        modem.reply("AT+CPIN?", Reply::ok("+CPIN: READY"));
        let ril = powered_off(&modem);

        block_on(ril.dispatch(
            InstanceId::FIRST,
            Request::RadioPower { on: true },
            Token(1),
        ));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::On);

        run_scheduled(&ril);

        assert_eq!(
            ril.host().events(),
            [
                (InstanceId::FIRST, Event::RadioStateChanged(RadioState::On)),
                (InstanceId::FIRST, Event::RadioStateChanged(RadioState::SimReady)),
            ]
        );
        assert_eq!(ril.host().completions(), [(InstanceId::FIRST, Token(1), Ok(Response::None))]);
        assert!(modem.sent().iter().any(|c| c == "AT+CNMI=1,2,2,1,1"));
    }

    #[test]
    fn power_on_when_already_on_is_idempotent() {
        let modem = ScriptedModem::new();
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::SimReady);

        block_on(ril.dispatch(
            InstanceId::FIRST,
            Request::RadioPower { on: true },
            Token(7),
        ));

        assert!(modem.sent().is_empty());
        assert!(ril.host().events().is_empty());
        assert_eq!(ril.host().completions(), [(InstanceId::FIRST, Token(7), Ok(Response::None))]);
    }

    #[test]
    fn rejected_power_on_confirmed_by_query() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CFUN=1", Reply::Error);
        modem.reply("AT+CFUN?", Reply::ok("+CFUN: 1"));
        let ril = powered_off(&modem);

        let result = block_on(ril.set_radio_power(InstanceId::FIRST, true));
        assert_eq!(result, Ok(Response::None));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::On);
    }

    #[test]
    fn rejected_power_on_not_confirmed() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CFUN=1", Reply::Error);
        modem.reply("AT+CFUN?", Reply::ok("+CFUN: 0"));
        let ril = powered_off(&modem);

        let result = block_on(ril.set_radio_power(InstanceId::FIRST, true));
        assert_eq!(result, Err(RequestError::GenericFailure));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::Off);
    }

    #[test]
    fn sim_poll_repeats_while_not_ready() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN?", Reply::Cme(CmeError::SimBusy));
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::On);

        block_on(ril.poll_sim_state(InstanceId::FIRST)).unwrap();

        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::SimNotReady);
        assert_eq!(
            ril.host().scheduled(),
            [(InstanceId::FIRST, Deferred::PollSimState, Duration::from_secs(1))]
        );
    }

    #[test]
    fn missing_sim_settles_locked_or_absent() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN?", Reply::Cme(CmeError::SimNotInserted));
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::SimNotReady);

        block_on(ril.poll_sim_state(InstanceId::FIRST)).unwrap();

        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::SimLockedOrAbsent);
        assert!(ril.host().scheduled().is_empty());
    }

    #[test]
    fn stale_sim_poll_is_a_no_op() {
        let modem = ScriptedModem::new();
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::SimReady);

        block_on(ril.poll_sim_state(InstanceId::FIRST)).unwrap();

        assert!(modem.sent().is_empty());
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::SimReady);
    }

    #[test]
    fn sim_status_classification() {
        let modem = ScriptedModem::new();
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::On);

        modem.reply("AT+CPIN?", Reply::ok("+CPIN: SIM PUK"));
        assert_eq!(block_on(ril.sim_status(InstanceId::FIRST)), SimStatus::Puk);

        modem.reply("AT+CPIN?", Reply::ok(""));
        assert_eq!(block_on(ril.sim_status(InstanceId::FIRST)), SimStatus::Ready);

        modem.reply("AT+CPIN?", Reply::Error);
        assert_eq!(block_on(ril.sim_status(InstanceId::FIRST)), SimStatus::NotReady);
    }

    #[test]
    fn card_status_depends_on_activation() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN?", Reply::ok("+CPIN: READY"));
        modem.reply("AT+CPIN?", Reply::ok("+CPIN: READY"));
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::SimReady);

        let Ok(Response::CardStatus(status)) = block_on(ril.card_status(InstanceId::FIRST)) else {
            panic!("no card status");
        };
        assert_eq!(status.card_state, CardState::Present);
        assert_eq!(status.applications[0].app_state, AppState::Detected);

        ril.subscriptions.lock(|subs| {
            subs.borrow_mut().select(UiccSubscription {
                slot: 0,
                app_index: 0,
                sub_type: 0,
                status: SubscriptionStatus::Activate,
            })
        });

        let Ok(Response::CardStatus(status)) = block_on(ril.card_status(InstanceId::FIRST)) else {
            panic!("no card status");
        };
        assert_eq!(status.applications[0].app_state, AppState::Ready);
    }

    #[test]
    fn wrong_pin_is_password_incorrect() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN=\"0000\"", Reply::Cme(CmeError::IncorrectPassword));
        let ril = ril(&modem, TestConfig::default());

        let req = PinRequest {
            kind: PinKind::EnterPin,
            code: "0000",
            new_code: None,
        };
        assert_eq!(
            block_on(ril.enter_sim_pin(InstanceId::FIRST, &req)),
            Err(RequestError::PasswordIncorrect)
        );
    }

    #[test]
    fn accepted_pin_restarts_sim_poll() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN=\"1234\"", Reply::ok(""));
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::SimLockedOrAbsent);

        let req = PinRequest {
            kind: PinKind::EnterPin,
            code: "1234",
            new_code: None,
        };
        assert_eq!(block_on(ril.enter_sim_pin(InstanceId::FIRST, &req)), Ok(Response::None));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::SimNotReady);
        assert_eq!(
            ril.host().scheduled(),
            [(InstanceId::FIRST, Deferred::PollSimState, Duration::from_ticks(0))]
        );
    }

    #[test]
    fn channel_close_makes_every_instance_unavailable() {
        let modem = ScriptedModem::new();
        let ril = ril(&modem, TestConfig::multi_instance());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::On);
        ril.state.set_radio_state(InstanceId::SECOND, RadioState::On);

        ril.on_channel_closed();

        assert_eq!(
            ril.host().events(),
            [
                (InstanceId::FIRST, Event::RadioStateChanged(RadioState::Unavailable)),
                (InstanceId::SECOND, Event::RadioStateChanged(RadioState::Unavailable)),
            ]
        );

        ril.set_radio_state(InstanceId::FIRST, RadioState::On);
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::Unavailable);
        block_on(ril.wait_for_close());
    }

    #[test]
    fn channel_failure_closes_session() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CFUN=0", Reply::Timeout);
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::On);

        assert_eq!(
            block_on(ril.set_radio_power(InstanceId::FIRST, false)),
            Err(RequestError::GenericFailure)
        );
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::Unavailable);
        assert_eq!(
            block_on(ril.send(&GetPinStatus)).map(|_| ()),
            Err(Error::ChannelClosed)
        );
    }

    #[test]
    fn malformed_reply_keeps_channel_open() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CPIN?", Reply::ok("+CPIN: READY\r\n+CPIN: READY\r\n+CPIN: READY"));
        modem.reply("AT+CFUN?", Reply::ok("+CFUN: on"));
        let ril = ril(&modem, TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::On);

        assert_eq!(block_on(ril.sim_status(InstanceId::FIRST)), SimStatus::NotReady);
        assert_eq!(block_on(ril.is_radio_on()), Ok(false));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::On);

        modem.reply("AT+CPIN?", Reply::ok("+CPIN: READY"));
        assert_eq!(block_on(ril.sim_status(InstanceId::FIRST)), SimStatus::Ready);
    }

    #[test]
    fn oversized_pin_is_not_sent() {
        let modem = ScriptedModem::new();
        let ril = ril(&modem, TestConfig::default());

        let req = PinRequest {
            kind: PinKind::EnterPin,
            code: "12345678901234567890",
            new_code: None,
        };
        assert_eq!(
            block_on(ril.enter_sim_pin(InstanceId::FIRST, &req)),
            Err(RequestError::GenericFailure)
        );
        assert!(modem.sent().is_empty());
    }

    #[test]
    fn initialization_sequence() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CREG=2", Reply::Error);
        modem.reply("AT+CFUN?", Reply::ok("+CFUN: 1"));
        let ril = ril(&modem, TestConfig::default());

        ril.on_channel_opened();
        assert_eq!(
            ril.host().scheduled(),
            [(InstanceId::FIRST, Deferred::Initialize, Duration::from_ticks(0))]
        );
        block_on(ril.initialize(InstanceId::FIRST)).unwrap();

        let sent = modem.sent();
        assert_eq!(&sent[..5], ["ATE0Q0V1", "ATS0=0", "AT+CMEE=1", "AT+CREG=2", "AT+CREG=1"]);
        assert_eq!(sent.last().map(|s| s.as_str()), Some("AT+CFUN?"));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::On);
        assert_eq!(
            ril.host().events(),
            [
                (InstanceId::FIRST, Event::RadioStateChanged(RadioState::Off)),
                (InstanceId::FIRST, Event::RadioStateChanged(RadioState::On)),
            ]
        );
    }
}
