use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use atat::asynch::AtatClient;
use atat::{AtatCmd, CmeError, InternalError};
use embassy_time::Duration;

use crate::config::{DataBearer, PropertyValue, RilConfig, MULTI_INSTANCE_PROPERTY};
use crate::error::{Error, RequestError};
use crate::host::{Deferred, Event, Host, InstanceId, Token};
use crate::response::Response;

/// Scripted final result of one command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `OK`, preceded by the given intermediate lines.
    Ok(String),
    Cme(CmeError),
    /// Plain `ERROR`.
    Error,
    Timeout,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Ok(body.to_string())
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    sent: Vec<String>,
}

/// AT client answering from a script keyed by command text. Unscripted
/// commands succeed without intermediate lines.
#[derive(Debug, Clone, Default)]
pub struct ScriptedModem {
    script: Rc<RefCell<Script>>,
}

impl ScriptedModem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for the next time `command` is sent.
    pub fn reply(&self, command: &str, reply: Reply) {
        self.script
            .borrow_mut()
            .replies
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every command line sent so far, terminators stripped.
    pub fn sent(&self) -> Vec<String> {
        self.script.borrow().sent.clone()
    }
}

impl AtatClient for ScriptedModem {
    async fn send<Cmd: AtatCmd>(&mut self, cmd: &Cmd) -> Result<Cmd::Response, atat::Error> {
        let mut buf = std::vec![0u8; Cmd::MAX_LEN];
        let len = cmd.write(&mut buf);
        let text = std::str::from_utf8(&buf[..len])
            .map_err(|_| atat::Error::Write)?
            .trim_end_matches(['\r', '\n', '\x1a'])
            .to_string();

        let reply = {
            let mut script = self.script.borrow_mut();
            script.sent.push(text.clone());
            script
                .replies
                .get_mut(&text)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Reply::ok(""))
        };

        match reply {
            Reply::Ok(body) => cmd.parse(Ok(body.as_bytes())),
            Reply::Cme(e) => cmd.parse(Err(InternalError::CmeError(e))),
            Reply::Error => cmd.parse(Err(InternalError::Error)),
            Reply::Timeout => cmd.parse(Err(InternalError::Timeout)),
        }
    }
}

type Completion = (InstanceId, Token, Result<Response, RequestError>);

/// Host recording everything the adapter reports.
#[derive(Debug, Default)]
pub struct RecordingHost {
    completions: RefCell<Vec<Completion>>,
    events: RefCell<Vec<(InstanceId, Event)>>,
    scheduled: RefCell<Vec<(InstanceId, Deferred, Duration)>>,
    pending: RefCell<VecDeque<(InstanceId, Deferred)>>,
}

impl RecordingHost {
    pub fn completions(&self) -> Vec<Completion> {
        self.completions.borrow().clone()
    }

    pub fn events(&self) -> Vec<(InstanceId, Event)> {
        self.events.borrow().clone()
    }

    pub fn scheduled(&self) -> Vec<(InstanceId, Deferred, Duration)> {
        self.scheduled.borrow().clone()
    }

    /// Oldest scheduled task not yet run.
    pub fn next_pending(&self) -> Option<(InstanceId, Deferred)> {
        self.pending.borrow_mut().pop_front()
    }

    /// Forgets everything recorded so far.
    pub fn take(&self) {
        self.completions.borrow_mut().clear();
        self.events.borrow_mut().clear();
        self.scheduled.borrow_mut().clear();
        self.pending.borrow_mut().clear();
    }
}

impl Host for RecordingHost {
    fn complete(&self, instance: InstanceId, token: Token, result: Result<Response, RequestError>) {
        self.completions.borrow_mut().push((instance, token, result));
    }

    fn notify(&self, instance: InstanceId, event: Event) {
        self.events.borrow_mut().push((instance, event));
    }

    fn schedule(&self, instance: InstanceId, task: Deferred, delay: Duration) {
        self.scheduled.borrow_mut().push((instance, task, delay));
        self.pending.borrow_mut().push_back((instance, task));
    }
}

/// External bearer reporting a scripted sequence of states.
#[derive(Debug, Default)]
pub struct FakeBearer {
    statuses: RefCell<VecDeque<&'static str>>,
    requested_apn: RefCell<Option<String>>,
    configured: Cell<bool>,
}

impl FakeBearer {
    pub fn with_statuses(statuses: &[&'static str]) -> Self {
        Self {
            statuses: RefCell::new(statuses.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn requested_apn(&self) -> Option<String> {
        self.requested_apn.borrow().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.configured.get()
    }
}

impl DataBearer for FakeBearer {
    async fn request_up(&self, apn: &str) -> Result<(), Error> {
        *self.requested_apn.borrow_mut() = Some(apn.to_string());
        Ok(())
    }

    async fn status(&self) -> Result<heapless::String<64>, Error> {
        let status = self.statuses.borrow_mut().pop_front().unwrap_or("STATE=down");
        heapless::String::try_from(status).map_err(|_| Error::Overflow)
    }

    async fn configure_interface(&self) -> Result<(), Error> {
        self.configured.set(true);
        Ok(())
    }
}

/// Property map standing in for the environment.
#[derive(Debug, Default)]
pub struct TestConfig {
    properties: HashMap<String, String>,
    bearer: Option<FakeBearer>,
}

impl TestConfig {
    pub fn multi_instance() -> Self {
        Self::default().with(MULTI_INSTANCE_PROPERTY, "dsds")
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_bearer(mut self, bearer: FakeBearer) -> Self {
        self.bearer = Some(bearer);
        self
    }
}

impl RilConfig for TestConfig {
    type Bearer = FakeBearer;

    const BEARER_POLL_INTERVAL: Duration = Duration::from_millis(1);

    fn property(&self, key: &str) -> Option<PropertyValue> {
        self.properties
            .get(key)
            .and_then(|v| PropertyValue::try_from(v.as_str()).ok())
    }

    fn bearer(&self) -> Option<&FakeBearer> {
        self.bearer.as_ref()
    }
}
