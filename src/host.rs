//! Boundary towards the process hosting the adapter.

use embassy_time::Duration;
use heapless::String;
use serde::Serialize;

use crate::asynch::state::RadioState;
use crate::command::Pdu;
use crate::data_call::DataCallList;
use crate::error::RequestError;
use crate::response::Response;

/// Logical SIM endpoints served by one modem.
pub const MAX_INSTANCES: usize = 2;

/// One logical SIM endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstanceId(u8);

impl InstanceId {
    pub const FIRST: Self = Self(0);
    pub const SECOND: Self = Self(1);

    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < MAX_INSTANCES {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// The peer instance sharing the modem.
    pub const fn other(self) -> Self {
        Self(1 - self.0)
    }
}

/// Opaque host handle identifying one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token(pub u32);

/// Unsolicited notifications towards the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    RadioStateChanged(RadioState),
    CallStateChanged,
    VoiceNetworkStateChanged,
    NewSms(Pdu),
    NewSmsStatusReport(Pdu),
    NitzTimeReceived(String<64>),
    /// The current data call list; empty when it could not be read.
    DataCallListChanged(DataCallList),
    UiccSubscriptionStatusChanged { activated: bool },
    SimStatusChanged,
}

/// Work scheduled back onto the command context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Deferred {
    /// Bring a freshly opened channel into a known state.
    Initialize,
    /// Follow-up commands after the radio turned on.
    RadioPowerOn,
    /// Query the SIM until it settles.
    PollSimState,
    /// Follow-up commands once the SIM is ready.
    SimReady,
    /// Ask the host to refresh the call list.
    CallStateChanged,
    /// Read the data call list and report it unsolicited.
    DataCallListChanged,
}

pub trait Host {
    /// Reports the outcome of a dispatched request, exactly once per token.
    fn complete(&self, instance: InstanceId, token: Token, result: Result<Response, RequestError>);

    fn notify(&self, instance: InstanceId, event: Event);

    /// Runs `task` on the command context after `delay`. Scheduled tasks
    /// cannot be cancelled.
    fn schedule(&self, instance: InstanceId, task: Deferred, delay: Duration);
}
