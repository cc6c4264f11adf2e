use atat::asynch::AtatClient;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use super::state::RadioState;
use super::Ril;
use crate::command::Urc;
use crate::config::RilConfig;
use crate::host::{Deferred, Event, Host, InstanceId};

/// Alternation of ring and SMS notifications when two instances share one
/// modem. The modem cannot tell which instance an event belongs to, so
/// every other one goes to the second instance.
#[derive(Debug, Default)]
pub(crate) struct Simulation {
    ring_counter: u32,
    sms_toggle: bool,
}

impl Simulation {
    fn next_ring(&mut self) -> InstanceId {
        self.ring_counter = self.ring_counter.wrapping_add(1);
        if self.ring_counter % 2 == 0 {
            InstanceId::FIRST
        } else {
            InstanceId::SECOND
        }
    }

    fn next_sms(&mut self) -> InstanceId {
        self.sms_toggle = !self.sms_toggle;
        if self.sms_toggle {
            InstanceId::FIRST
        } else {
            InstanceId::SECOND
        }
    }
}

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    /// Classifies a raw unsolicited line and routes it. `pdu` is the line
    /// following an SMS notification.
    pub fn on_unsolicited_line(&self, line: &str, pdu: Option<&str>) {
        match Urc::classify(line, pdu) {
            Some(urc) => self.on_unsolicited(urc),
            None => trace!("Ignoring unsolicited line: {}", line),
        }
    }

    /// Routes an unsolicited event to its instance. Never touches the AT
    /// channel; command-worthy reactions are scheduled.
    pub fn on_unsolicited(&self, urc: Urc) {
        // Nothing is meaningful before the channel is initialized
        if self.state.radio_state(InstanceId::FIRST) == RadioState::Unavailable {
            debug!("Dropping {:?}, radio unavailable", urc);
            return;
        }

        debug!("URC {:?}", urc);

        match urc {
            Urc::NetworkTime(time) => {
                self.notify(InstanceId::FIRST, Event::NitzTimeReceived(time));
            }
            Urc::CallStateChanged { ring } => {
                let instance = if ring && self.is_multi_instance() {
                    self.simulation.lock(|s| s.borrow_mut().next_ring())
                } else {
                    InstanceId::FIRST
                };

                self.notify(instance, Event::CallStateChanged);
                // Not every modem reports context loss on hangup
                self.schedule(instance, Deferred::DataCallListChanged, Duration::from_ticks(0));
            }
            Urc::RegistrationChanged => {
                self.notify(InstanceId::FIRST, Event::VoiceNetworkStateChanged);
                self.schedule(
                    InstanceId::FIRST,
                    Deferred::DataCallListChanged,
                    Duration::from_ticks(0),
                );
            }
            Urc::NewSms(pdu) => {
                let instance = if self.is_multi_instance() {
                    self.simulation.lock(|s| s.borrow_mut().next_sms())
                } else {
                    InstanceId::FIRST
                };
                self.notify(instance, Event::NewSms(pdu));
            }
            Urc::SmsStatusReport(pdu) => {
                self.notify(InstanceId::FIRST, Event::NewSmsStatusReport(pdu));
            }
            Urc::ContextEvent | Urc::ContextError => {
                self.schedule(
                    InstanceId::FIRST,
                    Deferred::DataCallListChanged,
                    Duration::from_ticks(0),
                );
            }
        }
    }
}
