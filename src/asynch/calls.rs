use atat::asynch::AtatClient;
use atat::AtatCmd;
use embassy_sync::blocking_mutex::raw::RawMutex;

use super::Ril;
use crate::call::{Call, CallList, CallState};
use crate::command::call_control::{
    Answer, CallHold, Clir, Dial, HangUp, HoldAction, ListCurrentCalls, SendDtmf,
};
use crate::config::RilConfig;
use crate::error::RequestError;
use crate::host::{Deferred, Host, InstanceId};
use crate::response::Response;

/// Per-instance memory between two call list refreshes.
#[derive(Debug, Default, Clone)]
pub(crate) struct CallTracker {
    /// Index of the call last seen incoming or waiting.
    incoming_or_waiting: Option<u8>,
    /// Call lists withheld since the last accepted refresh.
    repoll_count: u8,
    /// An answer or switch was requested since the last refresh.
    expect_answer: bool,
}

/// Outcome of comparing a fresh call list against the tracker.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Accept { repoll: bool },
    Withhold,
}

impl CallTracker {
    /// Records `calls` and decides whether they may be reported.
    ///
    /// Some modems briefly list a ringing call as active although nobody
    /// answered it. Such a list is withheld a bounded number of times.
    fn observe(&mut self, calls: &[Call], max_repolls: u8) -> Verdict {
        let previous = self.incoming_or_waiting.take();

        let mut need_repoll = false;
        for call in calls {
            if call.state.is_incoming_or_waiting() {
                self.incoming_or_waiting = Some(call.index);
            }
            if cfg!(feature = "poll-call-state") || call.state.is_transient() {
                need_repoll = true;
            }
        }

        if let Some(previous) = previous {
            let answered_unasked = self.incoming_or_waiting.is_none()
                && !self.expect_answer
                && calls
                    .iter()
                    .any(|c| c.index == previous && c.state == CallState::Active);

            if answered_unasked && self.repoll_count < max_repolls {
                self.repoll_count += 1;
                return Verdict::Withhold;
            }
        }

        self.expect_answer = false;
        self.repoll_count = 0;
        Verdict::Accept {
            repoll: need_repoll,
        }
    }
}

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    /// Reads `+CLCC` and replaces the call list in full.
    pub(crate) async fn current_calls(&self, instance: InstanceId) -> Result<Response, RequestError> {
        let reply = self.send(&ListCurrentCalls).await?;

        let mut calls = CallList::new();
        for line in reply.prefixed("+CLCC:") {
            match Call::from_clcc(line) {
                Ok(call) => {
                    if calls.push(call).is_err() {
                        warn!("[{}] call list full", instance.id());
                        break;
                    }
                }
                Err(e) => debug!("[{}] skipping call line: {:?}", instance.id(), e),
            }
        }

        let verdict = self.calls.lock(|trackers| {
            trackers.borrow_mut()[instance.index()].observe(&calls, C::MAX_ERRONEOUS_ANSWER_REPOLLS)
        });

        match verdict {
            Verdict::Withhold => {
                warn!("[{}] call answered without request, polling again", instance.id());
                Err(RequestError::GenericFailure)
            }
            Verdict::Accept { repoll } => {
                if repoll {
                    self.schedule(instance, Deferred::CallStateChanged, C::CALL_REPOLL_INTERVAL);
                }
                Ok(Response::Calls(calls))
            }
        }
    }

    fn expect_answer(&self, instance: InstanceId) {
        self.calls
            .lock(|trackers| trackers.borrow_mut()[instance.index()].expect_answer = true);
    }

    /// Sends a call control command. The outcome is learnt from the next
    /// call list refresh, so the reply is not inspected.
    async fn fire_and_confirm<Cmd: AtatCmd>(&self, cmd: &Cmd) -> Result<Response, RequestError> {
        self.send_unchecked(cmd).await?;
        Ok(Response::None)
    }

    pub(crate) async fn dial(&self, address: &str, clir: Clir) -> Result<Response, RequestError> {
        self.fire_and_confirm(&Dial::new(address, clir)?).await
    }

    pub(crate) async fn answer(&self, instance: InstanceId) -> Result<Response, RequestError> {
        self.expect_answer(instance);
        self.fire_and_confirm(&Answer).await
    }

    pub(crate) async fn hold(
        &self,
        instance: InstanceId,
        action: HoldAction,
    ) -> Result<Response, RequestError> {
        match action {
            HoldAction::HoldAllExcept(party) if !(1..=9).contains(&party) => {
                return Err(RequestError::GenericFailure)
            }
            HoldAction::HoldActiveAcceptOther => self.expect_answer(instance),
            _ => {}
        }
        self.fire_and_confirm(&CallHold::from(action)).await
    }

    pub(crate) async fn reject_incoming(&self) -> Result<Response, RequestError> {
        self.fire_and_confirm(&HangUp).await
    }

    pub(crate) async fn dtmf(&self, tone: char) -> Result<Response, RequestError> {
        self.fire_and_confirm(&SendDtmf { tone }).await
    }
}
