use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;
use serde::Serialize;

use crate::host::{InstanceId, MAX_INSTANCES};

/// Readiness of one instance, from the adapter's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    /// The channel to the modem is down.
    Unavailable,
    Off,
    /// Powered, SIM status not yet known.
    On,
    SimNotReady,
    SimLockedOrAbsent,
    SimReady,
}

impl RadioState {
    pub fn is_on(self) -> bool {
        !matches!(self, Self::Unavailable | Self::Off)
    }
}

/// Result of a state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: RadioState,
    pub current: RadioState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Readiness of every instance plus the channel closed flag, behind one
/// lock.
pub struct State<M: RawMutex> {
    shared: Mutex<M, RefCell<Shared>>,
}

struct Shared {
    radio: [RadioState; MAX_INSTANCES],
    closed: bool,
    state_waker: WakerRegistration,
}

impl<M: RawMutex> Default for State<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> State<M> {
    pub const fn new() -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                radio: [RadioState::Unavailable; MAX_INSTANCES],
                closed: false,
                state_waker: WakerRegistration::new(),
            })),
        }
    }

    pub fn radio_state(&self, instance: InstanceId) -> RadioState {
        self.shared.lock(|s| s.borrow().radio[instance.index()])
    }

    /// Stores `state` for `instance`, coerced to
    /// [`RadioState::Unavailable`] once the channel is closed.
    pub fn set_radio_state(&self, instance: InstanceId, state: RadioState) -> Transition {
        self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            let previous = s.radio[instance.index()];
            let current = if s.closed {
                RadioState::Unavailable
            } else {
                state
            };

            if previous != current {
                s.radio[instance.index()] = current;
                s.state_waker.wake();
            }

            Transition { previous, current }
        })
    }

    pub fn set_closed(&self, closed: bool) {
        self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            s.closed = closed;
            s.state_waker.wake();
        });
    }

    pub fn is_closed(&self, cx: Option<&mut Context>) -> bool {
        self.shared.lock(|s| {
            let s = &mut *s.borrow_mut();
            if let Some(cx) = cx {
                s.state_waker.register(cx.waker());
            }
            s.closed
        })
    }

    pub async fn wait_for_close(&self) {
        if self.is_closed(None) {
            return;
        }

        poll_fn(|cx| {
            if self.is_closed(Some(cx)) {
                return Poll::Ready(());
            }
            Poll::Pending
        })
        .await
    }
}
