use core::cell::RefCell;

use atat::asynch::AtatClient;
use atat::UrcSubscription;
use embassy_futures::join::join;
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

use super::Ril;
use crate::command::Urc;
use crate::config::RilConfig;
use crate::host::{Deferred, Host, InstanceId};

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: Instant,
    instance: InstanceId,
    task: Deferred,
}

enum Next {
    Due(InstanceId, Deferred),
    At(Instant),
    Empty,
}

/// Deferred tasks ordered by due time, for hosts that implement
/// [`Host::schedule`] by pushing here. Tasks due at the same instant run in
/// the order they were scheduled.
pub struct TimerQueue<M: RawMutex, const N: usize> {
    tasks: BlockingMutex<M, RefCell<Vec<Scheduled, N>>>,
    signal: Signal<M, ()>,
}

impl<M: RawMutex, const N: usize> Default for TimerQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> TimerQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            tasks: BlockingMutex::new(RefCell::new(Vec::new())),
            signal: Signal::new(),
        }
    }

    pub fn push(&self, instance: InstanceId, task: Deferred, delay: Duration) {
        let scheduled = Scheduled {
            at: Instant::now() + delay,
            instance,
            task,
        };

        if self
            .tasks
            .lock(|tasks| tasks.borrow_mut().push(scheduled))
            .is_err()
        {
            warn!("[{}] deferred queue full, dropping {:?}", instance.id(), task);
            return;
        }

        self.signal.signal(());
    }

    pub fn len(&self) -> usize {
        self.tasks.lock(|tasks| tasks.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poll_next(&self) -> Next {
        self.tasks.lock(|tasks| {
            let mut tasks = tasks.borrow_mut();
            let Some((index, at)) = tasks
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| s.at)
                .map(|(i, s)| (i, s.at))
            else {
                return Next::Empty;
            };

            if at <= Instant::now() {
                let s = tasks.remove(index);
                Next::Due(s.instance, s.task)
            } else {
                Next::At(at)
            }
        })
    }

    /// Waits for the earliest task to become due.
    pub async fn next(&self) -> (InstanceId, Deferred) {
        loop {
            match self.poll_next() {
                Next::Due(instance, task) => return (instance, task),
                Next::At(at) => {
                    select(Timer::at(at), self.signal.wait()).await;
                }
                Next::Empty => self.signal.wait().await,
            }
        }
    }
}

/// Background runner driving a [`Ril`].
///
/// Runs deferred tasks on the command context as they become due and feeds
/// unsolicited events from the atat ingress to the router. Call `.run()` in
/// a background task.
pub struct Runner<
    'd,
    M: RawMutex,
    AT: AtatClient,
    H: Host,
    C: RilConfig,
    const N: usize,
    const URC_CAPACITY: usize,
    const URC_SUBSCRIBERS: usize,
> {
    ril: &'d Ril<M, AT, H, C>,
    queue: &'d TimerQueue<M, N>,
    urc_subscription: UrcSubscription<'d, Urc, URC_CAPACITY, URC_SUBSCRIBERS>,
}

impl<
        'd,
        M: RawMutex,
        AT: AtatClient,
        H: Host,
        C: RilConfig,
        const N: usize,
        const URC_CAPACITY: usize,
        const URC_SUBSCRIBERS: usize,
    > Runner<'d, M, AT, H, C, N, URC_CAPACITY, URC_SUBSCRIBERS>
{
    pub fn new(
        ril: &'d Ril<M, AT, H, C>,
        queue: &'d TimerQueue<M, N>,
        urc_subscription: UrcSubscription<'d, Urc, URC_CAPACITY, URC_SUBSCRIBERS>,
    ) -> Self {
        Self {
            ril,
            queue,
            urc_subscription,
        }
    }

    pub async fn run(&mut self) -> ! {
        let ril = self.ril;
        let queue = self.queue;

        loop {
            let deferred = async {
                loop {
                    let (instance, task) = queue.next().await;
                    ril.run_deferred(instance, task).await;
                }
            };

            let urcs = async {
                loop {
                    let urc = self.urc_subscription.next_message_pure().await;
                    ril.on_unsolicited(urc);
                }
            };

            join(deferred, urcs).await;
        }
    }
}
