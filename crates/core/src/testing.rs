//! Recording fakes of the presentation-layer ports.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! downstream test crates. Nothing here touches a real clock: scheduled tasks
//! run only when [`ManualScheduler::fire_all`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::{
    DelayedTask, Navigator, Notifier, Ports, Route, ScheduledTask, Scheduler, Screen,
};
use crate::types::Notice;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records every navigation request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// Screens requested so far, oldest first.
    #[must_use]
    pub fn screens(&self) -> Vec<Screen> {
        lock(&self.routes).iter().map(Route::screen).collect()
    }

    /// Take the recorded routes, leaving none behind.
    #[must_use]
    pub fn take_routes(&self) -> Vec<Route> {
        std::mem::take(&mut *lock(&self.routes))
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

/// Records every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Notices presented so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    /// The most recent notice.
    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        lock(&self.notices).last().copied()
    }

    /// Forget recorded notices.
    pub fn clear(&self) {
        lock(&self.notices).clear();
    }
}

impl Notifier for RecordingNotifier {
    fn present_notice(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

#[derive(Debug, Default)]
struct TaskFlags {
    cancelled: AtomicBool,
    finished: AtomicBool,
}

struct QueuedTask {
    delay: Duration,
    task: DelayedTask,
    flags: Arc<TaskFlags>,
}

/// Handle returned by [`ManualScheduler`].
#[derive(Debug)]
pub struct ManualTask {
    flags: Arc<TaskFlags>,
}

impl ScheduledTask for ManualTask {
    fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
        self.flags.finished.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.flags.finished.load(Ordering::SeqCst)
    }
}

/// Queues delayed tasks until the test fires them.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Vec<QueuedTask>>,
}

impl ManualScheduler {
    /// Run every queued task that has not been cancelled.
    ///
    /// Returns the number of tasks that ran.
    pub fn fire_all(&self) -> usize {
        let queued = std::mem::take(&mut *lock(&self.queue));
        let mut ran = 0;
        for entry in queued {
            if entry.flags.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            (entry.task)();
            entry.flags.finished.store(true, Ordering::SeqCst);
            ran += 1;
        }
        ran
    }

    /// Number of queued tasks still able to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.queue)
            .iter()
            .filter(|entry| !entry.flags.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Delays of every queued task, oldest first.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.queue).iter().map(|entry| entry.delay).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_delayed(&self, delay: Duration, task: DelayedTask) -> Box<dyn ScheduledTask> {
        let flags = Arc::new(TaskFlags::default());
        lock(&self.queue).push(QueuedTask {
            delay,
            task,
            flags: Arc::clone(&flags),
        });
        Box::new(ManualTask { flags })
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

/// The three recorders, kept as concrete types so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct TestPorts {
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub scheduler: Arc<ManualScheduler>,
}

impl TestPorts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased ports for handing to the core.
    #[must_use]
    pub fn ports(&self) -> Ports {
        Ports::new(
            Arc::clone(&self.navigator) as Arc<dyn Navigator>,
            Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            Arc::clone(&self.scheduler) as Arc<dyn Scheduler>,
        )
    }
}
