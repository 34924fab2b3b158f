//! Terminal implementations of the presentation-layer ports.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use pocket_shop_core::Notice;
use pocket_shop_core::ports::{DelayedTask, Navigator, Notifier, Route, ScheduledTask, Scheduler};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// =============================================================================
// Notices
// =============================================================================

/// Prints each notice as a `[notice]` line.
#[derive(Debug)]
pub struct TerminalNotifier<W> {
    out: Mutex<W>,
}

impl TerminalNotifier<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> TerminalNotifier<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn present_notice(&self, notice: Notice) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "[notice] {notice}").and_then(|()| out.flush()) {
            tracing::warn!(%notice, "Failed to print notice: {e}");
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Forwards navigation requests to the session loop.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    /// Create a navigator and the receiver the session loop reads routes from.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate_to(&self, route: Route) {
        let screen = route.screen();
        if self.sender.send(route).is_err() {
            tracing::debug!(%screen, "Session loop gone, navigation dropped");
        }
    }
}

// =============================================================================
// Scheduling
// =============================================================================

/// Runs delayed tasks on the tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns `TryCurrentError` when called outside a tokio runtime.
    pub fn current() -> Result<Self, TryCurrentError> {
        Ok(Self {
            handle: Handle::try_current()?,
        })
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_delayed(&self, delay: Duration, task: DelayedTask) -> Box<dyn ScheduledTask> {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioTask { join })
    }
}

/// A delayed task spawned by [`TokioScheduler`].
#[derive(Debug)]
pub struct TokioTask {
    join: JoinHandle<()>,
}

impl ScheduledTask for TokioTask {
    fn cancel(&self) {
        self.join.abort();
    }

    fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
