//! Capabilities consumed from the presentation layer.
//!
//! The core never draws a screen, shows a modal or owns a timer. It asks for
//! those through the traits here; the CLI implements them on a terminal and a
//! tokio runtime, and [`crate::testing`] implements them as recorders.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cart::ListingItem;
use crate::sync::CartSyncBridge;
use crate::types::Notice;

/// The three screens of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Credential entry, the initial state.
    Login,
    /// Product listing; owns the canonical cart copy.
    Listing,
    /// Cart view; works on a snapshot of the listing's cart.
    Cart,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Listing => write!(f, "listing"),
            Self::Cart => write!(f, "cart"),
        }
    }
}

/// Parameters for entering the Cart screen.
#[derive(Debug, Clone, Default)]
pub struct CartParams {
    /// Snapshot of the listing's cart. `None` means no list was handed over.
    pub items: Option<Vec<ListingItem>>,
    /// Channel back to the Listing view. `None` disables propagation.
    pub bridge: Option<CartSyncBridge>,
}

/// A navigation request.
#[derive(Debug)]
pub enum Route {
    Login,
    Listing,
    Cart(CartParams),
}

impl Route {
    /// The screen this route leads to.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        match self {
            Self::Login => Screen::Login,
            Self::Listing => Screen::Listing,
            Self::Cart(_) => Screen::Cart,
        }
    }
}

/// Moves between screens.
pub trait Navigator: Send + Sync {
    /// Request a transition. The presentation layer shows the screen and
    /// then reports arrival back to the session.
    fn navigate_to(&self, route: Route);
}

/// Surfaces a notice with a single acknowledgement action.
pub trait Notifier: Send + Sync {
    fn present_notice(&self, notice: Notice);
}

/// Work to run once after a delay.
pub type DelayedTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a task returned by [`Scheduler::schedule_delayed`].
pub trait ScheduledTask: Send {
    /// Prevent the task from running if it has not run yet.
    fn cancel(&self);

    /// Whether the task has run or been cancelled.
    fn is_finished(&self) -> bool;
}

/// Fires a callback once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule_delayed(&self, delay: Duration, task: DelayedTask) -> Box<dyn ScheduledTask>;
}

/// The full set of presentation capabilities handed to a session.
#[derive(Clone)]
pub struct Ports {
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl Ports {
    /// Bundle the three capabilities.
    #[must_use]
    pub fn new(
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            navigator,
            notifier,
            scheduler,
        }
    }
}

impl fmt::Debug for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}
