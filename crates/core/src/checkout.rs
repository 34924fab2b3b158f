//! Checkout state machine.
//!
//! `Active` while the cart has items, `Terminated` once checkout completes or
//! when the cart is empty. A successful checkout computes the total, shows the
//! success notice, clears the cart and schedules the return to the login
//! screen, all in one synchronous step. Only the navigation itself is delayed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cart::{CartError, CartStore};
use crate::ports::{Ports, Route, ScheduledTask};
use crate::types::{Notice, format_amount};

/// How long the success notice stays up before returning to login.
pub const DEFAULT_RETURN_DELAY: Duration = Duration::from_secs(2);

/// Checkout lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// The cart has items and can be checked out.
    Active,
    /// Checkout completed, or there was nothing to check out.
    Terminated,
}

/// Outcome of a successful checkout. Reported, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub total_amount: Decimal,
}

impl fmt::Display for CheckoutResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.total_amount))
    }
}

/// Drives checkout for one Cart view.
///
/// Owns the scheduled return-to-login task and cancels it when dropped, so a
/// torn-down view never navigates.
pub struct CheckoutProcess {
    state: CheckoutState,
    return_delay: Duration,
    pending_return: Option<Box<dyn ScheduledTask>>,
}

impl CheckoutProcess {
    /// Create a process for the given cart contents.
    #[must_use]
    pub fn new(store: &CartStore, return_delay: Duration) -> Self {
        Self {
            state: Self::state_for(store),
            return_delay,
            pending_return: None,
        }
    }

    fn state_for(store: &CartStore) -> CheckoutState {
        if store.is_empty() {
            CheckoutState::Terminated
        } else {
            CheckoutState::Active
        }
    }

    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Re-derive the state after the cart changed outside checkout.
    pub fn refresh(&mut self, store: &CartStore) {
        if matches!(self.state, CheckoutState::Active) {
            self.state = Self::state_for(store);
        }
    }

    /// Finalize the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EmptyCart` if the cart has no items. The cart is
    /// left untouched and the rejection notice is shown.
    ///
    /// Returns `CartError::TotalOverflow` if the total cannot be computed.
    /// Nothing is shown, cleared or scheduled and the state stays `Active`.
    pub fn checkout(
        &mut self,
        store: &mut CartStore,
        ports: &Ports,
    ) -> Result<CheckoutResult, CartError> {
        if store.is_empty() {
            warn!("Checkout attempted on an empty cart");
            self.state = CheckoutState::Terminated;
            ports.notifier.present_notice(Notice::CheckoutRejected);
            return Err(CartError::EmptyCart);
        }

        let total_amount = store.compute_total()?;
        info!(
            total = %format_amount(total_amount),
            items = store.len(),
            "Checkout completed"
        );
        ports.notifier.present_notice(Notice::CheckoutSucceeded);

        store.clear();
        self.state = CheckoutState::Terminated;

        self.cancel_pending_return();
        let navigator = Arc::clone(&ports.navigator);
        self.pending_return = Some(ports.scheduler.schedule_delayed(
            self.return_delay,
            Box::new(move || navigator.navigate_to(Route::Login)),
        ));

        Ok(CheckoutResult { total_amount })
    }

    /// Whether a return to login is scheduled and has not fired yet.
    #[must_use]
    pub fn has_pending_return(&self) -> bool {
        self.pending_return
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Cancel the scheduled return to login, if any.
    ///
    /// Returns `true` if a task was still pending.
    pub fn cancel_pending_return(&mut self) -> bool {
        let Some(task) = self.pending_return.take() else {
            return false;
        };
        let was_pending = !task.is_finished();
        task.cancel();
        if was_pending {
            debug!("Cancelled scheduled return to login");
        }
        was_pending
    }
}

impl Drop for CheckoutProcess {
    fn drop(&mut self) {
        self.cancel_pending_return();
    }
}

impl fmt::Debug for CheckoutProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutProcess")
            .field("state", &self.state)
            .field("return_delay", &self.return_delay)
            .field("pending_return", &self.has_pending_return())
            .finish()
    }
}
