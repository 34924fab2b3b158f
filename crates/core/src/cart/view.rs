//! Cart screen state container.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::{Adjustment, CartError, CartLineItem, CartStatus, CartStore};
use crate::checkout::{CheckoutProcess, CheckoutResult, CheckoutState};
use crate::ports::{CartParams, Ports};
use crate::sync::{CartSyncBridge, ChangeReason};
use crate::types::{Notice, ProductId};

/// Everything the Cart screen owns while it is open.
///
/// Built from the [`CartParams`] the Listing view navigated with. Dropping
/// the view (or calling [`CartView::teardown`]) cancels any scheduled
/// post-checkout navigation.
#[derive(Debug)]
pub struct CartView {
    store: CartStore,
    bridge: Option<CartSyncBridge>,
    checkout: CheckoutProcess,
    ports: Ports,
}

impl CartView {
    /// Open the Cart screen.
    ///
    /// An absent or empty snapshot opens an empty cart and shows the
    /// "cart is empty" notice.
    ///
    /// # Errors
    ///
    /// Returns a contract-violation `CartError` if the snapshot has a
    /// malformed price or a repeated id.
    #[instrument(skip_all)]
    pub fn open(params: CartParams, ports: Ports, return_delay: Duration) -> Result<Self, CartError> {
        let mut store = CartStore::new();
        let status = store.initialize(params.items.as_deref())?;

        match status {
            CartStatus::Empty => ports.notifier.present_notice(Notice::CartEmpty),
            CartStatus::Loaded => info!(items = store.len(), "Cart opened"),
        }
        if params.bridge.is_none() {
            debug!("Cart opened without a listing subscription");
        }

        let checkout = CheckoutProcess::new(&store, return_delay);
        Ok(Self {
            store,
            bridge: params.bridge,
            checkout,
            ports,
        })
    }

    /// Change an item's quantity by one. Unknown ids are a no-op.
    pub fn adjust_quantity(&mut self, id: &ProductId, adjustment: Adjustment) -> Option<u32> {
        let quantity = self.store.adjust_quantity(id, adjustment)?;
        self.propagate(ChangeReason::QuantityAdjusted {
            id: id.clone(),
            quantity,
        });
        Some(quantity)
    }

    /// Remove an item, propagate the resulting cart and show a notice.
    ///
    /// Propagation and the notice happen even when the id was not present,
    /// so the listing always ends up with the cart as shown here.
    pub fn remove_item(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let removed = self.store.remove_item(id);
        if removed.is_none() {
            debug!(%id, "Removal of unknown item");
        }
        self.checkout.refresh(&self.store);
        self.propagate(ChangeReason::Removed { id: id.clone() });
        self.ports.notifier.present_notice(Notice::ItemRemoved);
        removed
    }

    /// Current cart total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the total does not fit.
    pub fn total(&self) -> Result<Decimal, CartError> {
        self.store.compute_total()
    }

    /// Currency symbol shared by every item, if there is one.
    #[must_use]
    pub fn currency_symbol(&self) -> Option<char> {
        self.store.currency_symbol()
    }

    /// Check the cart out.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EmptyCart` if there is nothing to check out and
    /// `CartError::TotalOverflow` if the total does not fit. Neither change
    /// is propagated.
    pub fn checkout(&mut self) -> Result<CheckoutResult, CartError> {
        let result = self.checkout.checkout(&mut self.store, &self.ports)?;
        self.propagate(ChangeReason::Cleared);
        Ok(result)
    }

    /// Cancel work tied to this view's lifetime.
    ///
    /// Returns `true` if a scheduled navigation was cancelled.
    pub fn teardown(&mut self) -> bool {
        self.checkout.cancel_pending_return()
    }

    fn propagate(&self, reason: ChangeReason) {
        match &self.bridge {
            Some(bridge) => {
                bridge.publish(reason, self.store.items());
            }
            None => debug!(?reason, "No listing subscribed, cart change not propagated"),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.store.items()
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[must_use]
    pub const fn checkout_state(&self) -> CheckoutState {
        self.checkout.state()
    }

    /// Whether a post-checkout return to login is still scheduled.
    #[must_use]
    pub fn has_pending_return(&self) -> bool {
        self.checkout.has_pending_return()
    }

    /// Whether mutations are propagated to a listing.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.bridge.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::ListingItem;
    use crate::checkout::DEFAULT_RETURN_DELAY;
    use crate::ports::Screen;
    use crate::sync::{CartSubscription, SyncPolicy};
    use crate::testing::TestPorts;

    fn listing(id: &str, price: &str, quantity: u32) -> ListingItem {
        ListingItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.to_owned(),
            image: String::new(),
            quantity: Some(quantity),
        }
    }

    fn open_synced(
        ports: &TestPorts,
        items: Vec<ListingItem>,
        policy: SyncPolicy,
    ) -> (CartView, CartSubscription) {
        let (bridge, subscription) = CartSyncBridge::channel(policy);
        let params = CartParams {
            items: Some(items),
            bridge: Some(bridge),
        };
        let view = CartView::open(params, ports.ports(), DEFAULT_RETURN_DELAY).unwrap();
        (view, subscription)
    }

    #[test]
    fn test_open_absent_shows_empty_notice() {
        let ports = TestPorts::new();
        let view = CartView::open(CartParams::default(), ports.ports(), DEFAULT_RETURN_DELAY)
            .unwrap();
        assert!(view.is_empty());
        assert_eq!(view.checkout_state(), CheckoutState::Terminated);
        assert_eq!(ports.notifier.notices(), vec![Notice::CartEmpty]);
    }

    #[test]
    fn test_open_empty_shows_empty_notice() {
        let ports = TestPorts::new();
        let params = CartParams {
            items: Some(Vec::new()),
            bridge: None,
        };
        let view = CartView::open(params, ports.ports(), DEFAULT_RETURN_DELAY).unwrap();
        assert!(view.is_empty());
        assert_eq!(ports.notifier.notices(), vec![Notice::CartEmpty]);
    }

    #[test]
    fn test_open_rejects_malformed_price() {
        let ports = TestPorts::new();
        let params = CartParams {
            items: Some(vec![listing("a", "$1.0.0", 1)]),
            bridge: None,
        };
        let result = CartView::open(params, ports.ports(), DEFAULT_RETURN_DELAY);
        assert!(matches!(result, Err(CartError::InvalidPrice { .. })));
        assert!(ports.notifier.notices().is_empty());
    }

    #[test]
    fn test_remove_propagates_and_notifies() {
        let ports = TestPorts::new();
        let (mut view, mut subscription) = open_synced(
            &ports,
            vec![listing("a", "$1", 1), listing("b", "$2", 1)],
            SyncPolicy::RemovalsOnly,
        );

        view.remove_item(&ProductId::new("a"));

        let event = subscription.try_next().unwrap();
        assert_eq!(event.reason, ChangeReason::Removed { id: ProductId::new("a") });
        assert_eq!(event.items, view.items());
        assert_eq!(ports.notifier.last(), Some(Notice::ItemRemoved));
    }

    #[test]
    fn test_removals_only_keeps_quantity_local() {
        let ports = TestPorts::new();
        let (mut view, mut subscription) =
            open_synced(&ports, vec![listing("a", "$1", 1)], SyncPolicy::RemovalsOnly);

        assert_eq!(view.adjust_quantity(&ProductId::new("a"), Adjustment::Increase), Some(2));
        assert!(subscription.try_next().is_none());

        view.checkout().unwrap();
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn test_full_sync_propagates_quantity_and_clear() {
        let ports = TestPorts::new();
        let (mut view, mut subscription) =
            open_synced(&ports, vec![listing("a", "$1", 1)], SyncPolicy::Full);

        view.adjust_quantity(&ProductId::new("a"), Adjustment::Increase);
        let event = subscription.try_next().unwrap();
        assert_eq!(event.items[0].quantity(), 2);

        view.checkout().unwrap();
        let event = subscription.try_next().unwrap();
        assert_eq!(event.reason, ChangeReason::Cleared);
        assert!(event.items.is_empty());
    }

    #[test]
    fn test_unsynced_view_still_mutates() {
        let ports = TestPorts::new();
        let params = CartParams {
            items: Some(vec![listing("a", "$1", 1)]),
            bridge: None,
        };
        let mut view = CartView::open(params, ports.ports(), DEFAULT_RETURN_DELAY).unwrap();
        assert!(!view.is_synced());
        view.remove_item(&ProductId::new("a"));
        assert!(view.is_empty());
        assert_eq!(ports.notifier.last(), Some(Notice::ItemRemoved));
    }

    #[test]
    fn test_checkout_then_teardown_cancels_return() {
        let ports = TestPorts::new();
        let (mut view, _subscription) =
            open_synced(&ports, vec![listing("a", "$10.00", 2), listing("b", "$5.50", 1)], SyncPolicy::Full);

        let result = view.checkout().unwrap();
        assert_eq!(result.total_amount, Decimal::new(2550, 2));
        assert!(view.is_empty());
        assert!(view.has_pending_return());

        assert!(view.teardown());
        assert_eq!(ports.scheduler.fire_all(), 0);
        assert!(!ports.navigator.screens().contains(&Screen::Login));
    }

    #[test]
    fn test_checkout_empty_leaves_cart_unchanged() {
        let ports = TestPorts::new();
        let mut view = CartView::open(CartParams::default(), ports.ports(), DEFAULT_RETURN_DELAY)
            .unwrap();
        assert_eq!(view.checkout(), Err(CartError::EmptyCart));
        assert!(view.is_empty());
        assert_eq!(
            ports.notifier.notices(),
            vec![Notice::CartEmpty, Notice::CheckoutRejected]
        );
    }

    #[test]
    fn test_checkout_overflow_is_not_propagated() {
        let ports = TestPorts::new();
        let (mut view, mut subscription) = open_synced(
            &ports,
            vec![
                listing("a", "$10000000000000000000", 4_000_000_000),
                listing("b", "$39000000000000000000000000000", 1),
            ],
            SyncPolicy::RemovalsOnly,
        );
        view.adjust_quantity(&ProductId::new("b"), Adjustment::Increase);

        assert_eq!(view.total(), Err(CartError::TotalOverflow));
        assert_eq!(view.checkout(), Err(CartError::TotalOverflow));
        assert_eq!(view.items().len(), 2);
        assert_eq!(view.checkout_state(), CheckoutState::Active);
        assert!(!view.has_pending_return());
        assert!(subscription.try_next().is_none());
        assert!(ports.notifier.notices().is_empty());
    }

    #[test]
    fn test_removing_last_item_terminates_checkout() {
        let ports = TestPorts::new();
        let (mut view, _subscription) =
            open_synced(&ports, vec![listing("a", "$1", 1)], SyncPolicy::Full);
        assert_eq!(view.checkout_state(), CheckoutState::Active);
        view.remove_item(&ProductId::new("a"));
        assert_eq!(view.checkout_state(), CheckoutState::Terminated);
    }
}
