//! Listing screen state.
//!
//! The Listing view shows the product catalog and owns the canonical copy of
//! the cart. Opening the Cart screen hands over a deep copy; changes come back
//! only through the [`CartSubscription`] and only when [`ListingView::sync`]
//! is called. Edits made here after the Cart screen opened never reach it.

use thiserror::Error;
use tracing::{debug, info};

use crate::cart::ListingItem;
use crate::ports::CartParams;
use crate::sync::{CartSubscription, CartSyncBridge, SyncPolicy};
use crate::types::ProductId;

/// Errors from listing actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// The id is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// Product listing with its own cart copy.
#[derive(Debug)]
pub struct ListingView {
    catalog: Vec<ListingItem>,
    cart: Vec<ListingItem>,
    subscription: Option<CartSubscription>,
}

impl ListingView {
    /// Create a listing over a catalog, with an empty cart.
    #[must_use]
    pub const fn new(catalog: Vec<ListingItem>) -> Self {
        Self {
            catalog,
            cart: Vec::new(),
            subscription: None,
        }
    }

    /// Add one unit of a catalog product to the cart.
    ///
    /// A product already in the cart has its quantity bumped so ids stay
    /// unique. Returns the product's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::UnknownProduct` if the id is not in the catalog.
    pub fn add_to_cart(&mut self, id: &ProductId) -> Result<u32, ListingError> {
        if let Some(existing) = self.cart.iter_mut().find(|item| &item.id == id) {
            let quantity = existing
                .quantity
                .filter(|q| *q > 0)
                .unwrap_or(1)
                .saturating_add(1);
            existing.quantity = Some(quantity);
            debug!(%id, quantity, "Bumped cart quantity");
            return Ok(quantity);
        }

        let product = self
            .catalog
            .iter()
            .find(|item| &item.id == id)
            .ok_or_else(|| ListingError::UnknownProduct(id.clone()))?;

        self.cart.push(ListingItem {
            quantity: Some(1),
            ..product.clone()
        });
        info!(%id, "Added to cart");
        Ok(1)
    }

    /// Snapshot the cart and subscribe to the Cart view's changes.
    ///
    /// Replaces any earlier subscription, so changes from a previous Cart
    /// screen that were never synced are discarded.
    pub fn cart_params(&mut self, policy: SyncPolicy) -> CartParams {
        let (bridge, subscription) = CartSyncBridge::channel(policy);
        self.subscription = Some(subscription);
        CartParams {
            items: Some(self.cart.clone()),
            bridge: Some(bridge),
        }
    }

    /// Snapshot the cart without subscribing to changes.
    #[must_use]
    pub fn cart_params_without_sync(&self) -> CartParams {
        CartParams {
            items: Some(self.cart.clone()),
            bridge: None,
        }
    }

    /// Apply pending changes from the Cart view.
    ///
    /// The cart copy is replaced wholesale by the most recent snapshot.
    /// Returns the number of events consumed.
    pub fn sync(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };

        let (latest, count) = subscription.drain_latest();
        if let Some(event) = latest {
            self.cart = event.items.iter().map(ListingItem::from).collect();
            debug!(events = count, items = self.cart.len(), "Listing cart reconciled");
        }
        count
    }

    /// Catalog products, in display order.
    #[must_use]
    pub fn catalog(&self) -> &[ListingItem] {
        &self.catalog
    }

    /// The listing's copy of the cart.
    #[must_use]
    pub fn cart(&self) -> &[ListingItem] {
        &self.cart
    }

    /// Quantity of a product in the listing's cart copy.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> Option<u32> {
        self.cart
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.quantity.filter(|q| *q > 0).unwrap_or(1))
    }
}
