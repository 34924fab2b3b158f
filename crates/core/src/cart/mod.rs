//! Cart line items and the cart store.
//!
//! The Listing view hands the Cart view plain [`ListingItem`]s with display
//! price strings. They are validated once, on the way into a [`CartStore`],
//! and from then on prices are [`Decimal`] amounts.

mod error;
mod view;

pub use error::CartError;
pub use view::CartView;

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Price, ProductId};

/// A product entry as the Listing view stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub id: ProductId,
    pub name: String,
    /// Display price with a leading currency symbol, e.g. `"$10.00"`.
    pub price: String,
    /// Image URI or asset reference.
    #[serde(default)]
    pub image: String,
    /// Missing or zero means 1 once the item is in the cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl From<&CartLineItem> for ListingItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price.to_string(),
            image: item.image.clone(),
            quantity: Some(item.quantity),
        }
    }
}

/// One product in a cart with an adjustable quantity.
///
/// Quantity is always at least 1: adjusting never removes an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    id: ProductId,
    name: String,
    price: Price,
    image: String,
    quantity: u32,
}

impl CartLineItem {
    /// Ingest a listing item, parsing its price.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidPrice` if the price string is malformed.
    pub fn from_listing(item: &ListingItem) -> Result<Self, CartError> {
        let price = Price::parse(&item.price).map_err(|source| CartError::InvalidPrice {
            id: item.id.clone(),
            source,
        })?;

        Ok(Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price,
            image: item.image.clone(),
            quantity: item.quantity.filter(|q| *q > 0).unwrap_or(1),
        })
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity, or `None` if the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.amount().checked_mul(Decimal::from(self.quantity))
    }
}

/// Direction of a quantity adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Increase,
    /// Floors at 1; never removes the item.
    Decrease,
}

/// Display state right after the store is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    /// No items were handed over.
    Empty,
    /// At least one item was loaded.
    Loaded,
}

/// Ordered collection of line items for one Cart-view session.
///
/// Order is the listing's insertion order. Ids are unique and serve as the
/// mutation key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    items: Vec<CartLineItem>,
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Seed the store from a listing snapshot, replacing its contents.
    ///
    /// An absent or empty snapshot leaves the store empty and reports
    /// [`CartStatus::Empty`]. On error the store is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidPrice` for a malformed price,
    /// `CartError::DuplicateItem` for a repeated id and
    /// `CartError::TotalOverflow` if the snapshot cannot be totalled.
    pub fn initialize(&mut self, items: Option<&[ListingItem]>) -> Result<CartStatus, CartError> {
        let items = items.unwrap_or_default();
        if items.is_empty() {
            self.items.clear();
            return Ok(CartStatus::Empty);
        }

        let mut seen = HashSet::with_capacity(items.len());
        let mut loaded = Vec::with_capacity(items.len());
        for item in items {
            if !seen.insert(&item.id) {
                return Err(CartError::DuplicateItem(item.id.clone()));
            }
            loaded.push(CartLineItem::from_listing(item)?);
        }
        sum_lines(&loaded)?;

        self.items = loaded;
        Ok(CartStatus::Loaded)
    }

    /// Add or subtract one unit. Unknown ids are a no-op.
    ///
    /// Returns the new quantity, or `None` if the id is not in the cart.
    pub fn adjust_quantity(&mut self, id: &ProductId, adjustment: Adjustment) -> Option<u32> {
        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            debug!(%id, "Quantity adjustment for unknown item ignored");
            return None;
        };

        item.quantity = match adjustment {
            Adjustment::Increase => item.quantity.saturating_add(1),
            Adjustment::Decrease => item.quantity.saturating_sub(1).max(1),
        };
        Some(item.quantity)
    }

    /// Delete the item with the given id. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let position = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(position))
    }

    /// Sum of unit price times quantity over every item; zero when empty.
    ///
    /// # Errors
    ///
    /// Returns `CartError::TotalOverflow` if the sum does not fit a
    /// `Decimal`. Quantity increases can push a loaded cart past the limit.
    pub fn compute_total(&self) -> Result<Decimal, CartError> {
        sum_lines(&self.items)
    }

    /// The currency symbol shared by every item.
    ///
    /// `None` when the cart is empty, when items carry different symbols or
    /// when any price was written without one.
    #[must_use]
    pub fn currency_symbol(&self) -> Option<char> {
        let (first, rest) = self.items.split_first()?;
        let symbol = first.price.symbol()?;
        rest.iter()
            .all(|item| item.price.symbol() == Some(symbol))
            .then_some(symbol)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Items in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

fn sum_lines(items: &[CartLineItem]) -> Result<Decimal, CartError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.line_total()?)
        })
        .ok_or(CartError::TotalOverflow)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn listing(id: &str, price: &str, quantity: Option<u32>) -> ListingItem {
        ListingItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.to_owned(),
            image: format!("https://img.example.com/{id}.png"),
            quantity,
        }
    }

    fn store(items: &[ListingItem]) -> CartStore {
        let mut store = CartStore::new();
        store.initialize(Some(items)).unwrap();
        store
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    #[test]
    fn test_initialize_absent_is_empty() {
        let mut store = CartStore::new();
        assert_eq!(store.initialize(None), Ok(CartStatus::Empty));
        assert!(store.is_empty());
    }

    #[test]
    fn test_initialize_empty_is_empty() {
        let mut store = CartStore::new();
        assert_eq!(store.initialize(Some(&[][..])), Ok(CartStatus::Empty));
        assert!(store.is_empty());
    }

    #[test]
    fn test_initialize_defaults_quantity() {
        let store = store(&[
            listing("a", "$1.00", None),
            listing("b", "$1.00", Some(0)),
            listing("c", "$1.00", Some(3)),
        ]);
        let quantities: Vec<u32> = store.items().iter().map(CartLineItem::quantity).collect();
        assert_eq!(quantities, vec![1, 1, 3]);
    }

    #[test]
    fn test_initialize_keeps_order() {
        let store = store(&[listing("z", "$1", None), listing("a", "$1", None)]);
        let ids: Vec<&str> = store.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_initialize_rejects_malformed_price() {
        let mut store = store(&[listing("keep", "$2.00", None)]);
        let result = store.initialize(Some(&[listing("a", "$1.00", None), listing("b", "$abc", None)]));
        assert!(matches!(
            result,
            Err(CartError::InvalidPrice { ref id, .. }) if id.as_str() == "b"
        ));
        assert!(result.unwrap_err().is_contract_violation());
        // Store unchanged on failure
        assert_eq!(store.len(), 1);
        assert!(store.get(&ProductId::new("keep")).is_some());
    }

    #[test]
    fn test_initialize_rejects_duplicate_ids() {
        let mut store = CartStore::new();
        let result = store.initialize(Some(&[listing("a", "$1", None), listing("a", "$2", None)]));
        assert_eq!(result, Err(CartError::DuplicateItem(ProductId::new("a"))));
        assert!(store.is_empty());
    }

    // =========================================================================
    // Quantity Adjustment
    // =========================================================================

    #[test]
    fn test_increase() {
        let mut store = store(&[listing("a", "$1", Some(2))]);
        let id = ProductId::new("a");
        assert_eq!(store.adjust_quantity(&id, Adjustment::Increase), Some(3));
    }

    #[test]
    fn test_decrease_floors_at_one() {
        for start in 1..=5 {
            let mut store = store(&[listing("a", "$1", Some(start))]);
            let id = ProductId::new("a");
            for _ in 0..10 {
                let quantity = store.adjust_quantity(&id, Adjustment::Decrease).unwrap();
                assert!(quantity >= 1);
            }
            assert_eq!(store.get(&id).unwrap().quantity(), 1);
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn test_increase_then_decrease_round_trips() {
        for start in [1, 2, 7, 100] {
            let mut store = store(&[listing("a", "$1", Some(start))]);
            let id = ProductId::new("a");
            store.adjust_quantity(&id, Adjustment::Increase);
            store.adjust_quantity(&id, Adjustment::Decrease);
            assert_eq!(store.get(&id).unwrap().quantity(), start);
        }
    }

    #[test]
    fn test_adjust_unknown_is_noop() {
        let mut store = store(&[listing("a", "$1", Some(2))]);
        let before = store.clone();
        assert_eq!(
            store.adjust_quantity(&ProductId::new("missing"), Adjustment::Increase),
            None
        );
        assert_eq!(store, before);
    }

    // =========================================================================
    // Removal
    // =========================================================================

    #[test]
    fn test_remove_item() {
        let mut store = store(&[listing("a", "$1", None), listing("b", "$2", None)]);
        let removed = store.remove_item(&ProductId::new("a")).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        assert_eq!(store.len(), 1);
        assert!(store.get(&ProductId::new("b")).is_some());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let items = [listing("a", "$1", None), listing("b", "$2", None)];
        let id = ProductId::new("a");

        let mut once = store(&items);
        once.remove_item(&id);

        let mut twice = store(&items);
        twice.remove_item(&id);
        assert!(twice.remove_item(&id).is_none());

        assert_eq!(once, twice);
    }

    // =========================================================================
    // Totals
    // =========================================================================

    #[test]
    fn test_total_empty_is_zero() {
        assert_eq!(CartStore::new().compute_total().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_total_sums_price_times_quantity() {
        let store = store(&[listing("a", "$10.00", Some(2)), listing("b", "$5.50", Some(1))]);
        assert_eq!(store.compute_total().unwrap(), Decimal::new(2550, 2));
    }

    #[test]
    fn test_total_independent_of_order() {
        let forward = store(&[
            listing("a", "$0.10", Some(3)),
            listing("b", "$19.99", Some(2)),
            listing("c", "$0.20", Some(7)),
        ]);
        let backward = store(&[
            listing("c", "$0.20", Some(7)),
            listing("b", "$19.99", Some(2)),
            listing("a", "$0.10", Some(3)),
        ]);
        assert_eq!(forward.compute_total(), backward.compute_total());
        assert_eq!(forward.compute_total().unwrap(), Decimal::new(4168, 2));
    }

    #[test]
    fn test_total_has_no_float_drift() {
        let items: Vec<ListingItem> = (0..10)
            .map(|i| listing(&i.to_string(), "$0.10", None))
            .collect();
        assert_eq!(store(&items).compute_total().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_initialize_rejects_overflowing_total() {
        let mut store = store(&[listing("keep", "$2.00", None)]);
        let huge = "$50000000000000000000000000000";
        let result = store.initialize(Some(&[listing("a", huge, None), listing("b", huge, None)]));
        assert_eq!(result, Err(CartError::TotalOverflow));
        assert!(result.unwrap_err().is_contract_violation());
        assert_eq!(store.len(), 1);
        assert!(store.get(&ProductId::new("keep")).is_some());
    }

    #[test]
    fn test_total_overflow_after_increase_is_an_error() {
        let mut store = store(&[
            listing("a", "$10000000000000000000", Some(4_000_000_000)),
            listing("b", "$39000000000000000000000000000", Some(1)),
        ]);
        assert!(store.compute_total().is_ok());

        store.adjust_quantity(&ProductId::new("b"), Adjustment::Increase);
        assert_eq!(store.compute_total(), Err(CartError::TotalOverflow));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let item =
            CartLineItem::from_listing(&listing("a", "$50000000000000000000000000000", Some(2)))
                .unwrap();
        assert_eq!(item.line_total(), None);
        let item = CartLineItem::from_listing(&listing("a", "$2.50", Some(2))).unwrap();
        assert_eq!(item.line_total(), Some(Decimal::new(500, 2)));
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(CartStore::new().currency_symbol(), None);
        let dollars = store(&[listing("a", "$1", None), listing("b", "$2", None)]);
        assert_eq!(dollars.currency_symbol(), Some('$'));
        let mixed = store(&[listing("a", "$1", None), listing("b", "€2", None)]);
        assert_eq!(mixed.currency_symbol(), None);
        let bare = store(&[listing("a", "1.50", None)]);
        assert_eq!(bare.currency_symbol(), None);
    }

    #[test]
    fn test_unit_count() {
        let store = store(&[listing("a", "$1", Some(2)), listing("b", "$1", Some(3))]);
        assert_eq!(store.unit_count(), 5);
    }

    #[test]
    fn test_listing_item_round_trip_keeps_price_text() {
        let source = listing("a", "$10.00", Some(4));
        let item = CartLineItem::from_listing(&source).unwrap();
        assert_eq!(ListingItem::from(&item), source);
    }
}
