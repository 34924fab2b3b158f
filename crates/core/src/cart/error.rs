//! Cart error types.

use thiserror::Error;

use crate::types::{Notice, PriceError, ProductId};

/// Errors that can occur when loading or checking out a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Checkout was attempted with no items.
    #[error("cart is empty, cannot checkout")]
    EmptyCart,

    /// The listing handed over an item whose price cannot be parsed.
    ///
    /// This is an upstream data-contract breach, not a user error.
    #[error("item {id} has an invalid price: {source}")]
    InvalidPrice {
        id: ProductId,
        #[source]
        source: PriceError,
    },

    /// The listing handed over two items with the same id.
    #[error("item {0} appears more than once")]
    DuplicateItem(ProductId),

    /// Price times quantity, summed over the cart, does not fit a `Decimal`.
    #[error("cart total exceeds the representable amount")]
    TotalOverflow,
}

impl CartError {
    /// The notice shown to the user, if this error is user-facing.
    #[must_use]
    pub const fn notice(&self) -> Option<Notice> {
        match self {
            Self::EmptyCart => Some(Notice::CheckoutRejected),
            Self::InvalidPrice { .. } | Self::DuplicateItem(_) | Self::TotalOverflow => None,
        }
    }

    /// Whether this error is a breach of the listing's data contract.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrice { .. } | Self::DuplicateItem(_) | Self::TotalOverflow
        )
    }
}
