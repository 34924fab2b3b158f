//! User-visible notices.
//!
//! Every message the flow shows to the user is one of these variants. The
//! presentation layer decides how to surface them (modal, terminal line).

use core::fmt;

use serde::{Deserialize, Serialize};

/// A notice presented to the user with a single acknowledgement action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// The Cart view was opened with no items.
    CartEmpty,
    /// An item was removed from the cart.
    ItemRemoved,
    /// Checkout completed.
    CheckoutSucceeded,
    /// Checkout was attempted on an empty cart.
    CheckoutRejected,
    /// Login was attempted with a blank field.
    IncompleteInput,
    /// Login credentials did not match the directory.
    InvalidCredentials,
}

impl Notice {
    /// The message text shown to the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CartEmpty => "cart is empty",
            Self::ItemRemoved => "item removed from cart",
            Self::CheckoutSucceeded => "checkout successful",
            Self::CheckoutRejected => "cart is empty, cannot checkout",
            Self::IncompleteInput => "please fill in all fields",
            Self::InvalidCredentials => "email or password incorrect",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
