//! Total a saved cart.
//!
//! # Usage
//!
//! ```bash
//! pocket-shop total cart.json
//! ```
//!
//! The file is a JSON array of `{"id", "name", "price", "quantity"}` objects,
//! the same shape the Listing screen hands to the Cart screen.

use std::io::{self, Write};
use std::path::Path;

use pocket_shop_core::cart::{CartError, CartStore, ListingItem};
use thiserror::Error;

use super::money;
use crate::catalog::{self, CatalogError};

/// Errors that can occur while totalling a cart file.
#[derive(Debug, Error)]
pub enum TotalError {
    #[error(transparent)]
    Load(#[from] CatalogError),

    #[error("Invalid cart: {0}")]
    Cart(#[from] CartError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Print the unit count and total of a cart file.
///
/// # Errors
///
/// Returns `TotalError` if the file cannot be loaded, holds a malformed
/// price or repeated id, or totals more than a `Decimal` can hold.
pub async fn print_total(path: &Path) -> Result<(), TotalError> {
    let items = catalog::load_cart(path).await?;
    let summary = summarize(&items)?;
    writeln!(io::stdout(), "{summary}")?;
    Ok(())
}

fn summarize(items: &[ListingItem]) -> Result<String, CartError> {
    let mut store = CartStore::new();
    store.initialize(Some(items))?;
    tracing::debug!(lines = store.len(), "Cart file loaded");
    let units = store.unit_count();
    Ok(format!(
        "{units} {}, total {}",
        if units == 1 { "unit" } else { "units" },
        money(store.currency_symbol(), store.compute_total()?)
    ))
}
