//! Pocket Shop Core - cart, checkout and credential-gate state management.
//!
//! This crate holds every piece of logic of the two-screen shopping flow:
//! - [`auth`] - the static credential directory and the login gate
//! - [`cart`] - cart line items, the cart store and the Cart view container
//! - [`sync`] - the typed "cart changed" channel back to the Listing view
//! - [`checkout`] - the checkout state machine
//! - [`listing`] - the Listing view and its own copy of the cart
//! - [`session`] - the per-session screen state container
//!
//! # Architecture
//!
//! The core crate contains no terminal or file I/O. Everything the
//! presentation layer does (navigation, notices, timers) is consumed through
//! the traits in [`ports`], so the same state machine drives the CLI and the
//! tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod listing;
pub mod ports;
pub mod session;
pub mod sync;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use types::*;
