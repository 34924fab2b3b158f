//! Integration tests for Pocket Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `shop_flow` - Login to checkout through [`pocket_shop_core::session::ShopSession`]
//! - `cart_laws` - Algebraic properties of the cart store
//!
//! The tests drive the core through the recording fakes in
//! `pocket_shop_core::testing`, delivering navigation requests back to the
//! session the way the terminal front end does.

#![cfg_attr(not(test), forbid(unsafe_code))]
