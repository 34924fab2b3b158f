//! Core types for Pocket Shop.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod notice;
pub mod price;

pub use id::{ProductId, SessionId};
pub use notice::Notice;
pub use price::{Price, PriceError, format_amount};
