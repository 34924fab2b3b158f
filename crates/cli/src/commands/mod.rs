//! CLI subcommands.

pub mod login;
pub mod shop;
pub mod total;

use pocket_shop_core::format_amount;
use rust_decimal::Decimal;

/// Format an amount with the cart's currency symbol, or bare when there is
/// no single symbol.
fn money(symbol: Option<char>, amount: Decimal) -> String {
    match symbol {
        Some(symbol) => format!("{symbol}{}", format_amount(amount)),
        None => format_amount(amount),
    }
}
