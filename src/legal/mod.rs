//! Statutory formulas of German tenancy law (BGB §§ 551, 556, 558, 573c).
//!
//! Every function is a one-shot calculation from explicit inputs.

mod deposit;
mod notice;
mod rent_increase;
mod utilities;

pub use deposit::*;
pub use notice::*;
pub use rent_increase::*;
pub use utilities::*;

/// Euro amount to integer cents.
pub(crate) fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub(crate) fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}
