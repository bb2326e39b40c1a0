use serde::{Deserialize, Serialize};

use super::{from_cents, to_cents};

/// Kappungsgrenze in municipalities with a tight housing market.
pub const TIGHT_MARKET_CAP_PERCENT: i64 = 15;
/// Kappungsgrenze everywhere else.
pub const DEFAULT_CAP_PERCENT: i64 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentIncreaseCheck {
    pub allowed: bool,
    pub increase: f64,
    pub increase_percent: f64,
    pub cap_percent: i64,
    pub max_allowed_rent: f64,
}

pub fn cap_percent(tight_market: bool) -> i64 {
    if tight_market {
        TIGHT_MARKET_CAP_PERCENT
    } else {
        DEFAULT_CAP_PERCENT
    }
}

/// Compare a requested rent against the cap (§ 558 Abs. 3 BGB).
///
/// Computed in integer cents so an increase exactly at the cap is allowed.
/// Products are taken in `i128`; cent amounts are at most `i64::MAX`.
pub fn check_rent_increase(current_rent: f64, requested_rent: f64, tight_market: bool) -> RentIncreaseCheck {
    let cap = cap_percent(tight_market);
    let current = to_cents(current_rent);
    let requested = to_cents(requested_rent);
    let increase = requested.saturating_sub(current);

    let allowed = i128::from(increase) * 100 <= i128::from(current) * i128::from(cap);
    // floor: the last cent that is still within the cap
    let max_allowed = i128::from(current) + (i128::from(current) * i128::from(cap)).div_euclid(100);
    let max_allowed = i64::try_from(max_allowed).unwrap_or(i64::MAX);
    let increase_percent = if current > 0 {
        (increase as f64 / current as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    RentIncreaseCheck {
        allowed,
        increase: from_cents(increase),
        increase_percent,
        cap_percent: cap,
        max_allowed_rent: from_cents(max_allowed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tight_market_caps_at_fifteen_percent() {
        assert!(check_rent_increase(1000.0, 1150.0, true).allowed);
        assert!(!check_rent_increase(1000.0, 1150.01, true).allowed);
        assert!(!check_rent_increase(1000.0, 1200.0, true).allowed);
    }

    #[test]
    fn other_markets_cap_at_twenty_percent() {
        assert!(check_rent_increase(1000.0, 1200.0, false).allowed);
        assert!(!check_rent_increase(1000.0, 1200.01, false).allowed);
        assert!(check_rent_increase(1000.0, 1150.01, false).allowed);
    }

    #[test]
    fn fractional_rent_at_cap_is_allowed() {
        // 15 % of 733.40 = 110.01
        let check = check_rent_increase(733.40, 843.41, true);
        assert!(check.allowed);
        assert_eq!(check.max_allowed_rent, 843.41);
    }

    #[test]
    fn reports_increase_details() {
        let check = check_rent_increase(800.0, 880.0, true);
        assert_eq!(check.increase, 80.0);
        assert_eq!(check.increase_percent, 10.0);
        assert_eq!(check.cap_percent, 15);
        assert_eq!(check.max_allowed_rent, 920.0);
    }

    #[test]
    fn rent_decrease_is_allowed() {
        assert!(check_rent_increase(800.0, 750.0, true).allowed);
    }

    #[test]
    fn huge_rents_do_not_overflow() {
        let check = check_rent_increase(1.0e17, 1.0e17, true);
        assert!(check.allowed);
        assert_eq!(check.increase, 0.0);

        let check = check_rent_increase(1.0e15, 2.0e15, false);
        assert!(!check.allowed);
        assert_eq!(check.max_allowed_rent, 1.2e15);
    }
}
