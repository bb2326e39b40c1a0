use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Who gives notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Tenant,
    Landlord,
}

const BASE_NOTICE_MONTHS: u32 = 3;

/// Notice period in months (§ 573c BGB).
///
/// Tenants always have three months. For landlords the period grows with the
/// tenancy: 3 months below five years, 6 months from five years, 9 months from
/// eight years.
pub fn notice_period_months(tenancy_years: u32, role: PartyRole) -> u32 {
    match role {
        PartyRole::Tenant => BASE_NOTICE_MONTHS,
        PartyRole::Landlord => match tenancy_years {
            0..=4 => 3,
            5..=7 => 6,
            _ => 9,
        },
    }
}

/// Completed years between the start of the tenancy and `on`.
pub fn tenancy_years(start: NaiveDate, on: NaiveDate) -> u32 {
    if on <= start {
        return 0;
    }
    let mut years = on.year() - start.year();
    if (on.month(), on.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn notice_period_from_dates(start: NaiveDate, on: NaiveDate, role: PartyRole) -> u32 {
    notice_period_months(tenancy_years(start, on), role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_period_ignores_duration() {
        for years in [0, 1, 4, 5, 7, 8, 30] {
            assert_eq!(notice_period_months(years, PartyRole::Tenant), 3);
        }
    }

    #[test]
    fn landlord_period_is_tiered() {
        assert_eq!(notice_period_months(0, PartyRole::Landlord), 3);
        assert_eq!(notice_period_months(4, PartyRole::Landlord), 3);
        assert_eq!(notice_period_months(5, PartyRole::Landlord), 6);
        assert_eq!(notice_period_months(7, PartyRole::Landlord), 6);
        assert_eq!(notice_period_months(8, PartyRole::Landlord), 9);
        assert_eq!(notice_period_months(25, PartyRole::Landlord), 9);
    }

    #[test]
    fn completed_years_respect_anniversary() {
        let start = NaiveDate::from_ymd_opt(2016, 6, 15).unwrap();
        assert_eq!(tenancy_years(start, NaiveDate::from_ymd_opt(2021, 6, 14).unwrap()), 4);
        assert_eq!(tenancy_years(start, NaiveDate::from_ymd_opt(2021, 6, 15).unwrap()), 5);
        assert_eq!(tenancy_years(start, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()), 0);
    }

    #[test]
    fn landlord_period_from_dates() {
        let start = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
        let on = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(notice_period_from_dates(start, on, PartyRole::Landlord), 9);
        assert_eq!(notice_period_from_dates(start, on, PartyRole::Tenant), 3);
    }
}
