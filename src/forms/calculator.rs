use crate::legal::PartyRole;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct NoticePeriodForm {
    pub role: PartyRole,
    /// Completed years of tenancy; derived from the dates when missing
    #[validate(maximum = 200)]
    pub tenancy_years: Option<u32>,
    pub lease_start: Option<NaiveDate>,
    pub notice_date: Option<NaiveDate>,
}

impl NoticePeriodForm {
    /// Tenancy length in years, `None` when neither years nor a start date were given.
    pub fn years(&self, today: NaiveDate) -> Option<u32> {
        self.tenancy_years.or_else(|| {
            self.lease_start.map(|start| {
                crate::legal::tenancy_years(start, self.notice_date.unwrap_or(today))
            })
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct DepositForm {
    #[validate(minimum = 0.0)]
    pub base_rent: f64,
    /// Deposit to check against the cap
    #[validate(minimum = 0.0)]
    pub deposit: Option<f64>,
}

/// Upper bound for monthly rents accepted by the calculators.
pub const MAX_RENT: f64 = 1_000_000.0;

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RentIncreaseForm {
    #[validate(exclusive_minimum = 0.0)]
    #[validate(maximum = 1_000_000.0)]
    pub current_rent: f64,
    #[validate(minimum = 0.0)]
    #[validate(maximum = 1_000_000.0)]
    pub requested_rent: f64,
    #[serde(default)]
    pub tight_market: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UtilitiesForm {
    #[validate(minimum = 0.0)]
    pub annual_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn years_come_from_dates_when_missing() {
        let form: NoticePeriodForm = serde_json::from_value(json!({
            "role": "landlord",
            "lease_start": "2016-05-01",
            "notice_date": "2024-04-30"
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(form.years(today), Some(7));
    }

    #[test]
    fn negative_rent_is_rejected() {
        let form = RentIncreaseForm {
            current_rent: -1.0,
            requested_rent: 10.0,
            tight_market: false,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn absurd_rent_is_rejected() {
        let form = RentIncreaseForm {
            current_rent: 1.0e17,
            requested_rent: 1.0e17,
            tight_market: true,
        };
        assert!(form.validate().is_err());

        let form = RentIncreaseForm {
            current_rent: 900.0,
            requested_rent: MAX_RENT + 1.0,
            tight_market: true,
        };
        assert!(form.validate().is_err());
    }
}
