use crate::helpers::format::format_currency;
use crate::legal::PartyRole;
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NoticePeriod {
    pub role: PartyRole,
    pub tenancy_years: u32,
    pub notice_months: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DepositCap {
    pub base_rent: f64,
    pub max_deposit: f64,
    pub max_deposit_formatted: String,
    /// Only set when a deposit was submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_cap: Option<bool>,
}

impl DepositCap {
    pub fn new(base_rent: f64, max_deposit: f64, within_cap: Option<bool>) -> Self {
        Self {
            base_rent,
            max_deposit,
            max_deposit_formatted: format_currency(max_deposit),
            within_cap,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UtilityPrepayment {
    pub annual_amount: f64,
    pub monthly: f64,
    pub monthly_formatted: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldCheck {
    pub input: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PasswordCheck {
    pub valid: bool,
    /// Rules the password breaks, in German
    pub violations: Vec<&'static str>,
}
