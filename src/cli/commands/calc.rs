//! Legal calculators, computed locally without a server round trip.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_valid::Validate;

use super::{CallableTrait, Context};
use crate::cli::error::CliError;
use crate::forms::{DepositForm, NoticePeriodForm, RentIncreaseForm, UtilitiesForm};
use crate::helpers::format::format_currency;
use crate::helpers::validation;
use crate::legal::{self, PartyRole};
use crate::views::calculator::{DepositCap, FieldCheck, NoticePeriod, UtilityPrepayment};

fn invalid(errors: impl std::fmt::Display) -> CliError {
    CliError::InvalidInput(errors.to_string())
}

/// `mietrecht-cli calc notice --role landlord --since 2016-05-01`
pub struct NoticeCommand {
    pub form: NoticePeriodForm,
}

impl NoticeCommand {
    pub fn new(
        role: PartyRole,
        years: Option<u32>,
        since: Option<NaiveDate>,
        on: Option<NaiveDate>,
    ) -> Self {
        Self {
            form: NoticePeriodForm {
                role,
                tenancy_years: years,
                lease_start: since,
                notice_date: on,
            },
        }
    }

    pub fn compute(&self, today: NaiveDate) -> Result<NoticePeriod, CliError> {
        self.form.validate().map_err(invalid)?;
        let years = self.form.years(today).ok_or_else(|| {
            CliError::InvalidInput("either --years or --since is required".to_string())
        })?;
        Ok(NoticePeriod {
            role: self.form.role,
            tenancy_years: years,
            notice_months: legal::notice_period_months(years, self.form.role),
        })
    }
}

#[async_trait]
impl CallableTrait for NoticeCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let result = self.compute(Utc::now().date_naive())?;
        if ctx.json {
            return ctx.print_json(&result);
        }
        println!(
            "Kündigungsfrist: {} Monate (Mietdauer {} Jahre)",
            result.notice_months, result.tenancy_years
        );
        Ok(())
    }
}

pub struct DepositCommand {
    pub form: DepositForm,
}

impl DepositCommand {
    pub fn compute(&self) -> Result<DepositCap, CliError> {
        self.form.validate().map_err(invalid)?;
        Ok(DepositCap::new(
            self.form.base_rent,
            legal::max_deposit(self.form.base_rent),
            self.form
                .deposit
                .map(|deposit| legal::deposit_within_cap(self.form.base_rent, deposit)),
        ))
    }
}

#[async_trait]
impl CallableTrait for DepositCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let result = self.compute()?;
        if ctx.json {
            return ctx.print_json(&result);
        }
        println!("Höchstkaution: {}", result.max_deposit_formatted);
        match result.within_cap {
            Some(true) => println!("✓ Die Kaution liegt innerhalb der Grenze"),
            Some(false) => println!("✗ Die Kaution übersteigt drei Nettokaltmieten"),
            None => {}
        }
        Ok(())
    }
}

pub struct RentIncreaseCommand {
    pub form: RentIncreaseForm,
}

#[async_trait]
impl CallableTrait for RentIncreaseCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        self.form.validate().map_err(invalid)?;
        let check = legal::check_rent_increase(
            self.form.current_rent,
            self.form.requested_rent,
            self.form.tight_market,
        );
        if ctx.json {
            return ctx.print_json(&check);
        }
        let mark = if check.allowed { "✓ zulässig" } else { "✗ unzulässig" };
        println!(
            "{mark}: +{} ({} %), Kappungsgrenze {} %, höchstens {}",
            format_currency(check.increase),
            check.increase_percent,
            check.cap_percent,
            format_currency(check.max_allowed_rent)
        );
        Ok(())
    }
}

pub struct UtilitiesCommand {
    pub form: UtilitiesForm,
}

#[async_trait]
impl CallableTrait for UtilitiesCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        self.form.validate().map_err(invalid)?;
        let monthly = legal::monthly_utility_prepayment(self.form.annual_amount);
        let result = UtilityPrepayment {
            annual_amount: self.form.annual_amount,
            monthly,
            monthly_formatted: format_currency(monthly),
        };
        if ctx.json {
            return ctx.print_json(&result);
        }
        println!("Monatliche Vorauszahlung: {}", result.monthly_formatted);
        Ok(())
    }
}

/// `mietrecht-cli iban <IBAN>` / `mietrecht-cli plz <PLZ>`
pub enum CheckCommand {
    Iban(String),
    Plz(String),
}

impl CheckCommand {
    pub fn check(&self) -> FieldCheck {
        match self {
            CheckCommand::Iban(input) => {
                let valid = validation::is_valid_german_iban(input);
                FieldCheck {
                    input: input.clone(),
                    valid,
                    formatted: valid.then(|| validation::format_iban(input)),
                }
            }
            CheckCommand::Plz(input) => FieldCheck {
                input: input.clone(),
                valid: validation::is_valid_plz(input),
                formatted: None,
            },
        }
    }
}

#[async_trait]
impl CallableTrait for CheckCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CliError> {
        let result = self.check();
        if ctx.json {
            return ctx.print_json(&result);
        }
        if !result.valid {
            return Err(CliError::InvalidInput(format!("{} is not valid", result.input)));
        }
        println!("✓ {}", result.formatted.as_deref().unwrap_or(&result.input));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn notice_from_lease_start() {
        let cmd = NoticeCommand::new(PartyRole::Landlord, None, Some(date(2015, 3, 1)), None);
        let result = cmd.compute(date(2024, 3, 1)).unwrap();
        assert_eq!(result.tenancy_years, 9);
        assert_eq!(result.notice_months, 9);
    }

    #[test]
    fn notice_needs_a_duration() {
        let cmd = NoticeCommand::new(PartyRole::Tenant, None, None, None);
        assert!(matches!(
            cmd.compute(date(2024, 1, 1)),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn deposit_over_the_cap() {
        let cmd = DepositCommand {
            form: DepositForm {
                base_rent: 850.0,
                deposit: Some(3000.0),
            },
        };
        let result = cmd.compute().unwrap();
        assert_eq!(result.max_deposit_formatted, "2.550,00 €");
        assert_eq!(result.within_cap, Some(false));
    }

    #[test]
    fn iban_and_plz_checks() {
        let iban = CheckCommand::Iban("DE89370400440532013000".to_string()).check();
        assert!(iban.valid);
        assert_eq!(iban.formatted.as_deref(), Some("DE89 3704 0044 0532 0130 00"));

        assert!(CheckCommand::Plz("20095".to_string()).check().valid);
        assert!(!CheckCommand::Plz("2009".to_string()).check().valid);
    }
}
