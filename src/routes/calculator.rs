use crate::forms;
use crate::helpers::JsonResponse;
use crate::legal;
use crate::views::calculator as view;
use actix_web::{post, web, Responder, Result};
use chrono::Utc;
use serde_valid::Validate;

#[tracing::instrument(name = "Calculate notice period.")]
#[post("/notice_period")]
pub async fn notice_period_handler(
    form: web::Json<forms::NoticePeriodForm>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<view::NoticePeriod>::build().form_error(errors.to_string()));
    }

    let years = form.years(Utc::now().date_naive()).ok_or_else(|| {
        JsonResponse::<view::NoticePeriod>::build()
            .form_error("tenancy_years or lease_start is required")
    })?;

    Ok(JsonResponse::build()
        .set_item(view::NoticePeriod {
            role: form.role,
            tenancy_years: years,
            notice_months: legal::notice_period_months(years, form.role),
        })
        .ok("OK"))
}

#[tracing::instrument(name = "Calculate deposit cap.")]
#[post("/deposit")]
pub async fn deposit_handler(form: web::Json<forms::DepositForm>) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<view::DepositCap>::build().form_error(errors.to_string()));
    }

    let within_cap = form
        .deposit
        .map(|deposit| legal::deposit_within_cap(form.base_rent, deposit));

    Ok(JsonResponse::build()
        .set_item(view::DepositCap::new(
            form.base_rent,
            legal::max_deposit(form.base_rent),
            within_cap,
        ))
        .ok("OK"))
}

#[tracing::instrument(name = "Check rent increase.")]
#[post("/rent_increase")]
pub async fn rent_increase_handler(
    form: web::Json<forms::RentIncreaseForm>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<legal::RentIncreaseCheck>::build().form_error(errors.to_string()));
    }

    let check = legal::check_rent_increase(form.current_rent, form.requested_rent, form.tight_market);
    Ok(JsonResponse::build().set_item(check).ok("OK"))
}

#[tracing::instrument(name = "Calculate utility prepayment.")]
#[post("/utilities")]
pub async fn utilities_handler(form: web::Json<forms::UtilitiesForm>) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<view::UtilityPrepayment>::build().form_error(errors.to_string()));
    }

    let monthly = legal::monthly_utility_prepayment(form.annual_amount);
    Ok(JsonResponse::build()
        .set_item(view::UtilityPrepayment {
            annual_amount: form.annual_amount,
            monthly,
            monthly_formatted: crate::helpers::format::format_currency(monthly),
        })
        .ok("OK"))
}
