/// Monthly share of an annual utility prepayment, rounded to cents.
pub fn monthly_utility_prepayment(annual_amount: f64) -> f64 {
    let cents = (annual_amount * 100.0 / 12.0).round();
    cents / 100.0
}
