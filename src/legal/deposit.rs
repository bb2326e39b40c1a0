/// Security deposit cap (§ 551 BGB): three monthly base rents.
pub const DEPOSIT_RENT_MULTIPLIER: f64 = 3.0;

pub fn max_deposit(base_rent: f64) -> f64 {
    base_rent * DEPOSIT_RENT_MULTIPLIER
}

/// Whether a requested deposit stays within the cap.
pub fn deposit_within_cap(base_rent: f64, deposit: f64) -> bool {
    super::to_cents(deposit) <= super::to_cents(max_deposit(base_rent))
}
