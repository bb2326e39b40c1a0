use chrono::NaiveDate;

/// German currency notation: `1.234,56 €`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let euros = (cents / 100).to_string();

    let mut grouped = String::with_capacity(euros.len() + euros.len() / 3);
    for (idx, digit) in euros.chars().enumerate() {
        if idx > 0 && (euros.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}{},{:02} €", sign, grouped, cents % 100)
}

/// German date notation: `31.12.2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Accepts ISO (`2024-12-31`) and German (`31.12.2024`) notation.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
        .ok()
}

/// Accepts `1234.56`, `1234,56` and `1.234,56` (with or without a trailing `€`).
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .trim_end_matches('€')
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Round to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_grouped_german_style() {
        assert_eq!(format_currency(1234.56), "1.234,56 €");
        assert_eq!(format_currency(0.0), "0,00 €");
        assert_eq!(format_currency(999.999), "1.000,00 €");
        assert_eq!(format_currency(1_000_000.0), "1.000.000,00 €");
        assert_eq!(format_currency(-12.5), "-12,50 €");
    }

    #[test]
    fn dates_round_trip_between_notations() {
        let date = parse_date("31.12.2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(parse_date("2024-12-31"), Some(date));
        assert_eq!(format_date(date), "31.12.2024");
        assert_eq!(parse_date("31/12/2024"), None);
    }

    #[test]
    fn amounts_in_both_notations() {
        assert_eq!(parse_amount("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
        assert_eq!(parse_amount("850"), Some(850.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }
}
