//! Input checks used by the wizard and the validation endpoints.

use regex::Regex;

/// Length of a German IBAN: `DE` + 2 check digits + 8 digit bank code + 10 digit account.
const DE_IBAN_LENGTH: usize = 22;

/// Remove whitespace and uppercase, the way IBANs are usually typed.
pub fn normalize_iban(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validate a German IBAN (mod-97 checksum). Foreign IBANs are rejected.
pub fn is_valid_german_iban(input: &str) -> bool {
    let iban = normalize_iban(input);
    if iban.len() != DE_IBAN_LENGTH || !iban.starts_with("DE") {
        return false;
    }
    if !iban[2..].chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    iban_mod97(&iban) == Some(1)
}

/// ISO 13616 remainder: rotate the first four characters to the end,
/// map letters to 10..35 and reduce mod 97 digit by digit.
fn iban_mod97(iban: &str) -> Option<u32> {
    let rotated = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for c in rotated {
        let value = c.to_digit(36)?;
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    Some(remainder)
}

/// Group an IBAN in blocks of four for display.
pub fn format_iban(input: &str) -> String {
    normalize_iban(input)
        .chars()
        .collect::<Vec<char>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}

/// German postal code: five digits, leading "00" is not assigned.
pub fn is_valid_plz(input: &str) -> bool {
    let plz = input.trim();
    Regex::new(r"^\d{5}$")
        .map(|re| re.is_match(plz))
        .unwrap_or(false)
        && !plz.starts_with("00")
}

/// Returns the list of violated password rules, empty when the password is acceptable.
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
    let mut violations = vec![];
    if password.chars().count() < 8 {
        violations.push("Mindestens 8 Zeichen");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push("Mindestens ein Großbuchstabe");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        violations.push("Mindestens ein Kleinbuchstabe");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Mindestens eine Ziffer");
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "DE89370400440532013000";

    #[test]
    fn valid_german_iban_passes() {
        assert!(is_valid_german_iban(VALID));
        assert!(is_valid_german_iban("de89 3704 0044 0532 0130 00"));
    }

    #[test]
    fn any_single_digit_change_is_detected() {
        for position in 2..VALID.len() {
            let mut chars: Vec<char> = VALID.chars().collect();
            let digit = chars[position].to_digit(10).unwrap();
            chars[position] = std::char::from_digit((digit + 1) % 10, 10).unwrap();
            let altered: String = chars.into_iter().collect();
            assert!(
                !is_valid_german_iban(&altered),
                "altered IBAN {} must be rejected",
                altered
            );
        }
    }

    #[test]
    fn foreign_ibans_are_rejected() {
        // valid Austrian and British IBANs
        assert!(!is_valid_german_iban("AT611904300234573201"));
        assert!(!is_valid_german_iban("GB82WEST12345698765432"));
    }

    #[test]
    fn wrong_length_and_letters_are_rejected() {
        assert!(!is_valid_german_iban("DE8937040044053201300"));
        assert!(!is_valid_german_iban("DE89370400440532013000 1"));
        assert!(!is_valid_german_iban("DE89A70400440532013000"));
        assert!(!is_valid_german_iban(""));
    }

    #[test]
    fn iban_is_grouped_by_four() {
        assert_eq!(format_iban(VALID), "DE89 3704 0044 0532 0130 00");
    }

    #[test]
    fn plz_rules() {
        assert!(is_valid_plz("10115"));
        assert!(is_valid_plz(" 80331 "));
        assert!(!is_valid_plz("1011"));
        assert!(!is_valid_plz("00123"));
        assert!(!is_valid_plz("1011a"));
    }

    #[test]
    fn password_rules() {
        assert!(password_policy_violations("Sicher123").is_empty());
        assert_eq!(password_policy_violations("kurz").len(), 3);
        assert_eq!(
            password_policy_violations("alleskleinundlang1"),
            vec!["Mindestens ein Großbuchstabe"]
        );
    }
}
