//! Registration field validation.
//!
//! Pure functions from field text to a validation outcome, shared by the
//! form POST handler and the live-validation fragment endpoint. Keeping them
//! free of any HTTP or HTML concern lets the rules be tested directly.

use std::sync::LazyLock;

use regex::Regex;

/// Letters (including the Latin-1 accented ranges), spaces, apostrophes
/// and hyphens.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ' -]+$").expect("valid name pattern"));

/// Exactly `+226 dddd dddd`: literal country code, single spaces,
/// four-then-four digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+226 \d{4} \d{4}$").expect("valid phone pattern"));

pub const NAME_REQUIRED: &str = "Le nom est requis.";
pub const NAME_CHARSET: &str =
    "Le nom ne doit contenir que des lettres, espaces, apostrophes ou tirets.";
pub const PHONE_REQUIRED: &str = "Le numéro est requis.";
pub const PHONE_FORMAT: &str = "Format attendu : +226 5614 1234 (ex : +226 5614 1234).";

/// Validate the registrant name.
///
/// The input is trimmed first; an empty result and a charset violation
/// produce distinct messages.
pub fn validate_name(raw: &str) -> Result<(), &'static str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(NAME_REQUIRED);
    }
    if !NAME_RE.is_match(value) {
        return Err(NAME_CHARSET);
    }
    Ok(())
}

/// Validate the registrant phone number.
pub fn validate_phone(raw: &str) -> Result<(), &'static str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(PHONE_REQUIRED);
    }
    if !PHONE_RE.is_match(value) {
        return Err(PHONE_FORMAT);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_accented_and_compound_names() {
        assert!(validate_name("Jean-Paul O'Brien").is_ok());
        assert!(validate_name("Aïcha Ouédraogo").is_ok());
        assert!(validate_name("  Fatou  ").is_ok());
    }

    #[test]
    fn rejects_empty_and_non_letter_names() {
        assert_eq!(validate_name(""), Err(NAME_REQUIRED));
        assert_eq!(validate_name("   "), Err(NAME_REQUIRED));
        assert_eq!(validate_name("John123"), Err(NAME_CHARSET));
        assert_eq!(validate_name("a@b"), Err(NAME_CHARSET));
    }

    #[test]
    fn accepts_exact_phone_format() {
        assert!(validate_phone("+226 5614 1234").is_ok());
        assert!(validate_phone(" +226 7000 0001 ").is_ok());
    }

    #[test]
    fn rejects_malformed_phones() {
        assert_eq!(validate_phone(""), Err(PHONE_REQUIRED));
        assert_eq!(validate_phone("+226 561 1234"), Err(PHONE_FORMAT));
        assert_eq!(validate_phone("226 5614 1234"), Err(PHONE_FORMAT));
        assert_eq!(validate_phone("+226  5614 1234"), Err(PHONE_FORMAT));
        assert_eq!(validate_phone("+226 5614 12345"), Err(PHONE_FORMAT));
    }
}
