//! Phone number utilities
//!
//! The backend is the authority on phone number format; the client only
//! normalizes user input before transmission and masks numbers before
//! logging them.

use once_cell::sync::Lazy;
use regex::Regex;

// Loose sanity check: optional leading '+', then 7 to 15 digits.
static PLAUSIBLE_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?\d{7,15}$").unwrap()
});

/// Normalize a phone number by removing common formatting characters.
///
/// Keeps digits and a leading `+`; strips spaces, dashes, dots and
/// parentheses. Free-form input like `"077 234-5678"` becomes
/// `"0772345678"`.
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect()
}

/// Check whether a normalized phone number looks like it could be a phone
/// number at all. Deliberately loose: the server applies the real rules.
pub fn is_plausible_phone_number(phone: &str) -> bool {
    PLAUSIBLE_PHONE_REGEX.is_match(phone)
}

/// Mask a phone number for logging, keeping only the last 4 digits
/// (e.g. `0772345678` becomes `******5678`).
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() > 4 {
        format!(
            "{}{}",
            "*".repeat(normalized.len() - 4),
            &normalized[normalized.len() - 4..]
        )
    } else {
        "*".repeat(normalized.len().max(4))
    }
}
