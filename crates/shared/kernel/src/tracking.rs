//! Human-shareable tracking identifiers.
//!
//! Shape: `TRANS` + the current Unix time in milliseconds as upper-case base 36 + six random
//! upper-case alphanumerics, e.g. `TRANSMC2K9A1BX7Q2RZ`.

use chrono::Utc;
use tport_domain::constants::TRACKING_ID_PREFIX;

const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[char; 36] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[must_use]
pub fn generate_tracking_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    format!(
        "{TRACKING_ID_PREFIX}{}{}",
        to_base36(millis),
        nanoid::nanoid!(SUFFIX_LEN, SUFFIX_ALPHABET)
    )
}

/// Canonical form used for storage and lookups.
#[must_use]
pub fn normalize(tracking_id: &str) -> String {
    tracking_id.trim().to_ascii_uppercase()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn generated_ids_have_prefix_and_uppercase_body() {
        let id = generate_tracking_id();
        assert!(id.starts_with(TRACKING_ID_PREFIX));
        let body = &id[TRACKING_ID_PREFIX.len()..];
        assert!(body.len() > SUFFIX_LEN);
        assert!(body.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_tracking_id(), generate_tracking_id());
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize("  transabc123 "), "TRANSABC123");
    }
}
