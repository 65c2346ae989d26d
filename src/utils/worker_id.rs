use chrono::{Datelike, Utc};
use rand::{thread_rng, Rng};

use crate::constants::*;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a new worker id of the form `MWAP-XXXXX-YYYY`
pub fn generate_worker_id() -> String {
    let year = Utc::now().year();
    format_worker_id(&random_suffix(), year)
}

/// Build the worker id from a given suffix and year
pub fn format_worker_id(suffix: &str, year: i32) -> String {
    format!("{WORKER_ID_PREFIX}-{suffix}-{year:04}")
}

/// Check whether the given value looks like a worker id
pub fn is_worker_id(id: &str) -> bool {
    let mut parts = id.split('-');
    let (Some(prefix), Some(suffix), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == WORKER_ID_PREFIX
        && suffix.len() == WORKER_ID_SUFFIX_LEN
        && suffix
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
        && year.len() == 4
        && year.chars().all(|ch| ch.is_ascii_digit())
}

fn random_suffix() -> String {
    let mut rng = thread_rng();
    (0..WORKER_ID_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_worker_id() {
        assert_eq!(format_worker_id("Z9Q3K", 2025), "MWAP-Z9Q3K-2025");
    }

    #[test]
    fn test_generate_worker_id_pattern() {
        let year = Utc::now().year();
        for _ in 0..50 {
            let id = generate_worker_id();
            assert!(is_worker_id(&id), "invalid worker id {id}");
            assert!(id.ends_with(&format!("-{year}")));
            assert_eq!(id.len(), "MWAP-XXXXX-YYYY".len());
        }
    }

    #[test]
    fn test_is_worker_id() {
        assert!(is_worker_id("MWAP-A1B2C-2025"));
        assert!(!is_worker_id("MWAP-a1b2c-2025"));
        assert!(!is_worker_id("MWAP-A1B2-2025"));
        assert!(!is_worker_id("XWAP-A1B2C-2025"));
        assert!(!is_worker_id("MWAP-A1B2C-25"));
        assert!(!is_worker_id("MWAP-A1B2C-2025-1"));
    }
}
