use rand::{thread_rng, Rng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get EPOCH timestamp in milliseconds
pub fn get_epoch_ts() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_millis() as u64,
        Err(_) => panic!("SystemTime before UNIX EPOCH!"),
    }
}

/// Convert minutes into milliseconds
pub fn mins_to_ms(mins: u64) -> u64 {
    mins * 60 * 1000
}

/// Generate OTP of a given length, every digit drawn uniformly
pub fn generate_otp(len: u32) -> String {
    let mut rng = thread_rng();
    (0..len)
        .map(|_| {
            let n = rng.gen_range(0..10);
            char::from_digit(n, 10).unwrap_or('0')
        })
        .collect()
}

/// Parse boolean flags from env values like "true", "1", "yes"
pub fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
