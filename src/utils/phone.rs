use crate::constants::COUNTRY_CODE;

/// Normalize a phone number into E.164 form for the domestic country code.
///
/// - already starting with `+91`: returned unchanged
/// - starting with bare `91` and more than 10 digits: `+` is prepended
/// - exactly 10 digits (separators ignored): `+91` and the digits
/// - anything else gets a leading `+` when it is missing
///
/// Applying the function twice gives the same result as applying it once.
pub fn normalize_phone(phone: &str) -> String {
    let prefixed = format!("+{COUNTRY_CODE}");
    if phone.starts_with(&prefixed) {
        return phone.to_owned();
    }
    let digits = phone
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if phone.starts_with(COUNTRY_CODE) && digits.len() > 10 {
        return format!("+{phone}");
    }
    if digits.len() == 10 {
        return format!("{prefixed}{digits}");
    }
    if phone.starts_with('+') {
        phone.to_owned()
    } else {
        format!("+{phone}")
    }
}

/// Strip the domestic country code and return the 10 digit local number
/// Returns None when the number is not a domestic number
pub fn local_number(phone: &str) -> Option<String> {
    let normalized = normalize_phone(phone);
    let local = normalized.strip_prefix(&format!("+{COUNTRY_CODE}"))?;
    if local.len() == 10 && local.chars().all(|ch| ch.is_ascii_digit()) {
        Some(local.to_owned())
    } else {
        None
    }
}
