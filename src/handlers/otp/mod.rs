pub mod send;
pub mod verify;

/// Drop the separators a user may type inside a phone number
fn compact_phone(phone: &str) -> String {
    phone.replace([' ', '-'], "")
}
