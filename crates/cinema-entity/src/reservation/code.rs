//! Confirmation code generation.

use uuid::Uuid;

/// Prefix carried by every confirmation code.
pub const CONFIRMATION_CODE_PREFIX: &str = "RES";

/// Generate a confirmation code: `RES` followed by 12 uppercase hex digits.
pub fn generate_confirmation_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!(
        "{CONFIRMATION_CODE_PREFIX}{}",
        simple[..12].to_ascii_uppercase()
    )
}
