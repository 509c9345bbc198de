use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::AcademyError;

/// Stored passwords starting with this marker can never be verified.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// bcrypt only reads this many bytes of input; longer passwords are refused
/// rather than silently truncated.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Hashes `raw` with bcrypt, or returns an unusable marker when there is no password.
pub fn make_password(raw: Option<&str>) -> Result<String, AcademyError> {
    match raw {
        Some(raw) if raw.len() > PASSWORD_MAX_BYTES => Err(AcademyError::FieldRejected(format!(
            "password is {} bytes long, at most {PASSWORD_MAX_BYTES} allowed",
            raw.len()
        ))),
        Some(raw) => Ok(hash(raw, DEFAULT_COST)?),
        None => Ok(UNUSABLE_PASSWORD_PREFIX.to_string()),
    }
}

/// Checks `raw` against a stored hash. Unusable markers never match.
pub fn verify_password(raw: &str, stored: &str) -> Result<bool, AcademyError> {
    if !is_usable(stored) || raw.len() > PASSWORD_MAX_BYTES {
        return Ok(false);
    }
    Ok(verify(raw, stored)?)
}

pub fn is_usable(stored: &str) -> bool {
    !stored.starts_with(UNUSABLE_PASSWORD_PREFIX)
}
