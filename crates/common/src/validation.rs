//! Input validation for external inputs, plus safe clock helpers.
//!
//! Repository methods never validate; the facade runs these checks before
//! touching the core so malformed requests map cleanly to InvalidArgument.

use anyhow::{anyhow, Result};
use chrono::Utc;

/// Maximum length for resource ids (camera_id, task_id, session_id, ...).
pub const MAX_ID_LENGTH: usize = 256;

/// Maximum length for display names.
pub const MAX_NAME_LENGTH: usize = 512;

/// Current time as epoch milliseconds. All wire timestamps use this form.
pub fn epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Validate string length against a maximum.
pub fn validate_length(value: &str, max_length: usize, field_name: &str) -> Result<()> {
    if value.len() > max_length {
        return Err(anyhow!(
            "{} exceeds maximum length of {} bytes (got {})",
            field_name,
            max_length,
            value.len()
        ));
    }
    Ok(())
}

/// Validate non-empty string.
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }
    Ok(())
}

/// Validate a resource id (camera_id, session_id, etc.).
pub fn validate_id(id: &str, field_name: &str) -> Result<()> {
    validate_non_empty(id, field_name)?;
    validate_length(id, MAX_ID_LENGTH, field_name)?;

    // Ids are embedded in paths; no separators or traversal sequences.
    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(anyhow!(
            "{} contains invalid characters (no path separators or '..' allowed)",
            field_name
        ));
    }

    Ok(())
}

/// Validate a display name.
pub fn validate_name(name: &str, field_name: &str) -> Result<()> {
    validate_non_empty(name, field_name)?;
    validate_length(name, MAX_NAME_LENGTH, field_name)?;
    Ok(())
}

/// Validate a long-poll timeout. Zero and negative values are rejected
/// rather than silently reset.
pub fn validate_timeout_ms(timeout_ms: i64, field_name: &str) -> Result<u64> {
    if timeout_ms <= 0 {
        return Err(anyhow!("{} must be positive, got {}", field_name, timeout_ms));
    }
    Ok(timeout_ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_ms() {
        // After 2023 in milliseconds.
        assert!(epoch_ms() > 1_700_000_000_000);
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("cam-123", "camera_id").is_ok());
        assert!(validate_id("valid_id_with-dashes_123", "id").is_ok());

        assert!(validate_id("", "id").is_err());
        assert!(validate_id("  ", "id").is_err());
        assert!(validate_id("../etc/passwd", "id").is_err());
        assert!(validate_id("path/to/something", "id").is_err());
        assert!(validate_id(&"a".repeat(300), "id").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("studio camera 1", "name").is_ok());
        assert!(validate_name("", "name").is_err());
        assert!(validate_name(&"a".repeat(600), "name").is_err());
    }

    #[test]
    fn test_validate_timeout_ms() {
        assert_eq!(validate_timeout_ms(30_000, "timeout_ms").unwrap(), 30_000);
        assert!(validate_timeout_ms(0, "timeout_ms").is_err());
        assert!(validate_timeout_ms(-5, "timeout_ms").is_err());
    }
}
