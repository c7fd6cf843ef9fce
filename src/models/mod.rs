//! Database models and DTOs for all domain entities.

pub mod dwr;
pub mod expense;
pub mod interaction;
pub mod job;
pub mod lead;
pub mod pagination;
pub mod range;
pub mod target;
pub mod user;

use validator::ValidationError;

/// Rejects strings that are empty once trimmed. Stored values are trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
