use crate::error::{AppError, Result};
use uuid::Uuid;

/// Rejects missing-in-spirit values: empty and whitespace-only strings.
pub fn require_non_blank(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}

/// Record ids are UUIDs minted at creation; anything else is a malformed id,
/// not a missing record.
pub fn validate_record_id(id: &str) -> Result<()> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation("Invalid ID format".to_string()))?;
    Ok(())
}

/// Posts carry between one and `max` tags, none of them blank.
pub fn validate_tags(tags: &[String], max: usize) -> Result<()> {
    if tags.is_empty() || tags.len() > max {
        return Err(AppError::Validation(
            "Tags condition not satisfied".to_string(),
        ));
    }

    for tag in tags {
        require_non_blank(tag, "Tags condition not satisfied")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(require_non_blank("hello", "required").is_ok());
        assert!(require_non_blank("", "required").is_err());
        assert!(require_non_blank("   ", "required").is_err());
        assert!(require_non_blank("\t\n", "required").is_err());
    }

    #[test]
    fn record_ids_must_be_uuids() {
        assert!(validate_record_id("4f0d38ca-2dde-4d1a-b3f0-6a2e5f9ad7cb").is_ok());
        assert!(validate_record_id("not-an-id").is_err());
        assert!(validate_record_id("").is_err());
        // Injection-shaped ids never reach a query.
        assert!(validate_record_id("post:1; DELETE post").is_err());
    }

    #[test]
    fn tag_count_is_bounded() {
        let one = vec!["go".to_string()];
        assert!(validate_tags(&one, 10).is_ok());

        assert!(validate_tags(&[], 10).is_err());

        let eleven: Vec<String> = (0..11).map(|i| format!("t{}", i)).collect();
        assert!(validate_tags(&eleven, 10).is_err());

        let ten: Vec<String> = (0..10).map(|i| format!("t{}", i)).collect();
        assert!(validate_tags(&ten, 10).is_ok());
    }

    #[test]
    fn blank_tags_are_rejected() {
        let tags = vec!["go".to_string(), "  ".to_string()];
        assert!(validate_tags(&tags, 10).is_err());
    }
}
