//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Maximum length of a single interest tag token.
const MAX_TAG_LENGTH: usize = 64;

/// Maximum number of interest tags on a profile or event.
const MAX_TAG_COUNT: usize = 50;

/// Maximum preferred radius in kilometres.
const MAX_RADIUS_KM: f64 = 500.0;

lazy_static::lazy_static! {
    static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_.-]{3,32}$").unwrap();
}

/// Validates a username: 3-32 chars of letters, digits, `_`, `.`, `-`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username must be 3-32 characters of letters, digits, '_', '.', '-'".into());
        Err(err)
    }
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates a preferred radius in kilometres (positive, bounded).
pub fn validate_radius_km(radius: f64) -> Result<(), ValidationError> {
    if radius > 0.0 && radius <= MAX_RADIUS_KM {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be between 0 and 500 km".into());
        Err(err)
    }
}

/// Validates a list of interest tags: bounded count, each token non-empty
/// after trimming and within the length limit.
pub fn validate_interest_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAG_COUNT {
        let mut err = ValidationError::new("tags_count");
        err.message = Some("At most 50 interest tags are allowed".into());
        return Err(err);
    }
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            let mut err = ValidationError::new("tag_empty");
            err.message = Some("Interest tags must not be empty".into());
            return Err(err);
        }
        if trimmed.chars().count() > MAX_TAG_LENGTH {
            let mut err = ValidationError::new("tag_length");
            err.message = Some("Interest tags must be at most 64 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Validates an event time window: start strictly before end.
pub fn validate_time_window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if starts_at < ends_at {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_window");
        err.message = Some("Event must start before it ends".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // Username tests
    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_92").is_ok());
        assert!(validate_username("a.b-c").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("way_too_long_username_over_32_chars!").is_err());
    }

    #[test]
    fn test_validate_username_error_message() {
        let err = validate_username("!").unwrap_err();
        assert!(err.message.unwrap().to_string().contains("3-32 characters"));
    }

    // Latitude tests
    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    // Longitude tests
    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    // Radius tests
    #[test]
    fn test_validate_radius_km() {
        assert!(validate_radius_km(5.0).is_ok());
        assert!(validate_radius_km(500.0).is_ok());
        assert!(validate_radius_km(0.0).is_err());
        assert!(validate_radius_km(-1.0).is_err());
        assert!(validate_radius_km(500.1).is_err());
    }

    // Tag list tests
    #[test]
    fn test_validate_interest_tags() {
        assert!(validate_interest_tags(&["Spanish".into(), "Photography".into()]).is_ok());
        assert!(validate_interest_tags(&[]).is_ok());
        assert!(validate_interest_tags(&["  ".into()]).is_err());
        assert!(validate_interest_tags(&["x".repeat(65)]).is_err());

        let too_many: Vec<String> = (0..51).map(|i| format!("tag{}", i)).collect();
        assert!(validate_interest_tags(&too_many).is_err());
    }

    #[test]
    fn test_validate_interest_tags_error_message() {
        let err = validate_interest_tags(&["".into()]).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Interest tags must not be empty"
        );
    }

    // Time window tests
    #[test]
    fn test_validate_time_window() {
        let now = Utc::now();
        assert!(validate_time_window(now, now + Duration::hours(2)).is_ok());
        assert!(validate_time_window(now, now).is_err());
        assert!(validate_time_window(now, now - Duration::hours(1)).is_err());
    }
}
