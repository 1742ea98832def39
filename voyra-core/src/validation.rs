use chrono::{NaiveDate, Utc};

use crate::{CoreError, CoreResult};

/// Manifest forms debounce these checks client-side; the server is the
/// authority and re-runs them on every write.
pub fn validate_person_name(field: &str, value: &str) -> CoreResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(format!("{} must not be empty", field)));
    }
    if trimmed.len() > 120 {
        return Err(CoreError::ValidationError(format!("{} exceeds 120 characters", field)));
    }
    Ok(())
}

pub fn validate_birth_date(birth_date: NaiveDate) -> CoreResult<()> {
    let today = Utc::now().date_naive();
    if birth_date > today {
        return Err(CoreError::ValidationError(
            "birth_date must not be in the future".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_party_size(count: usize, max: usize) -> CoreResult<()> {
    if count == 0 {
        return Err(CoreError::ValidationError("manifest must not be empty".to_string()));
    }
    if count > max {
        return Err(CoreError::ValidationError(format!(
            "manifest holds {} passengers, limit is {}",
            count, max
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> CoreResult<()> {
    // Same cheap shape check the dashboards run; real validation is the
    // confirmation mail.
    let valid = email.len() <= 254
        && email.split_once('@').map(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }) == Some(true);
    if !valid {
        return Err(CoreError::ValidationError(format!("invalid email: {}", email)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert!(validate_person_name("first_name", "Ana").is_ok());
        assert!(validate_person_name("first_name", "  ").is_err());
        assert!(validate_person_name("last_name", &"x".repeat(121)).is_err());
    }

    #[test]
    fn test_birth_date_not_in_future() {
        let past = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert!(validate_birth_date(past).is_ok());
        let future = Utc::now().date_naive() + chrono::Days::new(2);
        assert!(validate_birth_date(future).is_err());
    }

    #[test]
    fn test_party_size_limits() {
        assert!(validate_party_size(1, 40).is_ok());
        assert!(validate_party_size(0, 40).is_err());
        assert!(validate_party_size(41, 40).is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("ops@voyra.example").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@.bad").is_err());
    }
}
