//! Input validation run before any remote call.
//!
//! Failures here are shown inline next to the offending field, so every
//! variant's message is written for end users.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// UK mobile numbers: `+44 7xxx xxx xxx` or `07xxx xxx xxx`, optional spaces.
static UK_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+44\s?7\d{3}|\(?07\d{3}\)?)\s?\d{3}\s?\d{3}$").expect("Invalid regex")
});

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("Invalid regex"));

/// Validation failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("Username may only contain letters, numbers, '_' and '.'")]
    UsernameCharacters,
    #[error("This username is not available. Please try another.")]
    UsernameTaken,
    #[error("Invalid UK phone number format")]
    PhoneNumber,
    #[error("Invalid date")]
    Date,
    #[error("Date of birth cannot be in the future")]
    FutureDate,
    #[error("The email address is badly formatted.")]
    Email,
    #[error("Rating must be between 1 and 5")]
    Rating,
    #[error("{0} cannot be empty")]
    Required(&'static str),
}

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

/// Check a username and return it trimmed.
///
/// # Errors
///
/// Returns `UsernameLength` or `UsernameCharacters`.
pub fn username(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::UsernameLength {
            min: USERNAME_MIN_LENGTH,
            max: USERNAME_MAX_LENGTH,
        });
    }
    if !USERNAME.is_match(trimmed) {
        return Err(ValidationError::UsernameCharacters);
    }
    Ok(trimmed.to_owned())
}

/// Check a UK mobile phone number.
///
/// # Errors
///
/// Returns `PhoneNumber` if the number does not match the UK mobile format.
pub fn uk_phone_number(raw: &str) -> Result<(), ValidationError> {
    if UK_PHONE.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::PhoneNumber)
    }
}

/// Parse a `YYYY-MM-DD` date of birth that is not after `today`.
///
/// # Errors
///
/// Returns `Date` for unparseable input and `FutureDate` for dates after `today`.
pub fn date_of_birth(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date =
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::Date)?;
    if date > today {
        return Err(ValidationError::FutureDate);
    }
    Ok(date)
}

/// Shape check for an email address: one `@` with text on both sides and a
/// dot in the domain.
///
/// # Errors
///
/// Returns `Email` if the address is malformed.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(ValidationError::Email);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::Email);
    }
    Ok(trimmed.to_owned())
}

/// Check a review rating is within 1 to 5 stars.
///
/// # Errors
///
/// Returns `Rating` when out of range.
pub fn rating(stars: u8) -> Result<u8, ValidationError> {
    if (crate::Review::MIN_RATING..=crate::Review::MAX_RATING).contains(&stars) {
        Ok(stars)
    } else {
        Err(ValidationError::Rating)
    }
}

/// Reject blank required text fields.
///
/// # Errors
///
/// Returns `Required` naming the field.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert_eq!(username("  shopper_1 ").unwrap(), "shopper_1");
        assert!(matches!(
            username("ab"),
            Err(ValidationError::UsernameLength { .. })
        ));
        assert_eq!(username("bad name"), Err(ValidationError::UsernameCharacters));
        assert_eq!(username("émile"), Err(ValidationError::UsernameCharacters));
    }

    #[test]
    fn test_uk_phone_numbers() {
        assert!(uk_phone_number("07123 456 789").is_ok());
        assert!(uk_phone_number("07123456789").is_ok());
        assert!(uk_phone_number("+44 7123 456789").is_ok());
        assert!(uk_phone_number("+447123456789").is_ok());
        assert!(uk_phone_number("(07123) 456 789").is_ok());
        assert_eq!(uk_phone_number("0141 123 4567"), Err(ValidationError::PhoneNumber));
        assert_eq!(uk_phone_number("12345"), Err(ValidationError::PhoneNumber));
    }

    #[test]
    fn test_date_of_birth() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            date_of_birth("1990-02-28", today).unwrap(),
            NaiveDate::from_ymd_opt(1990, 2, 28).unwrap()
        );
        assert_eq!(date_of_birth("1990-02-30", today), Err(ValidationError::Date));
        assert_eq!(date_of_birth("tomorrow", today), Err(ValidationError::Date));
        assert_eq!(
            date_of_birth("2030-01-01", today),
            Err(ValidationError::FutureDate)
        );
    }

    #[test]
    fn test_email_shape() {
        assert_eq!(email(" user@example.com ").unwrap(), "user@example.com");
        assert!(email("user@example").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("user@@example.com").is_err());
        assert!(email("us er@example.com").is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(rating(0).is_err());
        assert_eq!(rating(5).unwrap(), 5);
        assert!(rating(6).is_err());
    }
}
