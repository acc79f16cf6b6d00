use thiserror::Error;

/// Minimum length accepted for an admin password
const MIN_PASSWORD_LENGTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Phone number is required")]
    PhoneMissing,

    #[error("Phone number must start with +998")]
    PhoneCountryCode,

    #[error("Phone number format is invalid (+998XXXXXXXXX)")]
    PhoneFormat,

    #[error("Password is required")]
    PasswordMissing,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
}

/// Validate an Uzbek phone number and return it normalized to `+998XXXXXXXXX`.
///
/// Whitespace, dashes and parentheses are ignored.
pub fn validate_phone_number(phone: &str) -> Result<String, InputError> {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.is_empty() {
        return Err(InputError::PhoneMissing);
    }
    if !cleaned.starts_with("+998") {
        return Err(InputError::PhoneCountryCode);
    }

    let rest = &cleaned[4..];
    if rest.len() != 9 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(InputError::PhoneFormat);
    }

    Ok(cleaned)
}

/// A blank password is missing. The length check counts every character,
/// and the password is sent exactly as typed.
pub fn validate_password(password: &str) -> Result<(), InputError> {
    if password.trim().is_empty() {
        return Err(InputError::PasswordMissing);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(InputError::PasswordTooShort);
    }
    Ok(())
}
