//! Formatting and input validation helpers.

pub mod format;
pub mod validation;

// Re-export commonly used functions at module level
pub use format::{
    contains_ignore_case, format_currency, format_date, format_number, format_phone, truncate,
};
pub use validation::{validate_password, validate_phone_number, InputError};
