// Client-side input validation
// Nothing in here touches the network.

use crate::models::Guest;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Loose `local@domain.tld` shape, unanchored: any run of non-whitespace
/// containing `x@y.z` with each part non-empty.
pub static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

const REQUIRED: &str = "required";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateRangeError {
    #[error("Please select both check-in and check-out dates")]
    MissingDates,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,
}

/// Parses a `YYYY-MM-DD` stay. Checks run in order: presence, format, ordering.
pub fn validate_stay(check_in: &str, check_out: &str) -> Result<(NaiveDate, NaiveDate), DateRangeError> {
    let (check_in, check_out) = (check_in.trim(), check_out.trim());
    if check_in.is_empty() || check_out.is_empty() {
        return Err(DateRangeError::MissingDates);
    }

    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| DateRangeError::InvalidDate(raw.to_string()))
    };
    let (check_in, check_out) = (parse(check_in)?, parse(check_out)?);

    if check_in >= check_out {
        return Err(DateRangeError::CheckOutNotAfterCheckIn);
    }
    Ok((check_in, check_out))
}

/// Per-field messages for the booking form. Empty when the form is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestFieldErrors {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dates: Option<String>,
}

impl GuestFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.dates,
        ]
        .into_iter()
        .filter_map(|m| m.as_deref())
    }
}

impl fmt::Display for GuestFieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.messages().collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for GuestFieldErrors {}

/// Checks every contact field and reports all failures together.
pub fn validate_guest(guest: &Guest) -> GuestFieldErrors {
    match guest.validate() {
        Ok(()) => GuestFieldErrors::default(),
        Err(errors) => GuestFieldErrors {
            first_name: field_message(&errors, "first_name"),
            last_name: field_message(&errors, "last_name"),
            email: field_message(&errors, "email"),
            phone: field_message(&errors, "phone"),
            dates: None,
        },
    }
}

// A blank value fails both "required" and the shape rule; report "required".
fn field_message(errors: &ValidationErrors, field: &str) -> Option<String> {
    let field_errors = errors.field_errors();
    let failures = field_errors.get(field)?;
    failures
        .iter()
        .find(|e| e.code == REQUIRED)
        .or_else(|| failures.first())
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

pub fn looks_like_email(input: &str) -> bool {
    EMAIL_SHAPE.is_match(input)
}
