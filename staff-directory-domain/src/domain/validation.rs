//! Field and password rules gating every mutating identity operation.
//!
//! Creation checks run in a fixed order and stop at the first broken rule,
//! so a caller only ever sees one violation per call.

use crate::domain::entities::{attribute_keys, Attributes, NewIdentity};
use crate::domain::errors::{DirectoryError, DirectoryResult};
use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static HANDLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,15}$").expect("handle pattern compiles"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,10}$").expect("phone pattern compiles"));

static BIRTHDATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("birthdate pattern compiles"));

const BIRTHDATE_FORMAT: &str = "%d/%m/%Y";
const MAX_ADDRESS_CHARS: usize = 30;
const MIN_PASSWORD_CHARS: usize = 8;
const MAX_AGE_YEARS: i32 = 150;

/// A single validation rule, reported when it is the first one broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationRule {
    HandleRequired,
    Handle,
    DocumentRequired,
    Email,
    Phone,
    Address,
    BirthdateRequired,
    BirthdateFormat,
    BirthdateAgeRange,
    Password,
    EmptyUpdate,
    NotUpdatable,
}

impl ValidationRule {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationRule::HandleRequired => "Handle is required",
            ValidationRule::Handle => "Username must be alphanumeric and up to 15 characters",
            ValidationRule::DocumentRequired => "Document is required",
            ValidationRule::Email => "Email is not valid",
            ValidationRule::Phone => "Phone must have 1 to 10 digits",
            ValidationRule::Address => "Address must be <= 30 characters",
            ValidationRule::BirthdateRequired => "Birthdate is required",
            ValidationRule::BirthdateFormat => "Birthdate must be in format DD/MM/YYYY",
            ValidationRule::BirthdateAgeRange => "Age must be between 0 and 150 years",
            ValidationRule::Password => {
                "Password must have at least 8 chars, 1 uppercase, 1 number, 1 special char"
            }
            ValidationRule::EmptyUpdate => "At least one updatable attribute is required",
            ValidationRule::NotUpdatable => {
                "Only email, phone_number, address and birthdate can be updated"
            }
        }
    }

    /// Attribute the rule applies to, for mapping errors onto form fields
    pub fn field(&self) -> &'static str {
        match self {
            ValidationRule::HandleRequired | ValidationRule::Handle => "username",
            ValidationRule::DocumentRequired => attribute_keys::DOCUMENT,
            ValidationRule::Email => attribute_keys::EMAIL,
            ValidationRule::Phone => attribute_keys::PHONE_NUMBER,
            ValidationRule::Address => attribute_keys::ADDRESS,
            ValidationRule::BirthdateRequired
            | ValidationRule::BirthdateFormat
            | ValidationRule::BirthdateAgeRange => attribute_keys::BIRTHDATE,
            ValidationRule::Password => "password",
            ValidationRule::EmptyUpdate | ValidationRule::NotUpdatable => "attributes",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

fn check(ok: bool, rule: ValidationRule) -> DirectoryResult<()> {
    if ok {
        Ok(())
    } else {
        Err(DirectoryError::invalid(rule))
    }
}

pub fn validate_handle(handle: &str) -> DirectoryResult<()> {
    check(HANDLE_PATTERN.is_match(handle), ValidationRule::Handle)
}

/// Lifecycle and lookup calls only require a non-empty handle
pub fn require_handle(handle: &str) -> DirectoryResult<()> {
    check(!handle.trim().is_empty(), ValidationRule::HandleRequired)
}

pub fn validate_document(document: Option<&str>) -> DirectoryResult<()> {
    check(
        document.is_some_and(|d| !d.trim().is_empty()),
        ValidationRule::DocumentRequired,
    )
}

pub fn validate_email(email: &str) -> DirectoryResult<()> {
    check(email.contains('@') && email.contains('.'), ValidationRule::Email)
}

pub fn validate_phone(phone: &str) -> DirectoryResult<()> {
    check(PHONE_PATTERN.is_match(phone), ValidationRule::Phone)
}

pub fn validate_address(address: &str) -> DirectoryResult<()> {
    check(
        address.chars().count() <= MAX_ADDRESS_CHARS,
        ValidationRule::Address,
    )
}

pub fn validate_password(password: &str) -> DirectoryResult<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_CHARS;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    check(
        long_enough && has_upper && has_digit && has_special,
        ValidationRule::Password,
    )
}

/// Validate a birthdate against today's date (UTC)
pub fn validate_birthdate(birthdate: Option<&str>) -> DirectoryResult<()> {
    validate_birthdate_on(birthdate, Utc::now().date_naive())
}

/// Validate a birthdate against an explicit reference date
pub fn validate_birthdate_on(birthdate: Option<&str>, today: NaiveDate) -> DirectoryResult<()> {
    let raw = birthdate.ok_or_else(|| DirectoryError::invalid(ValidationRule::BirthdateRequired))?;

    if !BIRTHDATE_SHAPE.is_match(raw) {
        return Err(DirectoryError::invalid(ValidationRule::BirthdateFormat));
    }

    let date = NaiveDate::parse_from_str(raw, BIRTHDATE_FORMAT)
        .map_err(|_| DirectoryError::invalid(ValidationRule::BirthdateFormat))?;

    let age = whole_years_between(date, today);
    check(
        (0..=MAX_AGE_YEARS).contains(&age),
        ValidationRule::BirthdateAgeRange,
    )
}

/// Completed years from `from` to `to`; negative when `from` lies in the future
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// Full creation check, stopping at the first broken rule
pub fn validate_new_identity(candidate: &NewIdentity) -> DirectoryResult<()> {
    validate_new_identity_on(candidate, Utc::now().date_naive())
}

pub fn validate_new_identity_on(candidate: &NewIdentity, today: NaiveDate) -> DirectoryResult<()> {
    let attrs = &candidate.attributes;

    validate_handle(&candidate.handle)?;
    validate_document(attrs.get(attribute_keys::DOCUMENT))?;

    match attrs.get(attribute_keys::EMAIL) {
        Some(email) => validate_email(email)?,
        None => return Err(DirectoryError::invalid(ValidationRule::Email)),
    }

    match attrs.get(attribute_keys::PHONE_NUMBER) {
        Some(phone) => validate_phone(phone)?,
        None => return Err(DirectoryError::invalid(ValidationRule::Phone)),
    }

    match attrs.get(attribute_keys::ADDRESS) {
        Some(address) => validate_address(address)?,
        None => return Err(DirectoryError::invalid(ValidationRule::Address)),
    }

    validate_birthdate_on(attrs.get(attribute_keys::BIRTHDATE), today)?;
    validate_password(candidate.password())
}

/// Per-field rules applied only to the attributes present in a partial update.
///
/// Keys outside [`attribute_keys::UPDATABLE`] are refused before any field rule runs.
pub fn validate_partial_attributes(partial: &Attributes) -> DirectoryResult<()> {
    validate_partial_attributes_on(partial, Utc::now().date_naive())
}

pub fn validate_partial_attributes_on(partial: &Attributes, today: NaiveDate) -> DirectoryResult<()> {
    check(
        partial
            .iter()
            .all(|(key, _)| attribute_keys::UPDATABLE.contains(&key)),
        ValidationRule::NotUpdatable,
    )?;

    if let Some(email) = partial.get(attribute_keys::EMAIL) {
        validate_email(email)?;
    }

    if let Some(phone) = partial.get(attribute_keys::PHONE_NUMBER) {
        validate_phone(phone)?;
    }

    if let Some(address) = partial.get(attribute_keys::ADDRESS) {
        validate_address(address)?;
    }

    if let Some(birthdate) = partial.get(attribute_keys::BIRTHDATE) {
        validate_birthdate_on(Some(birthdate), today)?;
    }

    Ok(())
}
