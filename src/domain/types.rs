//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, bounded score) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail;

/// Maximum number of characters stored in [`LeadNotes`].
pub const NOTES_MAX_CHARS: usize = 1000;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Score outside of `0..=100`.
    #[error("score must be between 0 and 100")]
    ScoreOutOfRange,
    /// Lead value below zero or not a finite number.
    #[error("lead value must be a non-negative number")]
    InvalidLeadValue,
    /// Text exceeded the allowed number of characters.
    #[error("value cannot exceed {0} characters")]
    TooLong(usize),
    /// Status outside of the closed status set.
    #[error("unknown lead status: {0}")]
    UnknownStatus(String),
    /// Source outside of the closed source set.
    #[error("unknown lead source: {0}")]
    UnknownSource(String),
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(LeadId, "Unique identifier for a lead.");
id_newtype!(UserId, "Unique identifier for an authenticated caller.");

/// Lower-cased and validated email address of a lead.
///
/// Lower-casing on construction is what makes uniqueness case-insensitive.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct LeadEmail(String);

impl LeadEmail {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = value.into().trim().to_string();
                if trimmed.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                Ok(Self(trimmed))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

non_empty_string_newtype!(FirstName, "Given name of the lead contact.");
non_empty_string_newtype!(LastName, "Family name of the lead contact.");
non_empty_string_newtype!(CompanyName, "Company the lead belongs to.");
non_empty_string_newtype!(CityName, "City of the lead.");
non_empty_string_newtype!(StateName, "State or region of the lead.");

/// Checks `^\+?[1-9]\d{0,15}$`.
fn is_valid_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    let mut chars = digits.chars();
    match chars.next() {
        Some('1'..='9') => {}
        _ => return false,
    }
    digits.len() <= 16 && chars.all(|c| c.is_ascii_digit())
}

/// Contact phone: an optional leading `+` followed by up to 16 digits.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Trims and validates the phone number.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if is_valid_phone(&trimmed) {
            Ok(Self(trimmed))
        } else {
            Err(TypeConstraintError::InvalidPhone)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lead score in the inclusive range `0..=100`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LeadScore(i32);

impl LeadScore {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 100;

    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::ScoreOutOfRange)
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Monetary value attached to a lead; never negative.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, PartialOrd, Default)]
pub struct LeadValue(f64);

impl LeadValue {
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidLeadValue)
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Free-form notes kept as plain text, at most [`NOTES_MAX_CHARS`] characters.
///
/// The text is stored exactly as submitted (minus surrounding whitespace);
/// escaping is left to whoever renders it.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash, Default)]
pub struct LeadNotes(String);

impl LeadNotes {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.chars().count() > NOTES_MAX_CHARS {
            return Err(TypeConstraintError::TooLong(NOTES_MAX_CHARS));
        }
        Ok(Self(trimmed))
    }

    /// Wraps notes read back from storage, where the cap already held.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pipeline position of a lead.
///
/// Any status may follow any other; no transition graph is enforced.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Lost,
        LeadStatus::Won,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
            LeadStatus::Won => "won",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::UnknownStatus(s.to_string()))
    }
}

/// Acquisition channel of a lead.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 6] = [
        LeadSource::Website,
        LeadSource::FacebookAds,
        LeadSource::GoogleAds,
        LeadSource::Referral,
        LeadSource::Events,
        LeadSource::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::FacebookAds => "facebook_ads",
            LeadSource::GoogleAds => "google_ads",
            LeadSource::Referral => "referral",
            LeadSource::Events => "events",
            LeadSource::Other => "other",
        }
    }
}

impl Display for LeadSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadSource {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| TypeConstraintError::UnknownSource(s.to_string()))
    }
}
