//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! trimmed non-empty names, normalized email) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

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
    /// Provided color is not a `#rgb` / `#rrggbb` literal.
    #[error("invalid color")]
    InvalidColor,
    /// Provided time of day is not `HH:MM`.
    #[error("invalid time of day")]
    InvalidClockTime,
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "i32", into = "i32")]
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

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(CustomerId, "Unique identifier for a customer.");
id_newtype!(UserId, "Unique identifier for a user (sales staff).");
id_newtype!(TodoId, "Unique identifier for a todo.");
id_newtype!(ActivityId, "Unique identifier for a follow-up activity.");
id_newtype!(ReminderId, "Unique identifier for a reminder.");
id_newtype!(ReminderTemplateId, "Unique identifier for a reminder template.");
id_newtype!(TagId, "Unique identifier for a tag.");
id_newtype!(TagDimensionId, "Unique identifier for a tag dimension.");

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(CustomerName, "Customer (shop) name enforcing non-empty values.");
non_empty_string_newtype!(UserName, "User display name enforcing non-empty values.");
non_empty_string_newtype!(TodoTitle, "Todo title enforcing trimmed, non-empty values.");
non_empty_string_newtype!(ReminderTitle, "Reminder title enforcing trimmed, non-empty values.");
non_empty_string_newtype!(TemplateName, "Reminder template name enforcing non-empty values.");
non_empty_string_newtype!(TagName, "Tag label enforcing trimmed, non-empty values.");
non_empty_string_newtype!(DimensionName, "Tag dimension name enforcing non-empty values.");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct UserEmail(String);

impl UserEmail {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = email.into().trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(TypeConstraintError::InvalidEmail)
        }
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserEmail {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserEmail> for String {
    fn from(value: UserEmail) -> Self {
        value.0
    }
}

/// Free-form user text, stored exactly as typed apart from surrounding
/// whitespace. Escaping is left to whoever renders it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub struct CleanText(String);

impl CleanText {
    /// Trims surrounding whitespace. Empty input is allowed.
    pub fn new<S: AsRef<str>>(value: S) -> Self {
        Self(value.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CleanText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<CleanText> for String {
    fn from(value: CleanText) -> Self {
        value.0
    }
}

impl Display for CleanText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default color assigned to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#2196F3";

/// CSS hex color literal such as `#2196F3`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TagColor(String);

impl TagColor {
    /// Accepts `#rgb` or `#rrggbb`; blank input falls back to [`DEFAULT_TAG_COLOR`].
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Ok(Self::default());
        }
        let digits = value
            .strip_prefix('#')
            .ok_or(TypeConstraintError::InvalidColor)?;
        if (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidColor)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TagColor {
    fn default() -> Self {
        Self(DEFAULT_TAG_COLOR.to_string())
    }
}

impl TryFrom<String> for TagColor {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagColor> for String {
    fn from(value: TagColor) -> Self {
        value.0
    }
}

/// Wall-clock time of day in `HH:MM` form, used for quiet hours.
///
/// Ordering is lexicographic on the zero-padded representation, which matches
/// chronological order within a day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(String);

impl ClockTime {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into();
        let trimmed = value.trim();
        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or(TypeConstraintError::InvalidClockTime)?;
        let valid = hours.len() == 2
            && minutes.len() == 2
            && hours.parse::<u8>().is_ok_and(|h| h < 24)
            && minutes.parse::<u8>().is_ok_and(|m| m < 60);
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(TypeConstraintError::InvalidClockTime)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.0
    }
}

/// Declares an enum persisted as its lower-case wire name in a text column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name stored in the database and used on the wire.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::types::TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::domain::types::TypeConstraintError::InvalidValue(
                        format!("{}: {other}", stringify!($name)),
                    )),
                }
            }
        }
    };
}

pub(crate) use text_enum;

/// Parses a stored enum column, reporting the offending value.
pub fn parse_column<T>(value: &str) -> Result<T, TypeConstraintError>
where
    T: FromStr<Err = TypeConstraintError>,
{
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert!(CustomerId::new(1).is_ok());
        assert_eq!(CustomerId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(TodoId::new(-4), Err(TypeConstraintError::NonPositiveId));
    }

    #[test]
    fn names_are_trimmed_and_non_empty() {
        let name = CustomerName::new("  小张茶行 ").expect("valid name");
        assert_eq!(name.as_str(), "小张茶行");
        assert_eq!(TagName::new("   "), Err(TypeConstraintError::EmptyString));
    }

    #[test]
    fn email_is_normalized() {
        let email = UserEmail::new(" Sales@Example.COM ").expect("valid email");
        assert_eq!(email.as_str(), "sales@example.com");
        assert!(UserEmail::new("not-an-email").is_err());
    }

    #[test]
    fn clean_text_keeps_symbols_verbatim() {
        assert_eq!(CleanText::new("  A & B <5% ").as_str(), "A & B <5%");
        assert_eq!(CleanText::new("<b>x</b>").as_str(), "<b>x</b>");

        let text: CleanText = serde_json::from_str(r#""A & B <5%""#).unwrap();
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""A & B <5%""#);
    }

    #[test]
    fn tag_color_defaults_and_validates() {
        assert_eq!(TagColor::new("").unwrap().as_str(), DEFAULT_TAG_COLOR);
        assert_eq!(TagColor::new("#abc").unwrap().as_str(), "#abc");
        assert_eq!(TagColor::new("red"), Err(TypeConstraintError::InvalidColor));
        assert_eq!(TagColor::new("#12345"), Err(TypeConstraintError::InvalidColor));
    }

    #[test]
    fn clock_time_requires_hh_mm() {
        assert!(ClockTime::new("22:00").is_ok());
        assert!(ClockTime::new("08:30").is_ok());
        assert!(ClockTime::new("8:30").is_err());
        assert!(ClockTime::new("24:00").is_err());
        assert!(ClockTime::new("12:60").is_err());
        assert!(ClockTime::new("22:00").unwrap() > ClockTime::new("08:00").unwrap());
    }

    #[test]
    fn id_deserialization_rejects_zero() {
        assert!(serde_json::from_str::<UserId>("0").is_err());
        assert_eq!(serde_json::from_str::<UserId>("7").unwrap().get(), 7);
    }
}
