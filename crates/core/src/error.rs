//! Error model for the object model.
//!
//! Every failure here is synchronous, immediate and descriptive; nothing is
//! retried or recovered internally. Constructing an invalid value object must
//! fail loudly rather than produce a partially-valid instance.

use thiserror::Error;

/// Result type used across the object model.
pub type ModelResult<T> = Result<T, ModelError>;

/// Object-model error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Hydration was handed a null input.
    #[error("{type_name}: hydration input is not defined")]
    UndefinedInput { type_name: String },

    /// A property with no default was absent at construction.
    #[error("{type_name}.{property} must be defined")]
    RequiredProperty { type_name: String, property: String },

    /// A value fell outside the property's closed set of possible values.
    #[error("{type_name}.{property} can not have value '{value}' must be one of [{allowed}]")]
    UnsupportedValue {
        type_name: String,
        property: String,
        value: String,
        allowed: String,
    },

    /// A date-typed value did not coerce to a valid instant.
    #[error("{type_name}.{property} must be a Date")]
    InvalidDate { type_name: String, property: String },

    /// An array-typed value was not a sequence.
    #[error("{type_name}.{property} must be an Array")]
    NotAnArray { type_name: String, property: String },

    /// A nested-array property was hydrated from a non-sequence.
    #[error("expected {property} to be an array")]
    ExpectedArray { property: String },

    /// A user-supplied validator failed; re-raised with type/property context.
    #[error("{type_name}.{property} {message}")]
    Validation {
        type_name: String,
        property: String,
        message: String,
    },

    /// `get` referenced a name with neither a descriptor nor a custom getter.
    #[error("no getter was found for '{name}' on {type_name}")]
    NoGetter { type_name: String, name: String },

    /// `change` referenced a name with neither a descriptor nor a custom
    /// changer.
    #[error("no changer was found for '{name}' on {type_name}")]
    NoChanger { type_name: String, name: String },

    /// `change_many` was handed a key that is not a declared property.
    #[error("unknown property: {name}")]
    UnknownProperty { type_name: String, name: String },

    /// `deep_change` walked into a value that cannot change.
    #[error("can't find change() on {kind} at '{segment}'")]
    NotChangeable { kind: String, segment: String },
}

impl ModelError {
    pub fn undefined_input(type_name: &str) -> Self {
        Self::UndefinedInput { type_name: type_name.to_string() }
    }

    pub fn required(type_name: &str, property: &str) -> Self {
        Self::RequiredProperty {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    pub fn invalid_date(type_name: &str, property: &str) -> Self {
        Self::InvalidDate {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    pub fn not_an_array(type_name: &str, property: &str) -> Self {
        Self::NotAnArray {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    pub fn expected_array(property: &str) -> Self {
        Self::ExpectedArray { property: property.to_string() }
    }

    pub fn validation(type_name: &str, property: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            type_name: type_name.to_string(),
            property: property.to_string(),
            message: message.into(),
        }
    }

    pub fn no_getter(type_name: &str, name: &str) -> Self {
        Self::NoGetter { type_name: type_name.to_string(), name: name.to_string() }
    }

    pub fn no_changer(type_name: &str, name: &str) -> Self {
        Self::NoChanger { type_name: type_name.to_string(), name: name.to_string() }
    }

    pub fn unknown_property(type_name: &str, name: &str) -> Self {
        Self::UnknownProperty { type_name: type_name.to_string(), name: name.to_string() }
    }
}
