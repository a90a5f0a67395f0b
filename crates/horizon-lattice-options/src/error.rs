//! Error types for the option system.

use std::path::PathBuf;

/// Result type alias for option operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, mutating or persisting options.
///
/// Every failure is reported synchronously and leaves the option that
/// produced it unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A UI item was attached to an option whose UI type is `Internal`.
    #[error("INTERNAL option, setting the UI item forbidden")]
    InternalUiItem,

    /// `make_internal` was called while a UI item is still bound.
    #[error("Option has a UI element, can't be INTERNAL")]
    UiItemBound,

    /// The option's validator rejected a value.
    #[error("Validation failed, value not set: {message}")]
    Validation { message: String },

    /// A range option was given a value outside its bounds.
    #[error("Value {value} is outside the range [{min}, {max}]")]
    OutOfRange {
        value: String,
        min: String,
        max: String,
    },

    /// A multiple-choice option was given a key it does not offer.
    #[error("'{key}' is not a valid choice")]
    InvalidChoice { key: String },

    /// An encoded relative date period ordinal did not name a period.
    #[error("{ordinal} does not name a relative date period")]
    InvalidPeriod { ordinal: i64 },

    /// A validated option was constructed with a value its validator rejects.
    #[error("Attempt to create validated option '{section}/{name}' with bad value")]
    InvalidInitialValue { section: String, name: String },

    /// A multiple-choice option was constructed without any choices.
    #[error("Multiple-choice option '{section}/{name}' needs at least one choice")]
    EmptyChoices { section: String, name: String },

    /// A typed access asked for a value type the held option does not have.
    #[error("Option type mismatch: expected {expected}, option holds {held}")]
    TypeMismatch {
        expected: &'static str,
        held: &'static str,
    },

    /// An option with the same section and name is already registered.
    #[error("Option '{section}/{name}' is already registered")]
    DuplicateOption { section: String, name: String },

    /// No option is registered under the given section and name.
    #[error("Option '{section}/{name}' not found")]
    OptionNotFound { section: String, name: String },

    /// A stored value could not be turned back into an option value.
    #[error("Stored value for '{section}/{name}' is unusable: {message}")]
    Store {
        section: String,
        name: String,
        message: String,
    },

    /// File I/O error while persisting a store.
    #[error("Failed to access option store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted store or configuration file could not be parsed or written.
    #[error("Failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an out-of-range error from the offending value and bounds.
    pub fn out_of_range(
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Create an invalid-choice error.
    pub fn invalid_choice(key: impl Into<String>) -> Self {
        Self::InvalidChoice { key: key.into() }
    }

    /// Create a store error.
    pub fn store(
        section: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Store {
            section: section.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for violations of the UI-binding policy.
    ///
    /// These are programming errors: the caller must fix the call order.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::InternalUiItem | Self::UiItemBound)
    }

    /// Returns true when a value was rejected and the caller may retry.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::OutOfRange { .. }
                | Self::InvalidChoice { .. }
                | Self::InvalidPeriod { .. }
        )
    }

    /// Returns true when an option could not be constructed at all.
    pub fn is_construction_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidInitialValue { .. } | Self::EmptyChoices { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        assert!(Error::InternalUiItem.is_policy_violation());
        assert!(Error::UiItemBound.is_policy_violation());
        assert!(!Error::InternalUiItem.is_validation_failure());

        assert!(Error::validation("nope").is_validation_failure());
        assert!(Error::out_of_range(12, 0, 10).is_validation_failure());
        assert!(Error::invalid_choice("x").is_validation_failure());
        assert!(Error::InvalidPeriod { ordinal: 99 }.is_validation_failure());

        let err = Error::EmptyChoices {
            section: "Display".into(),
            name: "Style".into(),
        };
        assert!(err.is_construction_failure());
        assert!(!err.is_validation_failure());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::out_of_range(12, 0, 10).to_string(),
            "Value 12 is outside the range [0, 10]"
        );
        assert_eq!(
            Error::invalid_choice("nonexistent").to_string(),
            "'nonexistent' is not a valid choice"
        );
        let err = Error::TypeMismatch {
            expected: "bool",
            held: "String",
        };
        assert_eq!(
            err.to_string(),
            "Option type mismatch: expected bool, option holds String"
        );
    }
}
