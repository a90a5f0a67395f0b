//! Plain options: a value and its default, no validation.

use crate::classifier::OptionClassifier;
use crate::ui_item::{OptionUiItem, UiType};

/// An option holding any value of type `T` without validation.
///
/// # Example
///
/// ```ignore
/// let mut option = OptionValue::new(
///     OptionClassifier::new("General", "Report name", "a", "Name of the report"),
///     String::from("Balance Sheet"),
///     UiType::String,
/// );
/// option.set_value("Income Statement".to_string());
/// assert_eq!(option.value(), "Income Statement");
/// assert_eq!(option.default_value(), "Balance Sheet");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue<T> {
    classifier: OptionClassifier,
    ui: OptionUiItem,
    value: T,
    default_value: T,
}

impl<T: Clone> OptionValue<T> {
    /// Create an option whose default is its initial value.
    pub fn new(classifier: OptionClassifier, value: T, ui_type: UiType) -> Self {
        Self {
            classifier,
            ui: OptionUiItem::new(ui_type),
            default_value: value.clone(),
            value,
        }
    }

    /// Create an internal option, one that is never shown in a dialog.
    pub fn internal(classifier: OptionClassifier, value: T) -> Self {
        Self::new(classifier, value, UiType::Internal)
    }

    /// The current value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The value the option was created with.
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Replace the current value.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Restore the default value.
    pub fn reset_default_value(&mut self) {
        self.value = self.default_value.clone();
    }
}

impl<T: Clone + PartialEq> OptionValue<T> {
    /// Returns true when the value differs from the default.
    pub fn is_changed(&self) -> bool {
        self.value != self.default_value
    }
}

super::impl_option_base!(OptionValue<T>, T: Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OptionBase;

    fn classifier() -> OptionClassifier {
        OptionClassifier::new("General", "Flag", "a", "A flag")
    }

    #[test]
    fn test_set_then_get() {
        let mut option = OptionValue::internal(classifier(), 10i64);
        for value in [-5, 0, i64::MAX, i64::MIN] {
            option.set_value(value);
            assert_eq!(*option.value(), value);
        }
        assert_eq!(*option.default_value(), 10);
    }

    #[test]
    fn test_reset_and_changed() {
        let mut option = OptionValue::new(classifier(), true, UiType::Boolean);
        assert!(!option.is_changed());

        option.set_value(false);
        assert!(option.is_changed());

        option.reset_default_value();
        assert!(*option.value());
        assert!(!option.is_changed());
    }

    #[test]
    fn test_base_access() {
        let option = OptionValue::new(classifier(), "x".to_string(), UiType::String);
        assert_eq!(option.classifier().name(), "Flag");
        assert_eq!(option.ui().ui_type(), UiType::String);
        assert_eq!(OptionValue::internal(classifier(), 1).ui().ui_type(), UiType::Internal);
    }
}
