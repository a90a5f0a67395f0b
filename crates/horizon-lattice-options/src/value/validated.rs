//! Validated options: values guarded by an injected predicate.

use std::fmt;
use std::sync::Arc;

use crate::classifier::OptionClassifier;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::ui_item::{OptionUiItem, UiType};

/// A shareable validation predicate.
pub type Validator<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// An option whose value must always satisfy a validator.
///
/// The validator runs once at construction and on every `set_value`; a
/// rejected value is never stored.
///
/// # Example
///
/// ```ignore
/// let option = ValidatedValue::new(
///     OptionClassifier::new("Accounts", "Income", "a", "Income account"),
///     Some(account_guid),
///     |value: &Option<Guid>| value.is_some(),
///     UiType::AccountSelector,
/// )?;
/// ```
pub struct ValidatedValue<T> {
    classifier: OptionClassifier,
    ui: OptionUiItem,
    value: T,
    default_value: T,
    validator: Validator<T>,
    validation_data: Option<T>,
}

impl<T: Clone> ValidatedValue<T> {
    /// Create a validated option.
    ///
    /// Fails with [`Error::InvalidInitialValue`] when `validator` rejects
    /// `value`.
    pub fn new<F>(
        classifier: OptionClassifier,
        value: T,
        validator: F,
        ui_type: UiType,
    ) -> Result<Self>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::build(classifier, value, Arc::new(validator), None, ui_type)
    }

    /// Create an internal validated option carrying extra validation data.
    ///
    /// The data is opaque to the option; UI layers use it as context when
    /// presenting choices (for example the account types an account selector
    /// should offer).
    pub fn with_validation_data<F>(
        classifier: OptionClassifier,
        value: T,
        validator: F,
        validation_data: T,
    ) -> Result<Self>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::build(
            classifier,
            value,
            Arc::new(validator),
            Some(validation_data),
            UiType::Internal,
        )
    }

    fn build(
        classifier: OptionClassifier,
        value: T,
        validator: Validator<T>,
        validation_data: Option<T>,
        ui_type: UiType,
    ) -> Result<Self> {
        if !validator(&value) {
            return Err(Error::InvalidInitialValue {
                section: classifier.section().to_string(),
                name: classifier.name().to_string(),
            });
        }
        Ok(Self {
            classifier,
            ui: OptionUiItem::new(ui_type),
            default_value: value.clone(),
            value,
            validator,
            validation_data,
        })
    }

    /// The current value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The value the option was created with.
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// The extra validation data, if any.
    pub fn validation_data(&self) -> Option<&T> {
        self.validation_data.as_ref()
    }

    /// Check a value against the validator without storing it.
    pub fn validate(&self, value: &T) -> bool {
        (self.validator)(value)
    }

    /// Store `value` if the validator accepts it.
    pub fn set_value(&mut self, value: T) -> Result<()> {
        if !self.validate(&value) {
            tracing::debug!(
                target: targets::VALUE,
                section = self.classifier.section(),
                name = self.classifier.name(),
                "validator rejected value"
            );
            return Err(Error::validation(format!(
                "'{}/{}' rejected the value",
                self.classifier.section(),
                self.classifier.name()
            )));
        }
        self.value = value;
        Ok(())
    }

    /// Restore the default value, which passed validation at construction.
    pub fn reset_default_value(&mut self) {
        self.value = self.default_value.clone();
    }
}

impl<T: Clone + PartialEq> ValidatedValue<T> {
    /// Returns true when the value differs from the default.
    pub fn is_changed(&self) -> bool {
        self.value != self.default_value
    }
}

impl<T: Clone> Clone for ValidatedValue<T> {
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            ui: self.ui.clone(),
            value: self.value.clone(),
            default_value: self.default_value.clone(),
            validator: Arc::clone(&self.validator),
            validation_data: self.validation_data.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValidatedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedValue")
            .field("classifier", &self.classifier)
            .field("ui", &self.ui)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("validation_data", &self.validation_data)
            .finish_non_exhaustive()
    }
}

super::impl_option_base!(ValidatedValue<T>, T: Clone);

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> OptionClassifier {
        OptionClassifier::new("Report", "Columns", "b", "Number of columns")
    }

    fn even(value: &i64) -> bool {
        value % 2 == 0
    }

    #[test]
    fn test_construction_rejects_invalid_value() {
        let result = ValidatedValue::new(classifier(), 3i64, even, UiType::Internal);
        let err = result.unwrap_err();
        assert!(err.is_construction_failure());
        assert!(err.to_string().contains("Report/Columns"));
    }

    #[test]
    fn test_set_value_keeps_prior_on_failure() {
        let mut option = ValidatedValue::new(classifier(), 2i64, even, UiType::Internal).unwrap();

        option.set_value(8).unwrap();
        assert_eq!(*option.value(), 8);

        let err = option.set_value(7).unwrap_err();
        assert!(err.is_validation_failure());
        assert_eq!(*option.value(), 8);
        assert_eq!(*option.default_value(), 2);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let option = ValidatedValue::new(classifier(), 4i64, even, UiType::Internal).unwrap();
        assert!(option.validate(&10));
        assert!(!option.validate(&11));
        assert_eq!(*option.value(), 4);
    }

    #[test]
    fn test_validation_data() {
        let option =
            ValidatedValue::with_validation_data(classifier(), 4i64, even, 100).unwrap();
        assert_eq!(option.validation_data(), Some(&100));
        assert_eq!(option.ui.ui_type(), UiType::Internal);

        let plain = ValidatedValue::new(classifier(), 4i64, even, UiType::Internal).unwrap();
        assert_eq!(plain.validation_data(), None);
    }

    #[test]
    fn test_clone_shares_validator() {
        let mut option = ValidatedValue::new(classifier(), 2i64, even, UiType::Internal).unwrap();
        let mut copy = option.clone();
        assert!(copy.set_value(3).is_err());
        copy.set_value(6).unwrap();
        option.reset_default_value();
        assert_eq!(*option.value(), 2);
        assert!(copy.is_changed());
    }
}
