//! Numeric range options, used for spin boxes and plot sizes.

use std::fmt;

use crate::classifier::OptionClassifier;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::ui_item::{OptionUiItem, UiType};

/// Numeric types a [`RangeValue`] can hold.
pub trait RangeNumber: Copy + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static {}

impl RangeNumber for i32 {}
impl RangeNumber for i64 {}
impl RangeNumber for f32 {}
impl RangeNumber for f64 {}

/// An option constrained to `min <= value <= max`.
///
/// The step is advisory metadata for UI steppers; `set_value` does not snap
/// to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue<T> {
    classifier: OptionClassifier,
    ui: OptionUiItem,
    value: T,
    default_value: T,
    min: T,
    max: T,
    step: T,
}

impl<T: RangeNumber> RangeValue<T> {
    /// Create a range option with the `NumberRange` UI type.
    ///
    /// Bounds given in the wrong order are swapped. An initial value outside
    /// `[min, max]` is then replaced by `min`, for both the value and the
    /// default.
    pub fn new(classifier: OptionClassifier, value: T, min: T, max: T, step: T) -> Self {
        let (min, max) = if min > max {
            tracing::debug!(
                target: targets::VALUE,
                section = classifier.section(),
                name = classifier.name(),
                %min,
                %max,
                "range bounds inverted, swapped"
            );
            (max, min)
        } else {
            (min, max)
        };
        let initial = if value >= min && value <= max {
            value
        } else {
            tracing::debug!(
                target: targets::VALUE,
                section = classifier.section(),
                name = classifier.name(),
                %value,
                %min,
                "initial range value out of bounds, clamped to minimum"
            );
            min
        };
        Self {
            classifier,
            ui: OptionUiItem::new(UiType::NumberRange),
            value: initial,
            default_value: initial,
            min,
            max,
            step,
        }
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.value
    }

    /// The default value.
    pub fn default_value(&self) -> T {
        self.default_value
    }

    /// The lower bound.
    pub fn min(&self) -> T {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> T {
        self.max
    }

    /// The suggested increment for UI steppers.
    pub fn step(&self) -> T {
        self.step
    }

    /// Returns true when `value` lies within the bounds.
    pub fn validate(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Store `value` if it lies within the bounds.
    pub fn set_value(&mut self, value: T) -> Result<()> {
        if !self.validate(value) {
            tracing::debug!(
                target: targets::VALUE,
                section = self.classifier.section(),
                name = self.classifier.name(),
                %value,
                "range value rejected"
            );
            return Err(Error::out_of_range(value, self.min, self.max));
        }
        self.value = value;
        Ok(())
    }

    /// Restore the default value.
    pub fn reset_default_value(&mut self) {
        self.value = self.default_value;
    }

    /// Returns true when the value differs from the default.
    pub fn is_changed(&self) -> bool {
        self.value != self.default_value
    }
}

super::impl_option_base!(RangeValue<T>, T: RangeNumber);
