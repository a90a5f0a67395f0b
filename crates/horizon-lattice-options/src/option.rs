//! The uniform option handle.
//!
//! [`OptionVariant`] is the closed set of option kinds and value types the
//! system supports. [`OptionHandle`] wraps one variant and exposes a single
//! interface for typed get/set, identity, UI binding, persistence and change
//! notification, dispatching to whichever kind it holds.
//!
//! Typed access goes through the [`OptionType`] trait. Asking for a value
//! type the held kind does not have is an [`Error::TypeMismatch`]; nothing
//! is read or written.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_options::prelude::*;
//!
//! let mut option = OptionHandle::new(RangeValue::new(
//!     OptionClassifier::new("Display", "Tax Table", "a", "doc"),
//!     5, 0, 10, 1,
//! ));
//!
//! assert_eq!(option.value::<i32>()?, 5);
//! assert!(option.set_value(12).is_err());
//! option.set_value(7)?;
//!
//! // Wrong type: reported, not ignored.
//! assert!(option.value::<bool>().is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::classifier::OptionClassifier;
use crate::date::DateSelection;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::store::{self, OptionStore};
use crate::ui_item::{UiItemId, UiType};
use crate::value::{
    DateValue, MultichoiceValue, OptionBase, OptionValue, RangeValue, ValidatedValue,
};

/// Identifier of a book object an option can refer to (an account, a
/// budget, an owner).
pub type Guid = uuid::Uuid;

/// Callback invoked after an option's value changes.
pub type ChangedCallback = Arc<dyn Fn(&OptionClassifier) + Send + Sync>;

/// Every supported combination of option kind and value type.
#[derive(Debug, Clone)]
pub enum OptionVariant {
    String(OptionValue<String>),
    Bool(OptionValue<bool>),
    Int64(OptionValue<i64>),
    /// A reference to a single book object, possibly unset.
    Instance(OptionValue<Option<Guid>>),
    /// A list of book objects, such as the accounts a report covers.
    GuidList(OptionValue<Vec<Guid>>),
    Multichoice(MultichoiceValue),
    IntRange(RangeValue<i32>),
    DoubleRange(RangeValue<f64>),
    ValidatedInstance(ValidatedValue<Option<Guid>>),
    Date(DateValue),
}

/// The kind of option a variant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Plain,
    Validated,
    Range,
    Multichoice,
    Date,
}

macro_rules! dispatch {
    ($variant:expr, $option:ident => $body:expr) => {
        match $variant {
            OptionVariant::String($option) => $body,
            OptionVariant::Bool($option) => $body,
            OptionVariant::Int64($option) => $body,
            OptionVariant::Instance($option) => $body,
            OptionVariant::GuidList($option) => $body,
            OptionVariant::Multichoice($option) => $body,
            OptionVariant::IntRange($option) => $body,
            OptionVariant::DoubleRange($option) => $body,
            OptionVariant::ValidatedInstance($option) => $body,
            OptionVariant::Date($option) => $body,
        }
    };
}

impl OptionVariant {
    /// The identity of the held option.
    pub fn classifier(&self) -> &OptionClassifier {
        dispatch!(self, option => option.classifier())
    }

    /// The kind of the held option.
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::String(_)
            | Self::Bool(_)
            | Self::Int64(_)
            | Self::Instance(_)
            | Self::GuidList(_) => OptionKind::Plain,
            Self::Multichoice(_) => OptionKind::Multichoice,
            Self::IntRange(_) | Self::DoubleRange(_) => OptionKind::Range,
            Self::ValidatedInstance(_) => OptionKind::Validated,
            Self::Date(_) => OptionKind::Date,
        }
    }

    /// The name of the held option's natural value type.
    pub fn value_type_name(&self) -> &'static str {
        match self {
            Self::String(_) | Self::Multichoice(_) => "String",
            Self::Bool(_) => "bool",
            Self::Int64(_) | Self::Date(_) => "i64",
            Self::Instance(_) | Self::ValidatedInstance(_) => "Option<Guid>",
            Self::GuidList(_) => "Vec<Guid>",
            Self::IntRange(_) => "i32",
            Self::DoubleRange(_) => "f64",
        }
    }

    fn ui(&self) -> &crate::ui_item::OptionUiItem {
        dispatch!(self, option => option.ui())
    }

    fn ui_mut(&mut self) -> &mut crate::ui_item::OptionUiItem {
        dispatch!(self, option => option.ui_mut())
    }

    fn reset_default_value(&mut self) {
        dispatch!(self, option => option.reset_default_value())
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident => $kind:ty),* $(,)?) => {
        $(
            impl From<$kind> for OptionVariant {
                fn from(option: $kind) -> Self {
                    OptionVariant::$variant(option)
                }
            }

            impl From<$kind> for OptionHandle {
                fn from(option: $kind) -> Self {
                    OptionHandle::new(option)
                }
            }
        )*
    };
}

impl_from_kind! {
    String => OptionValue<String>,
    Bool => OptionValue<bool>,
    Int64 => OptionValue<i64>,
    Instance => OptionValue<Option<Guid>>,
    GuidList => OptionValue<Vec<Guid>>,
    Multichoice => MultichoiceValue,
    IntRange => RangeValue<i32>,
    DoubleRange => RangeValue<f64>,
    ValidatedInstance => ValidatedValue<Option<Guid>>,
    Date => DateValue,
}

/// A Rust type that can be read from and written to an [`OptionVariant`].
///
/// Each implementation lists the variants whose natural value type it is.
/// Every other variant answers with [`Error::TypeMismatch`].
pub trait OptionType: Sized {
    /// The type name used in mismatch errors.
    const TYPE_NAME: &'static str;

    /// Read the current value.
    fn get(variant: &OptionVariant) -> Result<Self>;

    /// Read the default value.
    fn get_default(variant: &OptionVariant) -> Result<Self>;

    /// Write the value, subject to the kind's validation.
    fn set(variant: &mut OptionVariant, value: Self) -> Result<()>;
}

fn mismatch<T: OptionType>(variant: &OptionVariant) -> Error {
    Error::TypeMismatch {
        expected: T::TYPE_NAME,
        held: variant.value_type_name(),
    }
}

impl OptionType for String {
    const TYPE_NAME: &'static str = "String";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::String(option) => Ok(option.value().clone()),
            OptionVariant::Multichoice(option) => Ok(option.value().to_string()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::String(option) => Ok(option.default_value().clone()),
            OptionVariant::Multichoice(option) => Ok(option.default_value().to_string()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::String(option) => {
                option.set_value(value);
                Ok(())
            }
            OptionVariant::Multichoice(option) => option.set_value(&value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl OptionType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Bool(option) => Ok(*option.value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Bool(option) => Ok(*option.default_value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::Bool(option) => {
                option.set_value(value);
                Ok(())
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

/// Plain integers, and the resolved timestamp of date options.
impl OptionType for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Int64(option) => Ok(*option.value()),
            OptionVariant::Date(option) => Ok(option.value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Int64(option) => Ok(*option.default_value()),
            OptionVariant::Date(option) => Ok(option.default_value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::Int64(option) => option.set_value(value),
            OptionVariant::Date(option) => option.set_value(value),
            other => return Err(mismatch::<Self>(other)),
        }
        Ok(())
    }
}

impl OptionType for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::IntRange(option) => Ok(option.value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::IntRange(option) => Ok(option.default_value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::IntRange(option) => option.set_value(value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl OptionType for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::DoubleRange(option) => Ok(option.value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::DoubleRange(option) => Ok(option.default_value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::DoubleRange(option) => option.set_value(value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl OptionType for Option<Guid> {
    const TYPE_NAME: &'static str = "Option<Guid>";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Instance(option) => Ok(*option.value()),
            OptionVariant::ValidatedInstance(option) => Ok(*option.value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Instance(option) => Ok(*option.default_value()),
            OptionVariant::ValidatedInstance(option) => Ok(*option.default_value()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::Instance(option) => {
                option.set_value(value);
                Ok(())
            }
            OptionVariant::ValidatedInstance(option) => option.set_value(value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl OptionType for Vec<Guid> {
    const TYPE_NAME: &'static str = "Vec<Guid>";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::GuidList(option) => Ok(option.value().clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::GuidList(option) => Ok(option.default_value().clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::GuidList(option) => {
                option.set_value(value);
                Ok(())
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

/// The unresolved selection of date options.
impl OptionType for DateSelection {
    const TYPE_NAME: &'static str = "DateSelection";

    fn get(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Date(option) => Ok(option.selection()),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn get_default(variant: &OptionVariant) -> Result<Self> {
        match variant {
            OptionVariant::Date(option) => Ok(DateSelection::Absolute(option.default_value())),
            other => Err(mismatch::<Self>(other)),
        }
    }

    fn set(variant: &mut OptionVariant, value: Self) -> Result<()> {
        match variant {
            OptionVariant::Date(option) => {
                option.set_selection(value);
                Ok(())
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

/// A typed, validated option of any kind.
///
/// The kind is fixed when the handle is created.
#[derive(Clone)]
pub struct OptionHandle {
    variant: OptionVariant,
    changed: Option<ChangedCallback>,
}

impl OptionHandle {
    /// Wrap an option of any kind.
    pub fn new(option: impl Into<OptionVariant>) -> Self {
        Self {
            variant: option.into(),
            changed: None,
        }
    }

    /// Create a plain option from its classifier and initial value.
    pub fn from_value<T>(classifier: OptionClassifier, value: T, ui_type: UiType) -> Self
    where
        T: Clone,
        OptionValue<T>: Into<OptionVariant>,
    {
        Self::new(OptionValue::new(classifier, value, ui_type))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// The current value as `T`.
    pub fn value<T: OptionType>(&self) -> Result<T> {
        T::get(&self.variant)
    }

    /// The default value as `T`.
    pub fn default_value<T: OptionType>(&self) -> Result<T> {
        T::get_default(&self.variant)
    }

    /// Set the value, applying the held kind's validation.
    ///
    /// The changed callback runs only when the value was stored.
    pub fn set_value<T: OptionType>(&mut self, value: T) -> Result<()> {
        if let Err(err) = T::set(&mut self.variant, value) {
            if let Error::TypeMismatch { expected, held } = &err {
                tracing::warn!(
                    target: targets::OPTIONS,
                    section = self.section(),
                    name = self.name(),
                    expected,
                    held,
                    "option set with the wrong value type"
                );
            }
            return Err(err);
        }
        self.notify_changed();
        Ok(())
    }

    /// Restore the default value and notify.
    pub fn reset_default_value(&mut self) {
        self.variant.reset_default_value();
        self.notify_changed();
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// The option's identity.
    pub fn classifier(&self) -> &OptionClassifier {
        self.variant.classifier()
    }

    pub fn section(&self) -> &str {
        self.classifier().section()
    }

    pub fn name(&self) -> &str {
        self.classifier().name()
    }

    /// The sort key within the section.
    pub fn key(&self) -> &str {
        self.classifier().sort_tag()
    }

    pub fn docstring(&self) -> &str {
        self.classifier().doc_string()
    }

    /// The kind of option held.
    pub fn kind(&self) -> OptionKind {
        self.variant.kind()
    }

    /// The name of the held option's natural value type.
    pub fn value_type_name(&self) -> &'static str {
        self.variant.value_type_name()
    }

    // ========================================================================
    // UI binding
    // ========================================================================

    pub fn ui_type(&self) -> UiType {
        self.variant.ui().ui_type()
    }

    pub fn ui_item(&self) -> Option<UiItemId> {
        self.variant.ui().ui_item()
    }

    /// Bind a UI control. Fails for internal options.
    pub fn set_ui_item(&mut self, ui_item: UiItemId) -> Result<()> {
        self.variant.ui_mut().set_ui_item(ui_item)
    }

    /// Forget the bound UI control.
    pub fn clear_ui_item(&mut self) {
        self.variant.ui_mut().clear_ui_item();
    }

    /// Make the option internal. Fails while a UI control is bound.
    pub fn make_internal(&mut self) -> Result<()> {
        self.variant.ui_mut().make_internal()
    }

    // ========================================================================
    // Change notification
    // ========================================================================

    /// Register the callback run after each successful change.
    ///
    /// Replaces any previously registered callback.
    pub fn set_changed_callback<F>(&mut self, callback: F)
    where
        F: Fn(&OptionClassifier) + Send + Sync + 'static,
    {
        self.changed = Some(Arc::new(callback));
    }

    /// Remove the changed callback.
    pub fn clear_changed_callback(&mut self) {
        self.changed = None;
    }

    fn notify_changed(&self) {
        if let Some(callback) = &self.changed {
            callback(self.classifier());
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the current value to `book`.
    pub fn save_to_book(&self, book: &dyn OptionStore) -> Result<()> {
        let value = store::encode(&self.variant);
        tracing::trace!(target: targets::STORE, section = self.section(), name = self.name(), ?value, "saving option");
        book.write(self.section(), self.name(), value)
    }

    /// Restore the value stored in `book`.
    ///
    /// An option with nothing stored keeps its value. Restoring does not run
    /// the changed callback.
    pub fn read_from_book(&mut self, book: &dyn OptionStore) -> Result<()> {
        match book.read(self.section(), self.name()) {
            Some(value) => store::restore(&mut self.variant, value),
            None => {
                tracing::trace!(target: targets::STORE, section = self.section(), name = self.name(), "nothing stored");
                Ok(())
            }
        }
    }

    // ========================================================================
    // Kind-specific access
    // ========================================================================

    /// The held option.
    pub fn variant(&self) -> &OptionVariant {
        &self.variant
    }

    /// Mutable access to the held option.
    ///
    /// Changes made through this reference bypass the changed callback.
    pub fn variant_mut(&mut self) -> &mut OptionVariant {
        &mut self.variant
    }

    /// The held multiple-choice option, for enumerating its entries.
    pub fn as_multichoice(&self) -> Option<&MultichoiceValue> {
        match &self.variant {
            OptionVariant::Multichoice(option) => Some(option),
            _ => None,
        }
    }

    /// The held range option's bounds and step, for building a spin box.
    pub fn range_bounds(&self) -> Option<(f64, f64, f64)> {
        match &self.variant {
            OptionVariant::IntRange(option) => Some((
                f64::from(option.min()),
                f64::from(option.max()),
                f64::from(option.step()),
            )),
            OptionVariant::DoubleRange(option) => Some((option.min(), option.max(), option.step())),
            _ => None,
        }
    }

    /// The held date option.
    pub fn as_date(&self) -> Option<&DateValue> {
        match &self.variant {
            OptionVariant::Date(option) => Some(option),
            _ => None,
        }
    }

    /// The held date option, for modification.
    ///
    /// Changes made through this reference bypass the changed callback.
    pub fn as_date_mut(&mut self) -> Option<&mut DateValue> {
        match &mut self.variant {
            OptionVariant::Date(option) => Some(option),
            _ => None,
        }
    }
}

impl fmt::Debug for OptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionHandle")
            .field("variant", &self.variant)
            .field("has_changed_callback", &self.changed.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{CalendarTimeService, RelativeDatePeriod};
    use crate::value::MultichoiceEntry;
    use slotmap::SlotMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn classifier(name: &str) -> OptionClassifier {
        OptionClassifier::new("Display", name, "a", "doc")
    }

    fn tax_table() -> OptionHandle {
        OptionHandle::new(RangeValue::new(classifier("Tax Table"), 5, 0, 10, 1))
    }

    fn style() -> OptionHandle {
        let choices: Vec<MultichoiceEntry> = vec![
            ("plain", "Plain", "").into(),
            ("fancy", "Fancy", "").into(),
        ];
        OptionHandle::new(
            MultichoiceValue::new(classifier("Style"), choices, UiType::Multichoice).unwrap(),
        )
    }

    #[test]
    fn test_range_scenario() {
        let mut option = tax_table();
        assert_eq!(option.value::<i32>().unwrap(), 5);
        assert!(option.set_value(12i32).is_err());
        assert_eq!(option.value::<i32>().unwrap(), 5);
        option.set_value(7i32).unwrap();
        assert_eq!(option.value::<i32>().unwrap(), 7);
        assert_eq!(option.default_value::<i32>().unwrap(), 5);
        assert_eq!(option.kind(), OptionKind::Range);
        assert_eq!(option.range_bounds(), Some((0.0, 10.0, 1.0)));
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut option = tax_table();

        let err = option.value::<bool>().unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { expected: "bool", held: "i32" }
        ));

        // i64 is not i32: range options only take their own type.
        assert!(option.set_value(7i64).is_err());
        assert_eq!(option.value::<i32>().unwrap(), 5);
    }

    #[test]
    fn test_plain_string() {
        let mut option = OptionHandle::from_value(
            classifier("Title"),
            "Balance Sheet".to_string(),
            UiType::String,
        );
        option.set_value("Cash Flow".to_string()).unwrap();
        assert_eq!(option.value::<String>().unwrap(), "Cash Flow");
        assert_eq!(option.default_value::<String>().unwrap(), "Balance Sheet");
        assert_eq!(option.kind(), OptionKind::Plain);
    }

    #[test]
    fn test_multichoice_through_handle() {
        let mut option = style();
        option.set_value("fancy".to_string()).unwrap();
        assert_eq!(option.value::<String>().unwrap(), "fancy");

        let err = option.set_value("nonexistent".to_string()).unwrap_err();
        assert!(err.is_validation_failure());
        assert_eq!(option.value::<String>().unwrap(), "fancy");

        let choices = option.as_multichoice().unwrap();
        assert_eq!(choices.permissible_value_index("fancy"), Some(1));
    }

    #[test]
    fn test_validated_instance() {
        let account = Guid::new_v4();
        let validated = ValidatedValue::new(
            classifier("Account"),
            Some(account),
            |value: &Option<Guid>| value.is_some(),
            UiType::AccountSelector,
        )
        .unwrap();
        let mut option = OptionHandle::new(validated);

        assert_eq!(option.value::<Option<Guid>>().unwrap(), Some(account));
        assert!(option.set_value(None::<Guid>).is_err());
        assert_eq!(option.value::<Option<Guid>>().unwrap(), Some(account));
        assert_eq!(option.kind(), OptionKind::Validated);
    }

    #[test]
    fn test_date_through_handle() {
        let service = Arc::new(CalendarTimeService::utc().with_fixed_now(1_715_949_000));
        let mut option = OptionHandle::new(DateValue::with_time_service(classifier("Date"), service));

        option.set_value(1_000i64).unwrap();
        assert_eq!(option.value::<i64>().unwrap(), 1_000);

        option
            .set_value(DateSelection::Starting(RelativeDatePeriod::ThisMonth))
            .unwrap();
        assert_eq!(option.value::<i64>().unwrap(), 1_714_521_600);
        assert_eq!(
            option.value::<DateSelection>().unwrap(),
            DateSelection::Starting(RelativeDatePeriod::ThisMonth)
        );
        assert_eq!(option.default_value::<i64>().unwrap(), 1_715_949_000);
        assert!(option.as_date().is_some());

        option
            .as_date_mut()
            .unwrap()
            .set_selection(DateSelection::Ending(RelativeDatePeriod::Today));
        // 2024-05-17 23:59:59 UTC
        assert_eq!(option.value::<i64>().unwrap(), 1_715_990_399);
        assert!(tax_table().as_date_mut().is_none());
    }

    #[test]
    fn test_identity_forwarding() {
        let option = OptionHandle::new(RangeValue::new(
            OptionClassifier::new("Display", "Tax Table", "a", "doc"),
            5,
            0,
            10,
            1,
        ));
        assert_eq!(option.section(), "Display");
        assert_eq!(option.name(), "Tax Table");
        assert_eq!(option.key(), "a");
        assert_eq!(option.docstring(), "doc");
    }

    #[test]
    fn test_ui_binding_forwarding() {
        let mut controls: SlotMap<UiItemId, ()> = SlotMap::with_key();
        let control = controls.insert(());

        let mut internal = OptionHandle::from_value(classifier("Hidden"), 1i64, UiType::Internal);
        assert!(internal.set_ui_item(control).unwrap_err().is_policy_violation());
        assert!(internal.ui_item().is_none());

        let mut option = tax_table();
        option.set_ui_item(control).unwrap();
        assert_eq!(option.ui_item(), Some(control));
        assert!(option.make_internal().is_err());

        option.clear_ui_item();
        option.clear_ui_item();
        option.make_internal().unwrap();
        assert_eq!(option.ui_type(), UiType::Internal);
    }

    #[test]
    fn test_changed_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut option = tax_table();

        let first = count.clone();
        option.set_changed_callback(move |classifier| {
            assert_eq!(classifier.name(), "Tax Table");
            first.fetch_add(1, Ordering::SeqCst);
        });

        option.set_value(3i32).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Failed sets do not notify.
        assert!(option.set_value(30i32).is_err());
        assert!(option.set_value(true).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // A replacement discards the previous callback.
        let second = Arc::new(AtomicUsize::new(0));
        let second_clone = second.clone();
        option.set_changed_callback(move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });
        option.reset_default_value();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(option.value::<i32>().unwrap(), 5);

        option.clear_changed_callback();
        option.set_value(4i32).unwrap();
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
