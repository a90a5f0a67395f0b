//! Option value kinds.
//!
//! Each kind owns its identity ([`OptionClassifier`]) and UI-binding state
//! ([`OptionUiItem`]) by composition, plus whatever value state and
//! validation the kind needs:
//!
//! | Kind | Type | Validation |
//! |------|------|------------|
//! | Plain | [`OptionValue<T>`] | none |
//! | Validated | [`ValidatedValue<T>`] | injected predicate |
//! | Range | [`RangeValue<T>`] | `min <= value <= max` |
//! | Multiple choice | [`MultichoiceValue`] | key must be offered |
//! | Date | [`DateValue`] | absolute or relative selection |

macro_rules! impl_option_base {
    ($ty:ty $(, $param:ident : $bound:path)?) => {
        impl$(<$param: $bound>)? $crate::value::OptionBase for $ty {
            fn classifier(&self) -> &$crate::classifier::OptionClassifier {
                &self.classifier
            }

            fn ui(&self) -> &$crate::ui_item::OptionUiItem {
                &self.ui
            }

            fn ui_mut(&mut self) -> &mut $crate::ui_item::OptionUiItem {
                &mut self.ui
            }
        }
    };
}

pub(crate) use impl_option_base;

mod date;
mod multichoice;
mod plain;
mod range;
mod validated;

pub use date::DateValue;
pub use multichoice::{MultichoiceEntry, MultichoiceValue};
pub use plain::OptionValue;
pub use range::{RangeNumber, RangeValue};
pub use validated::{ValidatedValue, Validator};

use crate::classifier::OptionClassifier;
use crate::ui_item::OptionUiItem;

/// Access to the identity and UI-binding parts every kind carries.
pub trait OptionBase {
    /// The option's identity.
    fn classifier(&self) -> &OptionClassifier;

    /// The option's UI-binding state.
    fn ui(&self) -> &OptionUiItem;

    /// Mutable access to the UI-binding state.
    fn ui_mut(&mut self) -> &mut OptionUiItem;
}
