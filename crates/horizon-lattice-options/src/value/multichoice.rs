//! Multiple-choice options.
//!
//! A multiple-choice option offers an ordered list of entries. Each entry
//! has a key (its identity and persisted form), a display name and a short
//! description for the tooltip. The selection is kept as an index, but the
//! option's value is always the selected entry's key.

use crate::classifier::OptionClassifier;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::ui_item::{OptionUiItem, UiType};

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultichoiceEntry {
    key: String,
    name: String,
    description: String,
}

impl MultichoiceEntry {
    /// Create an entry.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// The key, unique within the option.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<K, N, D> From<(K, N, D)> for MultichoiceEntry
where
    K: Into<String>,
    N: Into<String>,
    D: Into<String>,
{
    fn from((key, name, description): (K, N, D)) -> Self {
        Self::new(key, name, description)
    }
}

/// An option whose value is one key out of a fixed list.
///
/// # Example
///
/// ```ignore
/// let mut option = MultichoiceValue::new(
///     OptionClassifier::new("Display", "Style", "a", "Report style"),
///     vec![
///         ("plain", "Plain", "No decoration").into(),
///         ("fancy", "Fancy", "Borders and shading").into(),
///     ],
///     UiType::Multichoice,
/// )?;
/// option.set_value("fancy")?;
/// assert_eq!(option.value(), "fancy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultichoiceValue {
    classifier: OptionClassifier,
    ui: OptionUiItem,
    value: usize,
    default_value: usize,
    choices: Vec<MultichoiceEntry>,
}

impl MultichoiceValue {
    /// Create an option selecting the first entry.
    ///
    /// Fails with [`Error::EmptyChoices`] when `choices` is empty.
    pub fn new(
        classifier: OptionClassifier,
        choices: Vec<MultichoiceEntry>,
        ui_type: UiType,
    ) -> Result<Self> {
        if choices.is_empty() {
            return Err(Error::EmptyChoices {
                section: classifier.section().to_string(),
                name: classifier.name().to_string(),
            });
        }
        Ok(Self {
            classifier,
            ui: OptionUiItem::new(ui_type),
            value: 0,
            default_value: 0,
            choices,
        })
    }

    /// Make the entry with `key` both the selection and the default.
    pub fn with_default(mut self, key: &str) -> Result<Self> {
        let index = self
            .find_key(key)
            .ok_or_else(|| Error::invalid_choice(key))?;
        self.value = index;
        self.default_value = index;
        Ok(self)
    }

    /// The key of the selected entry.
    pub fn value(&self) -> &str {
        self.choices[self.value].key()
    }

    /// The key of the default entry.
    pub fn default_value(&self) -> &str {
        self.choices[self.default_value].key()
    }

    /// The index of the selected entry.
    pub fn selected_index(&self) -> usize {
        self.value
    }

    /// Returns true when `key` names an entry.
    pub fn validate(&self, key: &str) -> bool {
        self.find_key(key).is_some()
    }

    /// Select the entry with `key`.
    ///
    /// The first matching entry wins. Fails with [`Error::InvalidChoice`]
    /// and keeps the selection when no entry matches.
    pub fn set_value(&mut self, key: &str) -> Result<()> {
        match self.find_key(key) {
            Some(index) => {
                self.value = index;
                Ok(())
            }
            None => {
                tracing::debug!(
                    target: targets::VALUE,
                    section = self.classifier.section(),
                    name = self.classifier.name(),
                    key,
                    "not a valid choice"
                );
                Err(Error::invalid_choice(key))
            }
        }
    }

    /// Restore the default selection.
    pub fn reset_default_value(&mut self) {
        self.value = self.default_value;
    }

    /// Returns true when the selection differs from the default.
    pub fn is_changed(&self) -> bool {
        self.value != self.default_value
    }

    /// The number of entries.
    pub fn num_permissible_values(&self) -> usize {
        self.choices.len()
    }

    /// The index of the entry with `key`.
    pub fn permissible_value_index(&self, key: &str) -> Option<usize> {
        self.find_key(key)
    }

    /// The key of the entry at `index`.
    pub fn permissible_value(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(MultichoiceEntry::key)
    }

    /// The display name of the entry at `index`.
    pub fn permissible_value_name(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(MultichoiceEntry::name)
    }

    /// The description of the entry at `index`.
    pub fn permissible_value_description(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(MultichoiceEntry::description)
    }

    /// All entries, in order.
    pub fn choices(&self) -> &[MultichoiceEntry] {
        &self.choices
    }

    fn find_key(&self, key: &str) -> Option<usize> {
        self.choices.iter().position(|choice| choice.key() == key)
    }
}

super::impl_option_base!(MultichoiceValue);
