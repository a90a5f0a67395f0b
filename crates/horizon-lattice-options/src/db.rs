//! A registry of options keyed by section and name.
//!
//! Reports and dialogs collect their options in an [`OptionDb`], look them
//! up by `(section, name)`, lay them out section by section, and save or
//! restore all of them against one document store.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::option::{OptionHandle, OptionType};
use crate::store::OptionStore;

/// A collection of options, unique by section and name.
#[derive(Debug, Clone, Default)]
pub struct OptionDb {
    sections: BTreeMap<String, BTreeMap<String, OptionHandle>>,
}

impl OptionDb {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option.
    ///
    /// Fails with [`Error::DuplicateOption`] when an option with the same
    /// section and name is already registered; the registry is unchanged.
    pub fn register(&mut self, option: impl Into<OptionHandle>) -> Result<()> {
        let option = option.into();
        let options = self.sections.entry(option.section().to_string()).or_default();
        if options.contains_key(option.name()) {
            return Err(Error::DuplicateOption {
                section: option.section().to_string(),
                name: option.name().to_string(),
            });
        }
        tracing::debug!(
            target: targets::DB,
            section = option.section(),
            name = option.name(),
            kind = ?option.kind(),
            "option registered"
        );
        options.insert(option.name().to_string(), option);
        Ok(())
    }

    /// Remove and return an option.
    pub fn unregister(&mut self, section: &str, name: &str) -> Option<OptionHandle> {
        let options = self.sections.get_mut(section)?;
        let removed = options.remove(name);
        if options.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    /// Look up an option.
    pub fn find(&self, section: &str, name: &str) -> Option<&OptionHandle> {
        self.sections.get(section)?.get(name)
    }

    /// Look up an option for modification.
    pub fn find_mut(&mut self, section: &str, name: &str) -> Option<&mut OptionHandle> {
        self.sections.get_mut(section)?.get_mut(name)
    }

    /// The current value of an option.
    pub fn value<T: OptionType>(&self, section: &str, name: &str) -> Result<T> {
        self.find(section, name)
            .ok_or_else(|| not_found(section, name))?
            .value()
    }

    /// Set the value of an option, firing its changed callback on success.
    pub fn set_value<T: OptionType>(&mut self, section: &str, name: &str, value: T) -> Result<()> {
        self.find_mut(section, name)
            .ok_or_else(|| not_found(section, name))?
            .set_value(value)
    }

    /// Section names, sorted.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// The options of one section in layout order: by sort tag, then name.
    pub fn section_options(&self, section: &str) -> Vec<&OptionHandle> {
        let mut options: Vec<&OptionHandle> = self
            .sections
            .get(section)
            .map(|options| options.values().collect())
            .unwrap_or_default();
        options.sort_by(|a, b| a.key().cmp(b.key()).then_with(|| a.name().cmp(b.name())));
        options
    }

    /// Every option, by section then name.
    pub fn iter(&self) -> impl Iterator<Item = &OptionHandle> {
        self.sections.values().flat_map(BTreeMap::values)
    }

    /// Every option, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OptionHandle> {
        self.sections.values_mut().flat_map(BTreeMap::values_mut)
    }

    /// The number of registered options.
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Restore every option's default value.
    pub fn reset_defaults(&mut self) {
        for option in self.iter_mut() {
            option.reset_default_value();
        }
    }

    /// Save every option to `book`, stopping at the first failure.
    pub fn save_to_book(&self, book: &dyn OptionStore) -> Result<()> {
        for option in self.iter() {
            option.save_to_book(book)?;
        }
        tracing::debug!(target: targets::DB, count = self.len(), "options saved");
        Ok(())
    }

    /// Restore every option from `book`.
    ///
    /// An option that fails to restore keeps its value and is logged; the
    /// rest are still restored. Returns the number of failures.
    pub fn load_from_book(&mut self, book: &dyn OptionStore) -> usize {
        let mut failures = 0;
        for option in self.iter_mut() {
            if let Err(err) = option.read_from_book(book) {
                tracing::warn!(
                    target: targets::DB,
                    section = option.section(),
                    name = option.name(),
                    error = %err,
                    "option not restored"
                );
                failures += 1;
            }
        }
        tracing::debug!(target: targets::DB, failures, "options loaded");
        failures
    }
}

fn not_found(section: &str, name: &str) -> Error {
    Error::OptionNotFound {
        section: section.to_string(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::OptionClassifier;
    use crate::ui_item::UiType;
    use crate::value::{OptionValue, RangeValue};

    fn plain(section: &str, name: &str, tag: &str, value: i64) -> OptionHandle {
        OptionHandle::new(OptionValue::new(
            OptionClassifier::new(section, name, tag, ""),
            value,
            UiType::Internal,
        ))
    }

    fn sample() -> OptionDb {
        let mut db = OptionDb::new();
        db.register(plain("General", "Zeta", "a", 1)).unwrap();
        db.register(plain("General", "Alpha", "b", 2)).unwrap();
        db.register(plain("General", "Beta", "a", 3)).unwrap();
        db.register(plain("Display", "Width", "a", 4)).unwrap();
        db
    }

    #[test]
    fn test_register_and_find() {
        let db = sample();
        assert_eq!(db.len(), 4);
        assert!(!db.is_empty());
        assert_eq!(db.find("General", "Alpha").unwrap().value::<i64>().unwrap(), 2);
        assert!(db.find("General", "Missing").is_none());
        assert!(db.find("Missing", "Alpha").is_none());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut db = sample();
        let err = db.register(plain("General", "Alpha", "z", 99)).unwrap_err();
        assert!(matches!(err, Error::DuplicateOption { .. }));
        assert_eq!(db.value::<i64>("General", "Alpha").unwrap(), 2);
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn test_unregister() {
        let mut db = sample();
        let removed = db.unregister("Display", "Width").unwrap();
        assert_eq!(removed.name(), "Width");
        assert_eq!(db.sections(), vec!["General"]);
        assert!(db.unregister("Display", "Width").is_none());
    }

    #[test]
    fn test_sections_and_layout_order() {
        let db = sample();
        assert_eq!(db.sections(), vec!["Display", "General"]);

        let names: Vec<&str> = db
            .section_options("General")
            .into_iter()
            .map(OptionHandle::name)
            .collect();
        assert_eq!(names, vec!["Beta", "Zeta", "Alpha"]);
        assert!(db.section_options("Missing").is_empty());
    }

    #[test]
    fn test_value_access_by_path() {
        let mut db = sample();
        db.set_value("Display", "Width", 40i64).unwrap();
        assert_eq!(db.value::<i64>("Display", "Width").unwrap(), 40);

        let err = db.value::<i64>("Display", "Height").unwrap_err();
        assert!(matches!(err, Error::OptionNotFound { .. }));
        assert!(db.set_value("Display", "Height", 1i64).is_err());
        assert!(matches!(
            db.value::<bool>("Display", "Width"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_reset_defaults() {
        let mut db = sample();
        db.register(RangeValue::new(
            OptionClassifier::new("Display", "Tax Table", "b", "doc"),
            5,
            0,
            10,
            1,
        ))
        .unwrap();
        db.set_value("Display", "Tax Table", 8i32).unwrap();
        db.set_value("General", "Zeta", 100i64).unwrap();

        db.reset_defaults();
        assert_eq!(db.value::<i32>("Display", "Tax Table").unwrap(), 5);
        assert_eq!(db.value::<i64>("General", "Zeta").unwrap(), 1);
    }
}
