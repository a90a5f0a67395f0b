//! The document store options persist into.
//!
//! An [`OptionStore`] holds one [`StoredValue`] per `(section, name)` pair.
//! Options write their current value with `save_to_book` and restore it
//! with `read_from_book`; the store itself knows nothing about option kinds.
//!
//! [`SettingsStore`] is the in-memory implementation. It can be persisted to
//! JSON or TOML:
//!
//! ```ignore
//! use horizon_lattice_options::{OptionStore, SettingsStore};
//!
//! let store = SettingsStore::new();
//! option.save_to_book(&store)?;
//! store.save_json("report-options.json")?;
//!
//! let store = SettingsStore::load_json("report-options.json")?;
//! option.read_from_book(&store)?;
//! ```
//!
//! # Encoding
//!
//! | Option | Stored as |
//! |--------|-----------|
//! | string, multiple choice | `String` |
//! | boolean | `Bool` |
//! | integer, integer range | `Integer` |
//! | float range | `Float` |
//! | instance | `String` (hyphenated GUID) or `Null` |
//! | GUID list | `Array` of `String` |
//! | date | `Array` of mode and `Integer` time or `String` period |

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::date::{DateSelection, DateType, RelativeDatePeriod};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::option::{Guid, OptionVariant};

/// A value as held by a document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// No value, used for unset instance references.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<StoredValue>),
}

impl StoredValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }

    /// Returns this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoredValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoredValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a float.
    /// Also converts integers to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            StoredValue::Float(v) => Some(*v),
            StoredValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns this value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoredValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[StoredValue]> {
        match self {
            StoredValue::Array(v) => Some(v),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            StoredValue::Null => "null",
            StoredValue::Bool(_) => "a boolean",
            StoredValue::Integer(_) => "an integer",
            StoredValue::Float(_) => "a float",
            StoredValue::String(_) => "a string",
            StoredValue::Array(_) => "an array",
        }
    }
}

impl Default for StoredValue {
    fn default() -> Self {
        StoredValue::Null
    }
}

impl From<bool> for StoredValue {
    fn from(v: bool) -> Self {
        StoredValue::Bool(v)
    }
}

impl From<i64> for StoredValue {
    fn from(v: i64) -> Self {
        StoredValue::Integer(v)
    }
}

impl From<f64> for StoredValue {
    fn from(v: f64) -> Self {
        StoredValue::Float(v)
    }
}

impl From<String> for StoredValue {
    fn from(v: String) -> Self {
        StoredValue::String(v)
    }
}

impl From<&str> for StoredValue {
    fn from(v: &str) -> Self {
        StoredValue::String(v.to_string())
    }
}

/// A document store options can be saved into and restored from.
pub trait OptionStore {
    /// The value stored for `section`/`name`, if any.
    fn read(&self, section: &str, name: &str) -> Option<StoredValue>;

    /// Store `value` for `section`/`name`, replacing any previous value.
    fn write(&self, section: &str, name: &str, value: StoredValue) -> Result<()>;
}

type Sections = BTreeMap<String, BTreeMap<String, StoredValue>>;

/// An in-memory [`OptionStore`] with JSON and TOML persistence.
#[derive(Debug, Default)]
pub struct SettingsStore {
    data: RwLock<Sections>,
}

impl SettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_data(data: Sections) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns true if a value is stored for `section`/`name`.
    pub fn contains(&self, section: &str, name: &str) -> bool {
        self.data
            .read()
            .get(section)
            .is_some_and(|options| options.contains_key(name))
    }

    /// Removes and returns the value stored for `section`/`name`.
    ///
    /// A section left empty is removed as well.
    pub fn remove(&self, section: &str, name: &str) -> Option<StoredValue> {
        let mut data = self.data.write();
        let options = data.get_mut(section)?;
        let removed = options.remove(name);
        if options.is_empty() {
            data.remove(section);
        }
        removed
    }

    /// The names of all sections holding values, sorted.
    pub fn sections(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// The number of stored values across all sections.
    pub fn len(&self) -> usize {
        self.data.read().values().map(BTreeMap::len).sum()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Removes every stored value.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Loads a store from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let data: Sections =
            serde_json::from_str(&content).map_err(|e| Error::parse(path, e.to_string()))?;
        tracing::debug!(target: targets::STORE, path = %path.display(), "loaded JSON option store");
        Ok(Self::from_data(data))
    }

    /// Loads a store from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| Error::parse(path, e.to_string()))?;

        let mut data = Sections::new();
        for (section, options) in table {
            let toml::Value::Table(options) = options else {
                return Err(Error::parse(
                    path,
                    format!("section '{section}' is not a table"),
                ));
            };
            let options = options
                .into_iter()
                .map(|(name, value)| Ok((name, Self::toml_to_stored(path, value)?)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            data.insert(section, options);
        }
        tracing::debug!(target: targets::STORE, path = %path.display(), "loaded TOML option store");
        Ok(Self::from_data(data))
    }

    /// Saves the store to a JSON file.
    ///
    /// The file is written atomically using a temporary file and rename.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&*self.data.read())
            .map_err(|e| Error::parse(path, e.to_string()))?;
        atomic_write(path, json.as_bytes())
    }

    /// Saves the store to a TOML file.
    ///
    /// TOML has no null, so unset values are written as empty strings.
    /// The file is written atomically using a temporary file and rename.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let table: toml::Table = self
            .data
            .read()
            .iter()
            .map(|(section, options)| {
                let options = options
                    .iter()
                    .map(|(name, value)| (name.clone(), Self::stored_to_toml(value)))
                    .collect();
                (section.clone(), toml::Value::Table(options))
            })
            .collect();
        let toml_str =
            toml::to_string_pretty(&table).map_err(|e| Error::parse(path, e.to_string()))?;
        atomic_write(path, toml_str.as_bytes())
    }

    /// Converts a toml::Value to StoredValue.
    fn toml_to_stored(path: &Path, toml: toml::Value) -> Result<StoredValue> {
        Ok(match toml {
            toml::Value::String(s) if s.is_empty() => StoredValue::Null,
            toml::Value::String(s) => StoredValue::String(s),
            toml::Value::Integer(i) => StoredValue::Integer(i),
            toml::Value::Float(f) => StoredValue::Float(f),
            toml::Value::Boolean(b) => StoredValue::Bool(b),
            toml::Value::Datetime(dt) => StoredValue::String(dt.to_string()),
            toml::Value::Array(arr) => StoredValue::Array(
                arr.into_iter()
                    .map(|value| Self::toml_to_stored(path, value))
                    .collect::<Result<_>>()?,
            ),
            toml::Value::Table(_) => {
                return Err(Error::parse(path, "nested tables are not option values"));
            }
        })
    }

    /// Converts a StoredValue to toml::Value.
    fn stored_to_toml(value: &StoredValue) -> toml::Value {
        match value {
            StoredValue::Null => toml::Value::String(String::new()),
            StoredValue::Bool(b) => toml::Value::Boolean(*b),
            StoredValue::Integer(i) => toml::Value::Integer(*i),
            StoredValue::Float(f) => toml::Value::Float(*f),
            StoredValue::String(s) => toml::Value::String(s.clone()),
            StoredValue::Array(arr) => {
                toml::Value::Array(arr.iter().map(Self::stored_to_toml).collect())
            }
        }
    }
}

impl OptionStore for SettingsStore {
    fn read(&self, section: &str, name: &str) -> Option<StoredValue> {
        self.data.read().get(section)?.get(name).cloned()
    }

    fn write(&self, section: &str, name: &str, value: StoredValue) -> Result<()> {
        self.data
            .write()
            .entry(section.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }
}

/// Write `bytes` to a temporary file beside `path`, then rename it over
/// `path`.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::io(path, e))?;
    file.write_all(bytes).map_err(|e| Error::io(path, e))?;
    file.flush().map_err(|e| Error::io(path, e))?;
    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    tracing::debug!(target: targets::STORE, path = %path.display(), "option store written");
    Ok(())
}

// ============================================================================
// Option value encoding
// ============================================================================

/// Encode the current value of an option.
pub(crate) fn encode(variant: &OptionVariant) -> StoredValue {
    match variant {
        OptionVariant::String(option) => StoredValue::String(option.value().clone()),
        OptionVariant::Bool(option) => StoredValue::Bool(*option.value()),
        OptionVariant::Int64(option) => StoredValue::Integer(*option.value()),
        OptionVariant::Instance(option) => encode_instance(*option.value()),
        OptionVariant::GuidList(option) => StoredValue::Array(
            option
                .value()
                .iter()
                .map(|guid| StoredValue::String(guid.hyphenated().to_string()))
                .collect(),
        ),
        OptionVariant::Multichoice(option) => StoredValue::String(option.value().to_string()),
        OptionVariant::IntRange(option) => StoredValue::Integer(i64::from(option.value())),
        OptionVariant::DoubleRange(option) => StoredValue::Float(option.value()),
        OptionVariant::ValidatedInstance(option) => encode_instance(*option.value()),
        OptionVariant::Date(option) => encode_date(option.selection()),
    }
}

fn encode_instance(guid: Option<Guid>) -> StoredValue {
    match guid {
        Some(guid) => StoredValue::String(guid.hyphenated().to_string()),
        None => StoredValue::Null,
    }
}

fn encode_date(selection: DateSelection) -> StoredValue {
    let mode = StoredValue::from(selection.date_type().as_str());
    let when = match selection {
        DateSelection::Absolute(time) => StoredValue::Integer(time),
        DateSelection::Starting(period) | DateSelection::Ending(period) => {
            StoredValue::from(period.as_str())
        }
    };
    StoredValue::Array(vec![mode, when])
}

/// Restore an option from its stored value.
///
/// The value is decoded completely before the option is touched, so a
/// malformed value leaves the option unchanged.
pub(crate) fn restore(variant: &mut OptionVariant, value: StoredValue) -> Result<()> {
    let section = variant.classifier().section().to_string();
    let name = variant.classifier().name().to_string();
    let unusable = |expected: &str, found: &StoredValue| {
        Error::store(
            section.as_str(),
            name.as_str(),
            format!("expected {expected}, found {}", found.kind_name()),
        )
    };

    match variant {
        OptionVariant::String(option) => {
            // TOML reads empty strings back as null.
            let text = match &value {
                StoredValue::String(text) => text.clone(),
                StoredValue::Null => String::new(),
                other => return Err(unusable("a string", other)),
            };
            option.set_value(text);
        }
        OptionVariant::Multichoice(option) => {
            let key = match &value {
                StoredValue::String(key) => key.as_str(),
                StoredValue::Null => "",
                other => return Err(unusable("a string", other)),
            };
            option.set_value(key)?;
        }
        OptionVariant::Bool(option) => {
            let flag = value.as_bool().ok_or_else(|| unusable("a boolean", &value))?;
            option.set_value(flag);
        }
        OptionVariant::Int64(option) => {
            let number = value.as_integer().ok_or_else(|| unusable("an integer", &value))?;
            option.set_value(number);
        }
        OptionVariant::IntRange(option) => {
            let number = value
                .as_integer()
                .and_then(|number| i32::try_from(number).ok())
                .ok_or_else(|| unusable("a 32-bit integer", &value))?;
            option.set_value(number)?;
        }
        OptionVariant::DoubleRange(option) => {
            let number = value.as_float().ok_or_else(|| unusable("a number", &value))?;
            option.set_value(number)?;
        }
        OptionVariant::Instance(option) => {
            let guid = decode_instance(&value).ok_or_else(|| unusable("a GUID or null", &value))?;
            option.set_value(guid);
        }
        OptionVariant::ValidatedInstance(option) => {
            let guid = decode_instance(&value).ok_or_else(|| unusable("a GUID or null", &value))?;
            option.set_value(guid)?;
        }
        OptionVariant::GuidList(option) => {
            let guids = value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().and_then(|text| Guid::parse_str(text).ok()))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| unusable("an array of GUIDs", &value))?;
            option.set_value(guids);
        }
        OptionVariant::Date(option) => {
            let selection = decode_date(&value).ok_or_else(|| unusable("a date selection", &value))?;
            option.set_selection(selection);
        }
    }
    tracing::trace!(target: targets::STORE, section = section.as_str(), name = name.as_str(), "option restored");
    Ok(())
}

fn decode_instance(value: &StoredValue) -> Option<Option<Guid>> {
    match value {
        StoredValue::Null => Some(None),
        StoredValue::String(text) => Guid::parse_str(text).ok().map(Some),
        _ => None,
    }
}

fn decode_date(value: &StoredValue) -> Option<DateSelection> {
    let [mode, when] = value.as_array()? else {
        return None;
    };
    let mode: DateType = mode.as_str()?.parse().ok()?;
    match (mode, when) {
        (DateType::Absolute, StoredValue::Integer(time)) => Some(DateSelection::Absolute(*time)),
        (DateType::Starting, StoredValue::String(period)) => {
            Some(DateSelection::Starting(period.parse::<RelativeDatePeriod>().ok()?))
        }
        (DateType::Ending, StoredValue::String(period)) => {
            Some(DateSelection::Ending(period.parse::<RelativeDatePeriod>().ok()?))
        }
        _ => None,
    }
}
