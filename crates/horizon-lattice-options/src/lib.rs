//! Typed, validated options for Horizon Lattice.
//!
//! This crate models the configurable parameters of reports and dialogs:
//!
//! - **Option kinds**: plain, validated, numeric range, multiple choice and
//!   relative-or-absolute dates, each with its own validation
//! - **Identity**: section, name, sort tag and doc string per option
//! - **UI binding**: one non-owning UI control reference per option, with an
//!   internal mode that forbids binding
//! - **Persistence**: save and restore against any [`OptionStore`], with a
//!   JSON/TOML-backed [`SettingsStore`]
//! - **Registry**: [`OptionDb`] collects options by section and name
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_options::prelude::*;
//!
//! let mut db = OptionDb::new();
//! db.register(RangeValue::new(
//!     OptionClassifier::new("Display", "Tax Table", "a", "Tax table to use"),
//!     5, 0, 10, 1,
//! ))?;
//!
//! db.set_value("Display", "Tax Table", 7)?;
//! assert!(db.set_value("Display", "Tax Table", 12).is_err());
//!
//! let store = SettingsStore::new();
//! db.save_to_book(&store)?;
//! store.save_json("report.json")?;
//! ```

pub mod classifier;
pub mod config;
pub mod date;
pub mod db;
pub mod logging;
pub mod option;
pub mod store;
pub mod ui_item;
pub mod value;

mod error;

pub use classifier::OptionClassifier;
pub use config::TimeServiceConfig;
pub use date::{CalendarTimeService, CalendarZone, DateSelection, DateType, RelativeDatePeriod, TimeService};
pub use db::OptionDb;
pub use error::{Error, Result};
pub use option::{ChangedCallback, Guid, OptionHandle, OptionKind, OptionType, OptionVariant};
pub use store::{OptionStore, SettingsStore, StoredValue};
pub use ui_item::{OptionUiItem, UiItemId, UiType};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::classifier::OptionClassifier;
    pub use crate::date::{
        CalendarTimeService, CalendarZone, DateSelection, DateType, RelativeDatePeriod, TimeService,
    };
    pub use crate::db::OptionDb;
    pub use crate::option::{Guid, OptionHandle, OptionKind, OptionType, OptionVariant};
    pub use crate::store::{OptionStore, SettingsStore, StoredValue};
    pub use crate::ui_item::{UiItemId, UiType};
    pub use crate::value::{
        DateValue, MultichoiceEntry, MultichoiceValue, OptionBase, OptionValue, RangeValue,
        ValidatedValue,
    };
    pub use crate::{Error, Result};
}
