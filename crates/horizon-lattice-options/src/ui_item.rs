//! UI-binding capability.
//!
//! Every option may be associated with at most one external UI control. The
//! association is a [`UiItemId`]: a key into whatever registry the UI layer
//! keeps its controls in, in the same way the toolkit refers to live objects
//! through `ObjectId`s. The option never owns the control. When the UI layer
//! destroys a control it calls [`OptionUiItem::clear_ui_item`] so the option
//! stops referring to it.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_options::{OptionUiItem, UiItemId, UiType};
//! use slotmap::SlotMap;
//!
//! let mut controls: SlotMap<UiItemId, MyWidget> = SlotMap::with_key();
//! let id = controls.insert(MyWidget::new());
//!
//! let mut ui = OptionUiItem::new(UiType::Boolean);
//! ui.set_ui_item(id)?;
//!
//! // The widget is going away.
//! controls.remove(id);
//! ui.clear_ui_item();
//! ```

use slotmap::new_key_type;

use crate::error::{Error, Result};
use crate::logging::targets;

new_key_type! {
    /// A non-owning handle to an external UI control.
    ///
    /// Keys are minted by the UI layer's own `SlotMap`; the option system
    /// only stores and returns them.
    pub struct UiItemId;
}

/// The kind of UI control that edits an option.
///
/// UI layers dispatch on this to decide which widget to build. `Internal`
/// options are never shown and may not be bound to a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UiType {
    #[default]
    Internal,
    Boolean,
    String,
    Text,
    Currency,
    Commodity,
    Multichoice,
    Date,
    AccountList,
    AccountSelector,
    List,
    NumberRange,
    Color,
    Font,
    Budget,
    Pixmap,
    RadioButton,
    DateFormat,
    Owner,
    Customer,
    Vendor,
    Employee,
    Invoice,
    TaxTable,
    /// Reserved for query options; no option kind holds a query.
    Query,
}

impl UiType {
    /// Returns true for the `Internal` UI type.
    pub fn is_internal(self) -> bool {
        self == Self::Internal
    }
}

/// The UI-binding state of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionUiItem {
    ui_type: UiType,
    ui_item: Option<UiItemId>,
}

impl OptionUiItem {
    /// Create an unbound capability with the given UI type.
    pub fn new(ui_type: UiType) -> Self {
        Self {
            ui_type,
            ui_item: None,
        }
    }

    /// The UI type.
    pub fn ui_type(&self) -> UiType {
        self.ui_type
    }

    /// The bound UI control, if any.
    pub fn ui_item(&self) -> Option<UiItemId> {
        self.ui_item
    }

    /// Bind a UI control, replacing any previous binding.
    ///
    /// Fails with [`Error::InternalUiItem`] for internal options, leaving
    /// the option unbound.
    pub fn set_ui_item(&mut self, ui_item: UiItemId) -> Result<()> {
        if self.ui_type.is_internal() {
            tracing::warn!(target: targets::UI, ?ui_item, "refusing to bind UI item to INTERNAL option");
            return Err(Error::InternalUiItem);
        }
        self.ui_item = Some(ui_item);
        Ok(())
    }

    /// Forget the bound UI control. Calling this when nothing is bound is a no-op.
    pub fn clear_ui_item(&mut self) {
        self.ui_item = None;
    }

    /// Turn the option into an internal one.
    ///
    /// Fails with [`Error::UiItemBound`] while a control is bound.
    pub fn make_internal(&mut self) -> Result<()> {
        if let Some(ui_item) = self.ui_item {
            tracing::warn!(target: targets::UI, ?ui_item, "refusing to make a bound option INTERNAL");
            return Err(Error::UiItemBound);
        }
        self.ui_type = UiType::Internal;
        Ok(())
    }
}

impl Default for OptionUiItem {
    fn default() -> Self {
        Self::new(UiType::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_key() -> UiItemId {
        let mut controls: SlotMap<UiItemId, ()> = SlotMap::with_key();
        controls.insert(())
    }

    #[test]
    fn test_internal_rejects_binding() {
        let mut ui = OptionUiItem::new(UiType::Internal);
        let err = ui.set_ui_item(make_key()).unwrap_err();
        assert!(err.is_policy_violation());
        assert!(ui.ui_item().is_none());
    }

    #[test]
    fn test_binding_last_writer_wins() {
        let mut controls: SlotMap<UiItemId, &str> = SlotMap::with_key();
        let first = controls.insert("first");
        let second = controls.insert("second");

        let mut ui = OptionUiItem::new(UiType::Boolean);
        ui.set_ui_item(first).unwrap();
        ui.set_ui_item(second).unwrap();
        assert_eq!(ui.ui_item(), Some(second));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut ui = OptionUiItem::new(UiType::String);
        ui.set_ui_item(make_key()).unwrap();

        ui.clear_ui_item();
        assert!(ui.ui_item().is_none());
        ui.clear_ui_item();
        assert!(ui.ui_item().is_none());
    }

    #[test]
    fn test_make_internal() {
        let mut ui = OptionUiItem::new(UiType::Text);
        ui.set_ui_item(make_key()).unwrap();

        let err = ui.make_internal().unwrap_err();
        assert!(matches!(err, Error::UiItemBound));
        assert_eq!(ui.ui_type(), UiType::Text);

        ui.clear_ui_item();
        ui.make_internal().unwrap();
        assert_eq!(ui.ui_type(), UiType::Internal);
        assert!(ui.set_ui_item(make_key()).is_err());
    }
}
