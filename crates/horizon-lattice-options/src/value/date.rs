//! Date options.

use std::sync::Arc;

use crate::classifier::OptionClassifier;
use crate::date::{CalendarTimeService, DateSelection, DateType, RelativeDatePeriod, TimeService};
use crate::ui_item::{OptionUiItem, UiType};

/// An option holding either an absolute time or a relative period.
///
/// Relative selections are resolved against the injected [`TimeService`]
/// every time the value is read, so "start of this month" moves with the
/// calendar. The default value is always "now", computed fresh.
///
/// # Example
///
/// ```ignore
/// let mut option = DateValue::new(
///     OptionClassifier::new("General", "Start Date", "a", "Report start"),
/// );
/// option.set_selection(DateSelection::Starting(RelativeDatePeriod::ThisMonth));
/// let start = option.value();
/// ```
#[derive(Debug, Clone)]
pub struct DateValue {
    classifier: OptionClassifier,
    ui: OptionUiItem,
    date_type: DateType,
    period: RelativeDatePeriod,
    date: i64,
    time_service: Arc<dyn TimeService>,
}

impl DateValue {
    /// Create a date option set to the current local time.
    pub fn new(classifier: OptionClassifier) -> Self {
        Self::with_time_service(classifier, Arc::new(CalendarTimeService::local()))
    }

    /// Create a date option resolving through `time_service`.
    pub fn with_time_service(
        classifier: OptionClassifier,
        time_service: Arc<dyn TimeService>,
    ) -> Self {
        Self {
            classifier,
            ui: OptionUiItem::new(UiType::Date),
            date_type: DateType::Absolute,
            period: RelativeDatePeriod::Today,
            date: time_service.now(),
            time_service,
        }
    }

    /// The concrete time this option currently denotes.
    pub fn value(&self) -> i64 {
        self.time_service.resolve(self.selection())
    }

    /// The current time; date defaults are never frozen.
    pub fn default_value(&self) -> i64 {
        self.time_service.now()
    }

    /// Set an absolute time, discarding any relative period.
    pub fn set_value(&mut self, time: i64) {
        self.date_type = DateType::Absolute;
        self.period = RelativeDatePeriod::Today;
        self.date = time;
    }

    /// Set the full selection.
    ///
    /// A relative selection keeps the last absolute time so that switching
    /// back through the UI has something sensible to show.
    pub fn set_selection(&mut self, selection: DateSelection) {
        match selection {
            DateSelection::Absolute(time) => self.set_value(time),
            DateSelection::Starting(period) | DateSelection::Ending(period) => {
                self.date_type = selection.date_type();
                self.period = period;
            }
        }
    }

    /// The full selection.
    pub fn selection(&self) -> DateSelection {
        match self.date_type {
            DateType::Absolute => DateSelection::Absolute(self.date),
            DateType::Starting => DateSelection::Starting(self.period),
            DateType::Ending => DateSelection::Ending(self.period),
        }
    }

    /// Select "now" as an absolute time.
    pub fn reset_default_value(&mut self) {
        self.set_value(self.time_service.now());
    }

    /// The date type.
    pub fn date_type(&self) -> DateType {
        self.date_type
    }

    /// The relative period; `Today` for absolute selections.
    pub fn period(&self) -> RelativeDatePeriod {
        self.period
    }

    /// The time service used for resolution.
    pub fn time_service(&self) -> &Arc<dyn TimeService> {
        &self.time_service
    }
}

super::impl_option_base!(DateValue);
