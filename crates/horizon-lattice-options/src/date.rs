//! Relative date resolution.
//!
//! Date options either hold an absolute timestamp or name a calendar period
//! relative to "now" ("the start of this month", "the end of the previous
//! quarter"). Relative selections are resolved every time the value is read,
//! through a [`TimeService`]. The service is injected into each date option
//! so tests can pin a virtual "now".
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_options::date::{CalendarTimeService, RelativeDatePeriod, TimeService};
//!
//! // 2024-05-17 12:00:00 UTC
//! let service = CalendarTimeService::utc().with_fixed_now(1_715_947_200);
//!
//! // 2024-05-01 00:00:00 UTC
//! assert_eq!(service.period_start(RelativeDatePeriod::ThisMonth), 1_714_521_600);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::config::TimeServiceConfig;
use crate::error::{Error, Result};
use crate::logging::targets;

/// How a date option's value is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateType {
    /// The stored timestamp is the value.
    Absolute,
    /// The first instant of the selected period.
    Starting,
    /// The last second of the selected period.
    Ending,
}

impl DateType {
    /// The persisted name of this date type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Starting => "starting",
            Self::Ending => "ending",
        }
    }
}

impl FromStr for DateType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(Self::Absolute),
            "starting" => Ok(Self::Starting),
            "ending" => Ok(Self::Ending),
            other => Err(format!("unknown date type '{other}'")),
        }
    }
}

/// A calendar period relative to the current time.
///
/// Ordinals are stable: they are what the encoded `(DateType, i64)` setter
/// pair carries for relative dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelativeDatePeriod {
    #[default]
    Today,
    ThisMonth,
    PrevMonth,
    CurrentQuarter,
    PrevQuarter,
    CalYear,
    PrevYear,
    AccountingPeriod,
}

impl RelativeDatePeriod {
    /// Every period, in ordinal order.
    pub const ALL: [RelativeDatePeriod; 8] = [
        Self::Today,
        Self::ThisMonth,
        Self::PrevMonth,
        Self::CurrentQuarter,
        Self::PrevQuarter,
        Self::CalYear,
        Self::PrevYear,
        Self::AccountingPeriod,
    ];

    /// The stable ordinal of this period.
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// Look a period up by ordinal.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// The persisted name of this period.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisMonth => "this-month",
            Self::PrevMonth => "prev-month",
            Self::CurrentQuarter => "current-quarter",
            Self::PrevQuarter => "prev-quarter",
            Self::CalYear => "cal-year",
            Self::PrevYear => "prev-year",
            Self::AccountingPeriod => "accounting-period",
        }
    }
}

impl FromStr for RelativeDatePeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| format!("unknown relative date period '{s}'"))
    }
}

/// The full selection of a date option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateSelection {
    /// A fixed point in time, seconds since the Unix epoch.
    Absolute(i64),
    /// The start of a relative period.
    Starting(RelativeDatePeriod),
    /// The end of a relative period.
    Ending(RelativeDatePeriod),
}

impl DateSelection {
    /// The date type of this selection.
    pub fn date_type(self) -> DateType {
        match self {
            Self::Absolute(_) => DateType::Absolute,
            Self::Starting(_) => DateType::Starting,
            Self::Ending(_) => DateType::Ending,
        }
    }
}

impl TryFrom<(DateType, i64)> for DateSelection {
    type Error = Error;

    /// Decode the `(type, timestamp-or-period)` setter pair.
    fn try_from((date_type, value): (DateType, i64)) -> Result<Self> {
        let period = || RelativeDatePeriod::from_ordinal(value).ok_or(Error::InvalidPeriod { ordinal: value });
        match date_type {
            DateType::Absolute => Ok(Self::Absolute(value)),
            DateType::Starting => Ok(Self::Starting(period()?)),
            DateType::Ending => Ok(Self::Ending(period()?)),
        }
    }
}

impl From<DateSelection> for (DateType, i64) {
    fn from(selection: DateSelection) -> Self {
        match selection {
            DateSelection::Absolute(time) => (DateType::Absolute, time),
            DateSelection::Starting(period) => (DateType::Starting, period.ordinal()),
            DateSelection::Ending(period) => (DateType::Ending, period.ordinal()),
        }
    }
}

/// Source of "now" and calendar arithmetic for relative dates.
pub trait TimeService: Send + Sync + fmt::Debug {
    /// The current time, seconds since the Unix epoch.
    fn now(&self) -> i64;

    /// The first instant of `period`, anchored at [`now`](Self::now).
    fn period_start(&self, period: RelativeDatePeriod) -> i64;

    /// The last second of `period`, anchored at [`now`](Self::now).
    fn period_end(&self, period: RelativeDatePeriod) -> i64;

    /// Resolve a selection to a concrete timestamp.
    fn resolve(&self, selection: DateSelection) -> i64 {
        match selection {
            DateSelection::Absolute(time) => time,
            DateSelection::Starting(period) => self.period_start(period),
            DateSelection::Ending(period) => self.period_end(period),
        }
    }
}

/// The time zone a [`CalendarTimeService`] measures days in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The machine's local zone, with its daylight-saving rules.
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
    /// A named IANA zone, such as `Europe/Berlin`.
    Named(Tz),
}

/// Gregorian-calendar [`TimeService`].
///
/// Periods are half-open day ranges: the start is local midnight of the
/// first day and the end is one second before local midnight following the
/// last day. Each boundary uses the UTC offset in effect on its own day, so
/// a year that starts in winter time and is queried in summer time still
/// starts at midnight. Quarters start in January, April, July and October.
/// The accounting period is the fiscal year containing "now".
#[derive(Debug, Clone)]
pub struct CalendarTimeService {
    zone: CalendarZone,
    fiscal_year_start: (u32, u32),
    fixed_now: Option<i64>,
}

impl CalendarTimeService {
    /// A service in the machine's local time zone.
    pub fn local() -> Self {
        Self::with_zone(CalendarZone::Local)
    }

    /// A service working in UTC.
    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// A service working in the given fixed offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self::with_zone(CalendarZone::Fixed(offset))
    }

    /// A service working in a named time zone.
    pub fn with_time_zone(time_zone: Tz) -> Self {
        Self::with_zone(CalendarZone::Named(time_zone))
    }

    fn with_zone(zone: CalendarZone) -> Self {
        Self {
            zone,
            fiscal_year_start: (1, 1),
            fixed_now: None,
        }
    }

    /// Build a service from configuration.
    ///
    /// `use_utc` wins over `time_zone`; with neither set the local zone is
    /// used.
    pub fn from_config(config: &TimeServiceConfig) -> Result<Self> {
        config.validate()?;
        let service = if config.use_utc {
            Self::utc()
        } else if let Some(time_zone) = config.parsed_time_zone()? {
            Self::with_time_zone(time_zone)
        } else {
            Self::local()
        };
        Ok(service.with_fiscal_year_start(
            config.fiscal_year_start_month,
            config.fiscal_year_start_day,
        ))
    }

    /// Set the month and day the fiscal year starts on.
    ///
    /// Days past the 28th are clamped so the start exists in every month.
    pub fn with_fiscal_year_start(mut self, month: u32, day: u32) -> Self {
        self.fiscal_year_start = (month.clamp(1, 12), day.clamp(1, 28));
        self
    }

    /// Pin "now" to a fixed timestamp.
    pub fn with_fixed_now(mut self, now: i64) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// The time zone the service works in.
    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// The UTC offset in effect at "now".
    pub fn offset(&self) -> FixedOffset {
        let now = self.now_utc();
        match self.zone {
            CalendarZone::Local => now.with_timezone(&Local).offset().fix(),
            CalendarZone::Fixed(offset) => offset,
            CalendarZone::Named(time_zone) => now.with_timezone(&time_zone).offset().fix(),
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let now = self.now();
        DateTime::from_timestamp(now, 0).unwrap_or_else(|| {
            let clamped = if now < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            };
            tracing::warn!(
                target: targets::OPTIONS,
                now,
                %clamped,
                "current time is outside the calendar range, clamped"
            );
            clamped
        })
    }

    fn today(&self) -> NaiveDate {
        let now = self.now_utc();
        match self.zone {
            CalendarZone::Local => now.with_timezone(&Local).date_naive(),
            CalendarZone::Fixed(offset) => now.with_timezone(&offset).date_naive(),
            CalendarZone::Named(time_zone) => now.with_timezone(&time_zone).date_naive(),
        }
    }

    fn midnight(&self, date: NaiveDate) -> i64 {
        match self.zone {
            CalendarZone::Local => local_midnight(&Local, date),
            CalendarZone::Fixed(offset) => local_midnight(&offset, date),
            CalendarZone::Named(time_zone) => local_midnight(&time_zone, date),
        }
    }

    /// The half-open day range `[first, past_last)` covered by `period`.
    fn period_days(&self, period: RelativeDatePeriod) -> (NaiveDate, NaiveDate) {
        let today = self.today();
        let month = month_index(today);
        let quarter = month - month.rem_euclid(3);
        let year = today.year() * 12;

        match period {
            RelativeDatePeriod::Today => (today, today.succ_opt().unwrap_or(today)),
            RelativeDatePeriod::ThisMonth => (month_start(month), month_start(month + 1)),
            RelativeDatePeriod::PrevMonth => (month_start(month - 1), month_start(month)),
            RelativeDatePeriod::CurrentQuarter => {
                (month_start(quarter), month_start(quarter + 3))
            }
            RelativeDatePeriod::PrevQuarter => (month_start(quarter - 3), month_start(quarter)),
            RelativeDatePeriod::CalYear => (month_start(year), month_start(year + 12)),
            RelativeDatePeriod::PrevYear => (month_start(year - 12), month_start(year)),
            RelativeDatePeriod::AccountingPeriod => {
                let (month, day) = self.fiscal_year_start;
                let mut start = fiscal_start(today.year(), month, day);
                if today < start {
                    start = fiscal_start(today.year() - 1, month, day);
                }
                (start, fiscal_start(start.year() + 1, month, day))
            }
        }
    }
}

impl Default for CalendarTimeService {
    fn default() -> Self {
        Self::local()
    }
}

impl TimeService for CalendarTimeService {
    fn now(&self) -> i64 {
        self.fixed_now.unwrap_or_else(|| Utc::now().timestamp())
    }

    fn period_start(&self, period: RelativeDatePeriod) -> i64 {
        let (first, _) = self.period_days(period);
        self.midnight(first)
    }

    fn period_end(&self, period: RelativeDatePeriod) -> i64 {
        let (_, past_last) = self.period_days(period);
        self.midnight(past_last) - 1
    }
}

/// The first instant of `date` in `zone`.
///
/// Where a daylight-saving jump skips midnight, the day starts when the gap
/// ends.
fn local_midnight<Z: TimeZone>(zone: &Z, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    zone.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            midnight
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|later| zone.from_local_datetime(&later).earliest())
        })
        .map(|time| time.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

/// Months since year 0 for the month containing `date`.
fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// The first day of the month with the given index.
fn month_start(index: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or(NaiveDate::MIN)
}

fn fiscal_start(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| month_start(year * 12))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn service_at(year: i32, month: u32, day: u32) -> CalendarTimeService {
        CalendarTimeService::utc().with_fixed_now(ts(year, month, day, 12, 30, 0))
    }

    #[test]
    fn test_today() {
        let service = service_at(2024, 5, 17);
        assert_eq!(service.period_start(RelativeDatePeriod::Today), ts(2024, 5, 17, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::Today), ts(2024, 5, 17, 23, 59, 59));
    }

    #[test]
    fn test_months() {
        let service = service_at(2024, 3, 10);
        assert_eq!(service.period_start(RelativeDatePeriod::ThisMonth), ts(2024, 3, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::ThisMonth), ts(2024, 3, 31, 23, 59, 59));
        // Leap-year February
        assert_eq!(service.period_start(RelativeDatePeriod::PrevMonth), ts(2024, 2, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::PrevMonth), ts(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn test_previous_month_crosses_year() {
        let service = service_at(2024, 1, 15);
        assert_eq!(service.period_start(RelativeDatePeriod::PrevMonth), ts(2023, 12, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::PrevMonth), ts(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_quarters() {
        let service = service_at(2024, 5, 17);
        assert_eq!(service.period_start(RelativeDatePeriod::CurrentQuarter), ts(2024, 4, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::CurrentQuarter), ts(2024, 6, 30, 23, 59, 59));
        assert_eq!(service.period_start(RelativeDatePeriod::PrevQuarter), ts(2024, 1, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::PrevQuarter), ts(2024, 3, 31, 23, 59, 59));

        let service = service_at(2024, 2, 1);
        assert_eq!(service.period_start(RelativeDatePeriod::PrevQuarter), ts(2023, 10, 1, 0, 0, 0));
    }

    #[test]
    fn test_years() {
        let service = service_at(2024, 5, 17);
        assert_eq!(service.period_start(RelativeDatePeriod::CalYear), ts(2024, 1, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::CalYear), ts(2024, 12, 31, 23, 59, 59));
        assert_eq!(service.period_start(RelativeDatePeriod::PrevYear), ts(2023, 1, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::PrevYear), ts(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_accounting_period() {
        let service = service_at(2024, 5, 17).with_fiscal_year_start(7, 1);
        assert_eq!(service.period_start(RelativeDatePeriod::AccountingPeriod), ts(2023, 7, 1, 0, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::AccountingPeriod), ts(2024, 6, 30, 23, 59, 59));

        let service = service_at(2024, 8, 2).with_fiscal_year_start(7, 1);
        assert_eq!(service.period_start(RelativeDatePeriod::AccountingPeriod), ts(2024, 7, 1, 0, 0, 0));

        // Default fiscal year is the calendar year.
        let service = service_at(2024, 8, 2);
        assert_eq!(
            service.period_start(RelativeDatePeriod::AccountingPeriod),
            service.period_start(RelativeDatePeriod::CalYear)
        );
    }

    #[test]
    fn test_offset_shifts_boundaries() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let service = CalendarTimeService::with_offset(offset).with_fixed_now(ts(2024, 5, 17, 12, 0, 0));
        // Local midnight is 22:00 UTC the previous day.
        assert_eq!(service.period_start(RelativeDatePeriod::Today), ts(2024, 5, 16, 22, 0, 0));
    }

    #[test]
    fn test_boundaries_follow_daylight_saving() {
        // 2024-05-17 12:00:00 UTC, summer time (+02:00) in Berlin
        let service = CalendarTimeService::with_time_zone(chrono_tz::Europe::Berlin)
            .with_fixed_now(ts(2024, 5, 17, 12, 0, 0));
        assert_eq!(service.offset(), FixedOffset::east_opt(2 * 3600).unwrap());

        // Winter time (+01:00) boundaries keep their own offset.
        assert_eq!(service.period_start(RelativeDatePeriod::CalYear), 1_704_063_600);
        assert_eq!(service.period_end(RelativeDatePeriod::CalYear), ts(2024, 12, 31, 22, 59, 59));
        assert_eq!(service.period_start(RelativeDatePeriod::PrevQuarter), ts(2023, 12, 31, 23, 0, 0));

        // Summer time boundaries.
        assert_eq!(service.period_start(RelativeDatePeriod::ThisMonth), ts(2024, 4, 30, 22, 0, 0));
        assert_eq!(service.period_start(RelativeDatePeriod::PrevMonth), ts(2024, 3, 31, 22, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::Today), ts(2024, 5, 17, 21, 59, 59));

        // March straddles the change: starts at +01:00, ends at +02:00.
        let service = CalendarTimeService::with_time_zone(chrono_tz::Europe::Berlin)
            .with_fixed_now(ts(2024, 4, 10, 12, 0, 0));
        assert_eq!(service.period_start(RelativeDatePeriod::PrevMonth), ts(2024, 2, 29, 23, 0, 0));
        assert_eq!(service.period_end(RelativeDatePeriod::PrevMonth), ts(2024, 3, 31, 21, 59, 59));
    }

    #[test]
    fn test_skipped_midnight_starts_after_the_gap() {
        // Santiago moved clocks from 00:00 to 01:00 on 2024-09-08.
        let service = CalendarTimeService::with_time_zone(chrono_tz::America::Santiago)
            .with_fixed_now(ts(2024, 9, 8, 15, 0, 0));
        // 01:00 -03:00
        assert_eq!(service.period_start(RelativeDatePeriod::Today), ts(2024, 9, 8, 4, 0, 0));
    }

    #[test]
    fn test_unrepresentable_now_is_clamped() {
        let service = CalendarTimeService::utc().with_fixed_now(i64::MAX);
        assert_eq!(service.today(), DateTime::<Utc>::MAX_UTC.date_naive());

        let service = CalendarTimeService::utc().with_fixed_now(i64::MIN);
        assert_eq!(service.today(), DateTime::<Utc>::MIN_UTC.date_naive());
    }

    #[test]
    fn test_from_config_zones() {
        let config = TimeServiceConfig::new().with_time_zone("Europe/Berlin");
        let service = CalendarTimeService::from_config(&config).unwrap();
        assert_eq!(service.zone(), CalendarZone::Named(chrono_tz::Europe::Berlin));

        let service = CalendarTimeService::from_config(&config.clone().with_utc(true)).unwrap();
        assert_eq!(service.zone(), CalendarZone::Fixed(Utc.fix()));

        let service = CalendarTimeService::from_config(&TimeServiceConfig::new()).unwrap();
        assert_eq!(service.zone(), CalendarZone::Local);

        let bad = TimeServiceConfig::new().with_time_zone("Mars/Olympus_Mons");
        assert!(matches!(
            CalendarTimeService::from_config(&bad),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_resolve_selection() {
        let service = service_at(2024, 5, 17);
        assert_eq!(service.resolve(DateSelection::Absolute(42)), 42);
        assert_eq!(
            service.resolve(DateSelection::Ending(RelativeDatePeriod::ThisMonth)),
            ts(2024, 5, 31, 23, 59, 59)
        );
    }

    #[test]
    fn test_encoded_pair() {
        let selection = DateSelection::try_from((DateType::Starting, 1)).unwrap();
        assert_eq!(selection, DateSelection::Starting(RelativeDatePeriod::ThisMonth));

        let selection = DateSelection::try_from((DateType::Absolute, 1_000)).unwrap();
        assert_eq!(selection, DateSelection::Absolute(1_000));

        let err = DateSelection::try_from((DateType::Ending, 99)).unwrap_err();
        assert!(matches!(err, Error::InvalidPeriod { ordinal: 99 }));

        let pair: (DateType, i64) = DateSelection::Ending(RelativeDatePeriod::PrevYear).into();
        assert_eq!(pair, (DateType::Ending, 6));
    }

    #[test]
    fn test_period_names() {
        for period in RelativeDatePeriod::ALL {
            assert_eq!(period.as_str().parse::<RelativeDatePeriod>(), Ok(period));
            assert_eq!(RelativeDatePeriod::from_ordinal(period.ordinal()), Some(period));
        }
        assert!("next-decade".parse::<RelativeDatePeriod>().is_err());
        assert_eq!(RelativeDatePeriod::from_ordinal(-1), None);
    }
}
