use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeskbookError;

/// Slider and booking granularity in minutes
pub const QUARTER_MINUTES: u32 = 15;

/// Last representable minute of a day (23:59)
const LAST_MINUTE: u32 = 23 * 60 + 59;

/// Format used for every date-time sent to the backend (local, no offset)
pub const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:00";

/// Format of date inputs and the date half of route keys
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A wall-clock time of day with minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// `{0, 0}` doubles as the "not chosen yet" marker
    pub const UNSET: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Build a time, rejecting out-of-range components
    pub fn try_new(hour: u32, minute: u32) -> Result<Self, DeskbookError> {
        if hour > 23 || minute > 59 {
            return Err(DeskbookError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// Build from minutes since midnight, saturating at 23:59
    pub fn from_minutes(total: u32) -> Self {
        let total = total.min(LAST_MINUTE);
        Self {
            hour: total / 60,
            minute: total % 60,
        }
    }

    /// Minutes since midnight
    pub fn minutes(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// True when the minute sits on a 15-minute boundary
    pub fn is_quarter(&self) -> bool {
        self.minute % QUARTER_MINUTES == 0
    }

    /// Round to the nearest quarter hour (ties round up)
    pub fn round_to_quarter(&self) -> Self {
        Self::from_minutes(round_minutes_to_quarter(self.minutes() as f64))
    }

    /// Round up to the next quarter hour; a time already on a boundary is kept
    pub fn ceil_to_quarter(&self) -> Self {
        let m = self.minutes();
        Self::from_minutes(m.div_ceil(QUARTER_MINUTES) * QUARTER_MINUTES)
    }

    /// Shift by a signed number of minutes, saturating within the day
    pub fn add_minutes(&self, delta: i32) -> Self {
        let shifted = (self.minutes() as i64 + delta as i64).clamp(0, LAST_MINUTE as i64);
        Self::from_minutes(shifted as u32)
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn to_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = DeskbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| DeskbookError::InvalidDateTime(s.to_string()))?;
        let hour = h
            .trim()
            .parse()
            .map_err(|_| DeskbookError::InvalidDateTime(s.to_string()))?;
        let minute = m
            .trim()
            .parse()
            .map_err(|_| DeskbookError::InvalidDateTime(s.to_string()))?;
        Self::try_new(hour, minute)
    }
}

/// Nearest multiple of 15 for a fractional minute count
pub fn round_minutes_to_quarter(total: f64) -> u32 {
    let quarters = (total / QUARTER_MINUTES as f64).round().max(0.0);
    quarters as u32 * QUARTER_MINUTES
}

/// A booking window within a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Both ends unset (`00:00–00:00`)
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_unset(&self) -> bool {
        self.start.is_unset() && self.end.is_unset()
    }

    /// Signed span in minutes (negative when inverted)
    pub fn span_minutes(&self) -> i32 {
        self.end.minutes() as i32 - self.start.minutes() as i32
    }

    pub fn is_valid(&self) -> bool {
        self.span_minutes() > 0
    }

    /// Human-readable length such as `1 h 15 m`
    pub fn duration_label(&self) -> String {
        let diff = self.span_minutes().max(0);
        format!("{} h {:02} m", diff / 60, diff % 60)
    }

    /// Start and end as backend local date-time strings for `date`
    pub fn to_local_strings(&self, date: NaiveDate) -> (String, String) {
        (format_local(date, self.start), format_local(date, self.end))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

/// The daily window in which seats may be booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub min_time: TimeOfDay,
    pub max_time: TimeOfDay,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            min_time: TimeOfDay::new(8, 0),
            max_time: TimeOfDay::new(22, 0),
        }
    }
}

impl WorkingHours {
    pub fn new(min_time: TimeOfDay, max_time: TimeOfDay) -> Result<Self, DeskbookError> {
        if max_time.minutes() <= min_time.minutes() {
            return Err(DeskbookError::InvalidWorkingHours(format!(
                "{} must be before {}",
                min_time, max_time
            )));
        }
        Ok(Self { min_time, max_time })
    }

    /// Length of the window in minutes (never zero)
    pub fn span_minutes(&self) -> u32 {
        self.max_time
            .minutes()
            .saturating_sub(self.min_time.minutes())
            .max(1)
    }

    /// Clamp a time into `[min_time, max_time]`
    pub fn clamp(&self, time: TimeOfDay) -> TimeOfDay {
        if time < self.min_time {
            self.min_time
        } else if time > self.max_time {
            self.max_time
        } else {
            time
        }
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        time >= self.min_time && time <= self.max_time
    }

    /// Whether `now` lies outside the half-open `[min, max)` window
    pub fn is_outside(&self, now: TimeOfDay) -> bool {
        now < self.min_time || now >= self.max_time
    }

    /// Last start that still leaves a quarter hour before closing
    pub fn latest_start(&self) -> TimeOfDay {
        let latest = self.max_time.minutes().saturating_sub(QUARTER_MINUTES);
        TimeOfDay::from_minutes(latest.max(self.min_time.minutes()))
    }

    /// No quarter hour is left to book today, either before opening or near closing
    pub fn is_closed_for_booking(&self, now: TimeOfDay) -> bool {
        self.is_outside(now) || self.rounded_now(now) > self.latest_start()
    }

    /// `now` rounded up to the next quarter hour, clamped into the window
    pub fn rounded_now(&self, now: TimeOfDay) -> TimeOfDay {
        let rounded = now.minutes().div_ceil(QUARTER_MINUTES) * QUARTER_MINUTES;
        if rounded > self.max_time.minutes() {
            return self.max_time;
        }
        if rounded < self.min_time.minutes() {
            return self.min_time;
        }
        TimeOfDay::from_minutes(rounded)
    }

    /// `start + minutes`, capped at `max_time`
    pub fn end_after(&self, start: TimeOfDay, minutes: u32) -> TimeOfDay {
        let end = start.minutes() + minutes;
        if end > self.max_time.minutes() {
            self.max_time
        } else {
            TimeOfDay::from_minutes(end)
        }
    }
}

/// Format a date and time as `YYYY-MM-DDTHH:MM:00`
pub fn format_local(date: NaiveDate, time: TimeOfDay) -> String {
    date.and_time(time.to_naive())
        .format(LOCAL_DATE_TIME_FORMAT)
        .to_string()
}

/// Parse a backend local date-time, with or without seconds and fractions
pub fn parse_local(s: &str) -> Result<NaiveDateTime, DeskbookError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| DeskbookError::InvalidDateTime(s.to_string()))
}

/// Parse a `YYYY-MM-DD` date input
pub fn parse_date(s: &str) -> Result<NaiveDate, DeskbookError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DeskbookError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute)
    }

    // TimeOfDay tests
    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(TimeOfDay::try_new(23, 59).is_ok());
        assert!(TimeOfDay::try_new(24, 0).is_err());
        assert!(TimeOfDay::try_new(10, 60).is_err());
    }

    #[test]
    fn test_minutes_round_trip() {
        assert_eq!(t(9, 15).minutes(), 555);
        assert_eq!(TimeOfDay::from_minutes(555), t(9, 15));
        assert_eq!(TimeOfDay::from_minutes(5000), t(23, 59));
    }

    #[test]
    fn test_ordering() {
        assert!(t(9, 45) < t(10, 0));
        assert!(t(10, 0) > t(9, 59));
    }

    #[test]
    fn test_round_to_quarter() {
        assert_eq!(t(9, 5).round_to_quarter(), t(9, 0));
        assert_eq!(t(9, 8).round_to_quarter(), t(9, 15));
        assert_eq!(t(9, 53).round_to_quarter(), t(10, 0));
    }

    #[test]
    fn test_ceil_to_quarter() {
        assert_eq!(t(9, 7).ceil_to_quarter(), t(9, 15));
        assert_eq!(t(9, 15).ceil_to_quarter(), t(9, 15));
        assert_eq!(t(9, 46).ceil_to_quarter(), t(10, 0));
    }

    #[test]
    fn test_add_minutes_saturates() {
        assert_eq!(t(9, 0).add_minutes(75), t(10, 15));
        assert_eq!(t(0, 10).add_minutes(-30), t(0, 0));
        assert_eq!(t(23, 30).add_minutes(60), t(23, 59));
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(t(8, 5).to_string(), "08:05");
        assert_eq!("17:45".parse::<TimeOfDay>().unwrap(), t(17, 45));
        assert!("17".parse::<TimeOfDay>().is_err());
        assert!("25:00".parse::<TimeOfDay>().is_err());
    }

    // TimeRange tests
    #[test]
    fn test_range_unset() {
        assert!(TimeRange::unset().is_unset());
        assert!(!TimeRange::new(t(9, 0), t(10, 0)).is_unset());
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(TimeRange::new(t(9, 0), t(10, 15)).duration_label(), "1 h 15 m");
        assert_eq!(TimeRange::new(t(9, 0), t(11, 0)).duration_label(), "2 h 00 m");
        assert_eq!(TimeRange::new(t(9, 0), t(9, 45)).duration_label(), "0 h 45 m");
    }

    #[test]
    fn test_to_local_strings() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let (start, end) = TimeRange::new(t(9, 15), t(10, 15)).to_local_strings(date);
        assert_eq!(start, "2025-03-07T09:15:00");
        assert_eq!(end, "2025-03-07T10:15:00");
    }

    // WorkingHours tests
    #[test]
    fn test_working_hours_default() {
        let hours = WorkingHours::default();
        assert_eq!(hours.min_time, t(8, 0));
        assert_eq!(hours.max_time, t(22, 0));
        assert_eq!(hours.span_minutes(), 14 * 60);
    }

    #[test]
    fn test_working_hours_rejects_inverted() {
        assert!(WorkingHours::new(t(10, 0), t(9, 0)).is_err());
        assert!(WorkingHours::new(t(10, 0), t(10, 0)).is_err());
    }

    #[test]
    fn test_is_outside() {
        let hours = WorkingHours::default();
        assert!(hours.is_outside(t(7, 59)));
        assert!(!hours.is_outside(t(8, 0)));
        assert!(!hours.is_outside(t(21, 59)));
        assert!(hours.is_outside(t(22, 0)));
    }

    #[test]
    fn test_closed_for_booking_near_close() {
        let hours = WorkingHours::default();
        assert_eq!(hours.latest_start(), t(21, 45));
        assert!(!hours.is_closed_for_booking(t(21, 45)));
        assert!(hours.is_closed_for_booking(t(21, 46)));
        assert!(hours.is_closed_for_booking(t(21, 59)));
        assert!(hours.is_closed_for_booking(t(7, 0)));
        assert!(!hours.is_closed_for_booking(t(8, 0)));
    }

    #[test]
    fn test_rounded_now() {
        let hours = WorkingHours::default();
        assert_eq!(hours.rounded_now(t(9, 7)), t(9, 15));
        assert_eq!(hours.rounded_now(t(6, 30)), t(8, 0));
        assert_eq!(hours.rounded_now(t(21, 50)), t(22, 0));
        assert_eq!(hours.rounded_now(t(23, 10)), t(22, 0));
    }

    #[test]
    fn test_end_after() {
        let hours = WorkingHours::default();
        assert_eq!(hours.end_after(t(9, 15), 60), t(10, 15));
        assert_eq!(hours.end_after(t(21, 30), 60), t(22, 0));
    }

    // Date-time helpers
    #[test]
    fn test_parse_local() {
        let dt = parse_local("2025-03-07T09:15:00").unwrap();
        assert_eq!(TimeOfDay::from_naive(dt.time()), t(9, 15));
        assert!(parse_local("2025-03-07T09:15").is_ok());
        assert!(parse_local("2025-03-07T09:15:00.123").is_ok());
        assert!(parse_local("yesterday").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert!(parse_date("31.12.2025").is_err());
    }
}
