use serde::{Deserialize, Serialize};

use crate::time::{round_minutes_to_quarter, TimeOfDay, TimeRange, WorkingHours, QUARTER_MINUTES};

/// Length of a freshly seeded or pushed-out range
pub const DEFAULT_SPAN_MINUTES: u32 = 60;

/// Range offered for dates other than today
pub const DEFAULT_RANGE: TimeRange = TimeRange::new(TimeOfDay::new(9, 0), TimeOfDay::new(10, 0));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Start,
    End,
}

/// Tick on the slider scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMarker {
    pub label: String,
    pub percent: f64,
    pub is_hour: bool,
}

/// Dual-handle selector over the working day in quarter-hour steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeSlider {
    hours: WorkingHours,
    range: TimeRange,
    is_today: bool,
    disabled: bool,
    outside_hours: bool,
    dragging: Option<Handle>,
}

impl Default for TimeRangeSlider {
    fn default() -> Self {
        Self::new(WorkingHours::default())
    }
}

impl TimeRangeSlider {
    pub fn new(hours: WorkingHours) -> Self {
        Self {
            hours,
            range: TimeRange::unset(),
            is_today: true,
            disabled: false,
            outside_hours: false,
            dragging: None,
        }
    }

    pub fn hours(&self) -> WorkingHours {
        self.hours
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn is_today(&self) -> bool {
        self.is_today
    }

    pub fn is_outside_working_hours(&self) -> bool {
        self.outside_hours
    }

    pub fn dragging(&self) -> Option<Handle> {
        self.dragging
    }

    /// Text selection is suppressed only while a handle is held
    pub fn text_selection_enabled(&self) -> bool {
        self.dragging.is_none()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.dragging = None;
        }
    }

    /// Assign a range from outside (presets, date changes) and re-assert the rules
    pub fn set_range(&mut self, range: TimeRange, now: TimeOfDay) -> TimeRange {
        self.range = range;
        self.reconcile(now)
    }

    pub fn set_today(&mut self, is_today: bool, now: TimeOfDay) -> TimeRange {
        self.is_today = is_today;
        self.reconcile(now)
    }

    // Coordinate mapping

    /// Position of `time` along the scale, 0–100
    pub fn time_to_percent(&self, time: TimeOfDay) -> f64 {
        let offset = time.minutes() as f64 - self.hours.min_time.minutes() as f64;
        (offset / self.hours.span_minutes() as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn percent_to_pixels(percent: f64, width: f64) -> f64 {
        percent / 100.0 * width
    }

    pub fn time_to_pixels(&self, time: TimeOfDay, width: f64) -> f64 {
        Self::percent_to_pixels(self.time_to_percent(time), width)
    }

    /// Nearest quarter hour for a pixel offset, clamped into working hours
    pub fn position_to_time(&self, px: f64, width: f64) -> TimeOfDay {
        if width <= 0.0 || px.is_nan() {
            return self.hours.min_time;
        }
        let percent = (px.clamp(0.0, width) / width).clamp(0.0, 1.0);
        let min = self.hours.min_time.minutes() as f64;
        let total = min + percent * self.hours.span_minutes() as f64;
        let rounded = round_minutes_to_quarter(total);
        self.hours.clamp(TimeOfDay::from_minutes(rounded))
    }

    fn minutes_to_pixels(&self, minutes: f64, width: f64) -> f64 {
        (minutes / self.hours.span_minutes() as f64) * width
    }

    // Drag protocol

    /// Grab a handle; refused while disabled or outside working hours
    pub fn begin_drag(&mut self, handle: Handle) -> bool {
        if self.disabled || self.outside_hours {
            return false;
        }
        self.dragging = Some(handle);
        true
    }

    /// Move the held handle to `px` on a track `width` pixels wide
    pub fn drag_to(&mut self, px: f64, width: f64, now: TimeOfDay) -> Option<TimeRange> {
        let handle = self.dragging?;
        if self.disabled || self.outside_hours || width <= 0.0 {
            return None;
        }
        let min_minutes = self.hours.min_time.minutes();
        let quarter_px = self.minutes_to_pixels(QUARTER_MINUTES as f64, width);

        match handle {
            Handle::Start => {
                let effective_min = if self.is_today {
                    now.minutes().max(min_minutes)
                } else {
                    min_minutes
                };
                let effective_min_px =
                    self.minutes_to_pixels((effective_min - min_minutes) as f64, width);
                let max_allowed = self.time_to_pixels(self.range.end, width) - quarter_px;
                let limited = px.max(effective_min_px).min(max_allowed);
                self.range.start = self.position_to_time(limited, width);
            }
            Handle::End => {
                let min_allowed = self.time_to_pixels(self.range.start, width) + quarter_px;
                let limited = px.min(width).max(min_allowed);
                let end = self.position_to_time(limited, width);
                self.range.end = end.min(self.hours.max_time);
            }
        }
        Some(self.reconcile(now))
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    // Reconciliation

    /// Fill an unset `00:00–00:00` pair
    fn seed(&mut self, now: TimeOfDay) {
        self.range = if !self.is_today {
            DEFAULT_RANGE
        } else if self.outside_hours {
            let start = self.hours.min_time;
            TimeRange::new(start, self.hours.end_after(start, DEFAULT_SPAN_MINUTES))
        } else {
            let start = self.hours.rounded_now(now);
            TimeRange::new(start, self.hours.end_after(start, DEFAULT_SPAN_MINUTES))
        };
    }

    /// Re-assert every range rule after a change; returns the resulting range
    pub fn reconcile(&mut self, now: TimeOfDay) -> TimeRange {
        self.outside_hours = self.is_today && self.hours.is_closed_for_booking(now);
        if self.outside_hours {
            self.dragging = None;
        }

        if self.range.is_unset() {
            self.seed(now);
        }

        let mut start = self.hours.clamp(self.range.start);
        let mut end = self.hours.clamp(self.range.end);

        if self.is_today && !self.outside_hours {
            let floor = self.hours.rounded_now(now);
            start = start.max(floor);
            end = end.max(floor);
        }
        start = start.min(self.hours.latest_start());
        if end.minutes() < start.minutes() + QUARTER_MINUTES {
            end = self.hours.end_after(start, DEFAULT_SPAN_MINUTES);
        }

        self.range = TimeRange::new(start, end);
        self.range
    }

    // Display helpers

    pub fn duration_label(&self) -> String {
        self.range.duration_label()
    }

    /// Whether `time` may be picked on the current day
    pub fn is_time_available(&self, time: TimeOfDay, now: TimeOfDay) -> bool {
        if !self.is_today {
            return true;
        }
        time >= self.hours.rounded_now(now) && self.hours.contains(time)
    }

    /// Hour and half-hour ticks across the working day
    pub fn markers(&self) -> Vec<TimeMarker> {
        let max = self.hours.max_time;
        let mut markers = Vec::new();
        for hour in self.hours.min_time.hour..=max.hour {
            markers.push(TimeMarker {
                label: format!("{}:00", hour),
                percent: self.time_to_percent(TimeOfDay::new(hour, 0)),
                is_hour: true,
            });
            if hour < max.hour || max.minute >= 30 {
                markers.push(TimeMarker {
                    label: format!("{}:30", hour),
                    percent: self.time_to_percent(TimeOfDay::new(hour, 30)),
                    is_hour: false,
                });
            }
        }
        markers
    }
}
