use serde::{Deserialize, Serialize};

use crate::time::WorkingHours;

/// Tunables shared by the booking page state machines.
///
/// Every field has a default so the shell may pass partial JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingConfig {
    pub working_hours: WorkingHours,
    /// Quiet period before a changed time range triggers a fetch
    pub debounce_ms: u64,
    /// Maximum number of toasts visible at once
    pub toast_limit: usize,
    /// Maximum gap between two taps counted as a double tap
    pub double_tap_ms: u64,
    /// Widths at or below this are laid out as mobile
    pub mobile_breakpoint_px: f64,
    pub popover: PopoverTimings,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            debounce_ms: 500,
            toast_limit: 2,
            double_tap_ms: 300,
            mobile_breakpoint_px: 768.0,
            popover: PopoverTimings::default(),
        }
    }
}

impl BookingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_hours(mut self, hours: WorkingHours) -> Self {
        self.working_hours = hours;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_toast_limit(mut self, limit: usize) -> Self {
        self.toast_limit = limit.max(1);
        self
    }
}

/// Staged enter/exit delays of the seat popover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopoverTimings {
    pub mount_delay_ms: u64,
    pub close_delay_ms: u64,
    pub success_close_ms: u64,
}

impl Default for PopoverTimings {
    fn default() -> Self {
        Self {
            mount_delay_ms: 10,
            close_delay_ms: 300,
            success_close_ms: 1000,
        }
    }
}
