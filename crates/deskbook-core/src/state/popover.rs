use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timer::ScheduledTimers;
use crate::config::PopoverTimings;
use crate::seat::Seat;
use crate::time::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoverPhase {
    /// Rendered but the enter transition has not started
    Mounting,
    Open,
    /// Exit transition running
    Closing,
    Closed,
}

/// State of the popover's booking request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PopoverEvent {
    Mounted,
    AutoClose,
    Unmount,
}

/// Where a document-level mouse-down landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seat", rename_all = "camelCase")]
pub enum ClickTarget {
    InsidePopover,
    Seat(String),
    Elsewhere,
}

/// Contextual panel for the selected seat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPopover {
    seat: Seat,
    date: NaiveDate,
    range: TimeRange,
    phase: PopoverPhase,
    status: RequestStatus,
    error: Option<String>,
    outside_hours: bool,
    timings: PopoverTimings,
    #[serde(skip)]
    timers: ScheduledTimers<PopoverEvent>,
}

impl SeatPopover {
    /// Mount the popover; the enter transition starts after the mount delay
    pub fn open(
        seat: Seat,
        date: NaiveDate,
        range: TimeRange,
        outside_hours: bool,
        timings: PopoverTimings,
        now_ms: u64,
    ) -> Self {
        let mut timers = ScheduledTimers::new();
        timers.schedule(now_ms, timings.mount_delay_ms, PopoverEvent::Mounted);
        Self {
            seat,
            date,
            range,
            phase: PopoverPhase::Mounting,
            status: RequestStatus::Idle,
            error: None,
            outside_hours,
            timings,
            timers,
        }
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn phase(&self) -> PopoverPhase {
        self.phase
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn title(&self) -> &'static str {
        self.seat.zone.title()
    }

    pub fn description(&self) -> &'static str {
        self.seat.zone.description()
    }

    /// Entered the visible state (drives the CSS enter transition)
    pub fn is_mounted(&self) -> bool {
        self.phase != PopoverPhase::Mounting
    }

    pub fn is_closed(&self) -> bool {
        self.phase == PopoverPhase::Closed
    }

    pub fn is_outside_hours(&self) -> bool {
        self.outside_hours
    }

    /// Keep the shown window in sync with the page
    pub fn set_window(&mut self, date: NaiveDate, range: TimeRange, outside_hours: bool) {
        self.date = date;
        self.range = range;
        self.outside_hours = outside_hours;
    }

    /// Whether the book button is enabled
    pub fn can_book(&self) -> bool {
        !self.outside_hours
            && self.range.is_valid()
            && self.status != RequestStatus::Loading
            && matches!(self.phase, PopoverPhase::Mounting | PopoverPhase::Open)
    }

    /// Earliest pending transition, for the shell's next wake-up
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Fire due transitions; returns the resulting phase
    pub fn advance(&mut self, now_ms: u64) -> PopoverPhase {
        for event in self.timers.fire_due(now_ms) {
            match event {
                PopoverEvent::Mounted => {
                    if self.phase == PopoverPhase::Mounting {
                        self.phase = PopoverPhase::Open;
                    }
                }
                PopoverEvent::AutoClose => self.request_close(now_ms),
                PopoverEvent::Unmount => {
                    self.phase = PopoverPhase::Closed;
                    self.timers.cancel_all();
                }
            }
        }
        self.phase
    }

    /// Start a booking request; refused outside working hours or while one is in flight
    pub fn begin_booking(&mut self) -> bool {
        if !self.can_book() {
            return false;
        }
        self.status = RequestStatus::Loading;
        self.error = None;
        true
    }

    /// The request succeeded: show the confirmation, then close on a timer
    pub fn booking_succeeded(&mut self, now_ms: u64) {
        if self.status != RequestStatus::Loading {
            return;
        }
        self.status = RequestStatus::Success;
        self.timers
            .schedule(now_ms, self.timings.success_close_ms, PopoverEvent::AutoClose);
    }

    /// The request failed: show the error and re-enable the button
    pub fn booking_failed(&mut self, message: impl Into<String>) {
        if self.status != RequestStatus::Loading {
            return;
        }
        self.status = RequestStatus::Error;
        self.error = Some(message.into());
    }

    /// Begin the exit transition; repeated requests keep the first deadline
    pub fn request_close(&mut self, now_ms: u64) {
        if matches!(self.phase, PopoverPhase::Closing | PopoverPhase::Closed) {
            return;
        }
        self.phase = PopoverPhase::Closing;
        self.timers
            .schedule(now_ms, self.timings.close_delay_ms, PopoverEvent::Unmount);
    }

    /// Document mouse-down; closes unless it hit the popover or its own seat
    pub fn outside_click(&mut self, target: &ClickTarget, now_ms: u64) -> bool {
        let keep = match target {
            ClickTarget::InsidePopover => true,
            ClickTarget::Seat(name) => *name == self.seat.name,
            ClickTarget::Elsewhere => false,
        };
        if keep {
            return false;
        }
        self.request_close(now_ms);
        true
    }

    /// Unmount immediately, cancelling every pending transition
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.phase = PopoverPhase::Closed;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FreePlace;
    use crate::seat::FloorPlan;
    use crate::time::TimeOfDay;

    fn popover(outside_hours: bool) -> SeatPopover {
        let mut plan = FloorPlan::new();
        plan.apply_free_places(&[FreePlace::new("B2")]);
        SeatPopover::open(
            plan.seat("B2").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            TimeRange::new(TimeOfDay::new(9, 0), TimeOfDay::new(10, 0)),
            outside_hours,
            PopoverTimings::default(),
            1_000,
        )
    }

    // Lifecycle tests
    #[test]
    fn test_mount_after_delay() {
        let mut pop = popover(false);
        assert!(!pop.is_mounted());
        assert_eq!(pop.advance(1_005), PopoverPhase::Mounting);
        assert_eq!(pop.advance(1_010), PopoverPhase::Open);
        assert!(pop.is_mounted());
        assert_eq!(pop.title(), "Private office");
    }

    #[test]
    fn test_close_transition() {
        let mut pop = popover(false);
        pop.advance(1_010);
        pop.request_close(2_000);
        assert_eq!(pop.phase(), PopoverPhase::Closing);
        assert_eq!(pop.advance(2_299), PopoverPhase::Closing);
        assert_eq!(pop.advance(2_300), PopoverPhase::Closed);
    }

    #[test]
    fn test_repeated_close_keeps_first_deadline() {
        let mut pop = popover(false);
        pop.request_close(2_000);
        pop.request_close(2_200);
        assert_eq!(pop.advance(2_300), PopoverPhase::Closed);
    }

    // Booking tests
    #[test]
    fn test_booking_success_auto_closes() {
        let mut pop = popover(false);
        pop.advance(1_010);
        assert!(pop.begin_booking());
        assert!(!pop.can_book());
        assert!(!pop.begin_booking());

        pop.booking_succeeded(1_500);
        assert_eq!(pop.status(), RequestStatus::Success);
        assert_eq!(pop.advance(2_499), PopoverPhase::Open);
        assert_eq!(pop.advance(2_500), PopoverPhase::Closing);
        assert_eq!(pop.advance(2_800), PopoverPhase::Closed);
    }

    #[test]
    fn test_booking_error_stays_open() {
        let mut pop = popover(false);
        pop.advance(1_010);
        pop.begin_booking();
        pop.booking_failed("Seat already booked");

        assert_eq!(pop.status(), RequestStatus::Error);
        assert_eq!(pop.error(), Some("Seat already booked"));
        assert!(pop.can_book());
        assert_eq!(pop.advance(60_000), PopoverPhase::Open);
    }

    #[test]
    fn test_outside_hours_blocks_booking() {
        let mut pop = popover(true);
        pop.advance(1_010);
        assert!(!pop.can_book());
        assert!(!pop.begin_booking());
        assert_eq!(pop.status(), RequestStatus::Idle);
    }

    #[test]
    fn test_result_without_request_is_ignored() {
        let mut pop = popover(false);
        pop.booking_succeeded(1_100);
        pop.booking_failed("x");
        assert_eq!(pop.status(), RequestStatus::Idle);
        assert_eq!(pop.pending_timers(), 1);
    }

    // Outside click tests
    #[test]
    fn test_outside_click_rules() {
        let mut pop = popover(false);
        pop.advance(1_010);
        assert!(!pop.outside_click(&ClickTarget::InsidePopover, 1_100));
        assert!(!pop.outside_click(&ClickTarget::Seat("B2".into()), 1_100));
        assert_eq!(pop.phase(), PopoverPhase::Open);

        assert!(pop.outside_click(&ClickTarget::Seat("B3".into()), 1_100));
        assert_eq!(pop.phase(), PopoverPhase::Closing);
    }

    // Teardown tests
    #[test]
    fn test_teardown_cancels_pending_transitions() {
        let mut pop = popover(false);
        pop.advance(1_010);
        pop.begin_booking();
        pop.booking_succeeded(1_100);
        assert_eq!(pop.pending_timers(), 1);

        pop.teardown();
        assert_eq!(pop.pending_timers(), 0);
        assert_eq!(pop.next_deadline(), None);
        assert_eq!(pop.advance(10_000), PopoverPhase::Closed);
    }

    #[test]
    fn test_teardown_before_mount() {
        let mut pop = popover(false);
        pop.teardown();
        assert_eq!(pop.advance(1_010), PopoverPhase::Closed);
        assert!(pop.is_closed());
    }
}
