use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::debounce::{Debouncer, RequestSequence, RequestTicket};
use super::input::{dispatch_seat_click, SeatClick};
use super::popover::{ClickTarget, PopoverPhase, SeatPopover};
use super::slider::{Handle, TimeRangeSlider, DEFAULT_RANGE, DEFAULT_SPAN_MINUTES};
use super::viewport::MapViewport;
use crate::config::BookingConfig;
use crate::error::DeskbookError;
use crate::models::{BookingRequest, FreePlace};
use crate::seat::{FloorPlan, Seat};
use crate::time::{parse_date, TimeOfDay, TimeRange, WorkingHours};
use crate::toast::{ToastManager, ToastPush};

pub const BOOKED_MESSAGE: &str = "Booked successfully";

/// Wall-clock reading handed in by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalNow {
    pub today: NaiveDate,
    pub time: TimeOfDay,
    /// Monotonic milliseconds, used for debounce and popover timers
    pub ms: u64,
}

impl LocalNow {
    pub fn new(today: NaiveDate, time: TimeOfDay, ms: u64) -> Self {
        Self { today, time, ms }
    }

    pub fn from_naive(now: NaiveDateTime, ms: u64) -> Self {
        Self {
            today: now.date(),
            time: TimeOfDay::from_naive(now.time()),
            ms,
        }
    }

    pub fn tomorrow(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(1))
            .unwrap_or(self.today)
    }
}

/// Quick-pick windows shown under the slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimePreset {
    Morning,
    Day,
    FullDay,
    Evening,
}

impl TimePreset {
    /// Button order
    pub const ALL: [TimePreset; 4] = [
        TimePreset::Morning,
        TimePreset::Day,
        TimePreset::FullDay,
        TimePreset::Evening,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimePreset::Morning => "Morning",
            TimePreset::Day => "Day",
            TimePreset::FullDay => "Full day",
            TimePreset::Evening => "Evening",
        }
    }

    /// The window on a day other than today
    pub fn window(&self, hours: WorkingHours) -> TimeRange {
        match self {
            TimePreset::Morning => TimeRange::new(TimeOfDay::new(8, 0), TimeOfDay::new(12, 0)),
            TimePreset::Day => TimeRange::new(TimeOfDay::new(12, 0), TimeOfDay::new(17, 0)),
            TimePreset::FullDay => TimeRange::new(hours.min_time, hours.max_time),
            TimePreset::Evening => TimeRange::new(TimeOfDay::new(17, 0), hours.max_time),
        }
    }

    /// The window to assign; on today the start moves up to the rounded now
    pub fn range(&self, hours: WorkingHours, is_today: bool, now: TimeOfDay) -> TimeRange {
        let window = self.window(hours);
        if !is_today {
            return window;
        }
        let current = hours.rounded_now(now);
        let start = match self {
            TimePreset::FullDay => current,
            _ => current.max(window.start),
        };
        TimeRange::new(start, window.end)
    }

    pub fn is_available(
        &self,
        hours: WorkingHours,
        is_today: bool,
        outside_hours: bool,
        now: TimeOfDay,
    ) -> bool {
        if outside_hours {
            return false;
        }
        if !is_today {
            return true;
        }
        let now = now.minutes();
        let max = hours.max_time.minutes();
        match self {
            TimePreset::Morning => now < 12 * 60 && now < max,
            TimePreset::Day => now < 17 * 60 && now < max,
            TimePreset::FullDay => now + 30 < max,
            TimePreset::Evening => now + 15 < max,
        }
    }
}

/// Render model for one preset button
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetButton {
    pub preset: TimePreset,
    pub label: &'static str,
    pub available: bool,
    pub active: bool,
}

/// Query string of `/api/place/free`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreePlacesQuery {
    pub start: String,
    pub end: String,
}

impl FreePlacesQuery {
    pub fn new(date: NaiveDate, range: TimeRange) -> Self {
        let (start, end) = range.to_local_strings(date);
        Self { start, end }
    }
}

/// What the page view needs besides the seats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub selected_date: NaiveDate,
    pub time_range: TimeRange,
    pub is_today: bool,
    pub is_outside_working_hours: bool,
    pub duration_label: String,
    pub selected_seat: Option<Seat>,
    pub free_count: usize,
    pub transform: String,
    pub popover_open: bool,
}

/// The booking page: the only holder of cross-cutting booking state
#[derive(Debug, Clone)]
pub struct BookingPageState {
    config: BookingConfig,
    selected_date: NaiveDate,
    selected_seat: Option<Seat>,
    floor_plan: FloorPlan,
    popover: Option<SeatPopover>,
    window: Debouncer<(NaiveDate, TimeRange)>,
    requests: RequestSequence,
    pub viewport: MapViewport,
    pub slider: TimeRangeSlider,
    pub toasts: ToastManager,
}

impl BookingPageState {
    /// Mount on today with the slider seeded from `now`
    pub fn new(config: BookingConfig, now: LocalNow) -> Self {
        let mut slider = TimeRangeSlider::new(config.working_hours);
        slider.set_today(true, now.time);
        Self {
            selected_date: now.today,
            selected_seat: None,
            floor_plan: FloorPlan::new(),
            popover: None,
            window: Debouncer::new(config.debounce_ms),
            requests: RequestSequence::new(),
            viewport: MapViewport::new().with_double_tap_ms(config.double_tap_ms as f64),
            slider,
            toasts: ToastManager::new(config.toast_limit),
            config,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn time_range(&self) -> TimeRange {
        self.slider.range()
    }

    pub fn is_today(&self) -> bool {
        self.slider.is_today()
    }

    pub fn is_outside_working_hours(&self) -> bool {
        self.slider.is_outside_working_hours()
    }

    pub fn selected_seat(&self) -> Option<&Seat> {
        self.selected_seat.as_ref()
    }

    pub fn floor_plan(&self) -> &FloorPlan {
        &self.floor_plan
    }

    pub fn seats(&self) -> Vec<Seat> {
        self.floor_plan.seats()
    }

    pub fn popover(&self) -> Option<&SeatPopover> {
        self.popover.as_ref()
    }

    // Date selection

    pub fn pick_today(&mut self, now: LocalNow) {
        self.set_date(now.today, now);
    }

    pub fn pick_tomorrow(&mut self, now: LocalNow) {
        self.set_date(now.tomorrow(), now);
    }

    /// Date input; past dates and unparseable text both fall back to today
    pub fn set_date_str(&mut self, value: &str, now: LocalNow) {
        let date = parse_date(value).unwrap_or(now.today);
        self.set_date(date, now);
    }

    pub fn set_date(&mut self, date: NaiveDate, now: LocalNow) {
        let date = date.max(now.today);
        let is_today = date == now.today;
        let is_tomorrow = date == now.tomorrow();
        self.selected_date = date;

        let hours = self.config.working_hours;
        let current = self.slider.range();
        let reseeded = if is_today {
            let floor = hours.rounded_now(now.time);
            (current.start < floor || current.start.hour == 0)
                .then(|| TimeRange::new(floor, hours.end_after(floor, DEFAULT_SPAN_MINUTES)))
        } else if is_tomorrow || current.start.hour == 0 || current.end.hour == 0 {
            Some(DEFAULT_RANGE)
        } else {
            None
        };

        self.slider.set_today(is_today, now.time);
        if let Some(range) = reseeded {
            self.slider.set_range(range, now.time);
        }
        self.window_changed(now.ms);
    }

    // Time selection

    pub fn set_range(&mut self, range: TimeRange, now: LocalNow) -> TimeRange {
        let range = self.slider.set_range(range, now.time);
        self.window_changed(now.ms);
        range
    }

    pub fn begin_slider_drag(&mut self, handle: Handle) -> bool {
        self.slider.begin_drag(handle)
    }

    pub fn slider_drag_to(&mut self, px: f64, width: f64, now: LocalNow) -> Option<TimeRange> {
        let range = self.slider.drag_to(px, width, now.time)?;
        self.window_changed(now.ms);
        Some(range)
    }

    pub fn end_slider_drag(&mut self) {
        self.slider.end_drag();
    }

    /// Re-check the range against a moving clock
    pub fn tick_clock(&mut self, now: LocalNow) -> TimeRange {
        let before = self.slider.range();
        let range = self.slider.reconcile(now.time);
        if range != before {
            self.window_changed(now.ms);
        }
        range
    }

    pub fn presets(&self, now: TimeOfDay) -> Vec<PresetButton> {
        let hours = self.config.working_hours;
        let is_today = self.is_today();
        let outside = self.is_outside_working_hours();
        let current = self.slider.range();
        TimePreset::ALL
            .iter()
            .map(|preset| PresetButton {
                preset: *preset,
                label: preset.label(),
                available: preset.is_available(hours, is_today, outside, now),
                active: preset.range(hours, is_today, now) == current,
            })
            .collect()
    }

    /// Assign a preset window; refused when the preset is unavailable
    pub fn apply_preset(&mut self, preset: TimePreset, now: LocalNow) -> Option<TimeRange> {
        let hours = self.config.working_hours;
        let is_today = self.is_today();
        if !preset.is_available(hours, is_today, self.is_outside_working_hours(), now.time) {
            return None;
        }
        Some(self.set_range(preset.range(hours, is_today, now.time), now))
    }

    fn window_changed(&mut self, now_ms: u64) {
        let date = self.selected_date;
        let range = self.slider.range();
        let outside = self.is_outside_working_hours();
        if let Some(popover) = self.popover.as_mut() {
            popover.set_window(date, range, outside);
        }
        self.window.push((date, range), now_ms);
    }

    // Free places

    /// Issue a query once the `(date, range)` pair has been stable for the debounce window
    pub fn poll_query(&mut self, now_ms: u64) -> Option<(RequestTicket, FreePlacesQuery)> {
        let (date, range) = self.window.poll(now_ms)?;
        Some((self.requests.next(), FreePlacesQuery::new(date, range)))
    }

    /// Query for the current window right away (mount, after booking)
    pub fn refresh_query(&mut self) -> (RequestTicket, FreePlacesQuery) {
        self.window.push((self.selected_date, self.slider.range()), 0);
        self.window.flush();
        (
            self.requests.next(),
            FreePlacesQuery::new(self.selected_date, self.slider.range()),
        )
    }

    /// Apply an answer; stale tickets are dropped and `false` returned
    pub fn apply_free_places(&mut self, ticket: RequestTicket, free: &[FreePlace]) -> bool {
        if !self.requests.accept(ticket) {
            return false;
        }
        self.floor_plan.apply_free_places(free);
        if let Some(seat) = self.selected_seat.as_mut() {
            if let Ok(fresh) = self.floor_plan.seat(&seat.name) {
                *seat = fresh;
            }
        }
        true
    }

    // Seats and popover

    /// Seat glyph click; a selectable seat opens the popover
    pub fn click_seat(
        &mut self,
        name: &str,
        is_admin: bool,
        now_ms: u64,
    ) -> Result<SeatClick, DeskbookError> {
        let seat = self.floor_plan.seat(name)?;
        let click = dispatch_seat_click(&seat, is_admin);
        if let SeatClick::Select(seat) = &click {
            if let Some(mut previous) = self.popover.take() {
                previous.teardown();
            }
            self.selected_seat = Some(seat.clone());
            self.popover = Some(SeatPopover::open(
                seat.clone(),
                self.selected_date,
                self.slider.range(),
                self.is_outside_working_hours(),
                self.config.popover,
                now_ms,
            ));
        }
        Ok(click)
    }

    pub fn close_popover(&mut self, now_ms: u64) {
        if let Some(popover) = self.popover.as_mut() {
            popover.request_close(now_ms);
        }
    }

    pub fn outside_click(&mut self, target: &ClickTarget, now_ms: u64) -> bool {
        self.popover
            .as_mut()
            .is_some_and(|popover| popover.outside_click(target, now_ms))
    }

    /// Fire popover transitions; the popover is dropped once closed
    pub fn advance(&mut self, now_ms: u64) -> Option<PopoverPhase> {
        let phase = self.popover.as_mut()?.advance(now_ms);
        if phase == PopoverPhase::Closed {
            self.popover = None;
        }
        Some(phase)
    }

    /// Earliest time the shell must call back in
    pub fn next_deadline(&self) -> Option<u64> {
        let popover = self.popover.as_ref().and_then(|p| p.next_deadline());
        match (self.window.deadline(), popover) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // Booking

    /// Start booking the selected seat; `None` when the popover refuses
    /// or the window is empty
    pub fn begin_booking(&mut self) -> Option<BookingRequest> {
        let popover = self.popover.as_mut()?;
        if !popover.range().is_valid() || !popover.begin_booking() {
            return None;
        }
        let (start_at, end_at) = popover.range().to_local_strings(popover.date());
        Some(BookingRequest {
            name: popover.seat().name.clone(),
            start_at,
            end_at,
        })
    }

    pub fn booking_succeeded(&mut self, now_ms: u64) -> ToastPush {
        if let Some(popover) = self.popover.as_mut() {
            popover.booking_succeeded(now_ms);
        }
        self.toasts.success(BOOKED_MESSAGE)
    }

    /// Surface the server's message in both the popover and a toast
    pub fn booking_failed(&mut self, message: &str) -> ToastPush {
        if let Some(popover) = self.popover.as_mut() {
            popover.booking_failed(message);
        }
        self.toasts.error(message)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            selected_date: self.selected_date,
            time_range: self.slider.range(),
            is_today: self.is_today(),
            is_outside_working_hours: self.is_outside_working_hours(),
            duration_label: self.slider.duration_label(),
            selected_seat: self.selected_seat.clone(),
            free_count: self.floor_plan.free_count(),
            transform: self.viewport.transform(),
            popover_open: self.popover.is_some(),
        }
    }
}
