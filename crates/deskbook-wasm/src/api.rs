use deskbook_core::state::{
    route_pointer, Breakpoint, ClickTarget, Handle, HitRouter, LocalNow, PointerEvent, Rect,
    RequestTicket, TimePreset, ZoneShortcut,
};
use deskbook_core::{
    parse_local, BookingConfig, BookingPageState, DeskbookError, FreePlace, TimeOfDay, TimeRange,
    ToastId,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Z-index of the seat layer in the hit table
const SEAT_LAYER_Z: i32 = 10;

/// Booking page engine exposed to JavaScript
#[wasm_bindgen]
pub struct BookingEngine {
    page: BookingPageState,
    router: HitRouter,
    /// Last clock reading pushed by the shell
    now: LocalNow,
}

/// Structured error object for JavaScript
#[derive(Serialize)]
pub struct JsDeskbookError {
    code: String,
    message: String,
}

impl From<DeskbookError> for JsDeskbookError {
    fn from(err: DeskbookError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl JsDeskbookError {
    pub(crate) fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }

    pub(crate) fn from_error<E: std::fmt::Display>(err: E) -> JsValue {
        let error = Self {
            code: "ERROR".to_string(),
            message: err.to_string(),
        };
        serde_wasm_bindgen::to_value(&error).unwrap_or(JsValue::NULL)
    }
}

pub(crate) fn to_js_error(err: DeskbookError) -> JsValue {
    let js_error = JsDeskbookError::from(err);
    serde_wasm_bindgen::to_value(&js_error).unwrap_or(JsValue::NULL)
}

/// Free-place query handed to the shell together with its ticket
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    pub ticket: u64,
    pub start: String,
    pub end: String,
}

/// Toast push result for JavaScript
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastPushData {
    pub id: ToastId,
    pub evicted: Option<ToastId>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn parse_handle(handle: &str) -> Option<Handle> {
    match handle {
        "start" => Some(Handle::Start),
        "end" => Some(Handle::End),
        _ => None,
    }
}

fn parse_preset(name: &str) -> Option<TimePreset> {
    serde_json::from_value(serde_json::Value::from(name)).ok()
}

impl BookingEngine {
    /// Engine seeded from a local `YYYY-MM-DDTHH:MM:SS` reading
    pub fn try_new(config: BookingConfig, now_local: &str, now_ms: u64) -> Result<Self, DeskbookError> {
        let now = LocalNow::from_naive(parse_local(now_local)?, now_ms);
        let page = BookingPageState::new(config, now);
        let mut router = HitRouter::new();
        router.register_seats(&page.seats(), SEAT_LAYER_Z);
        Ok(Self { page, router, now })
    }

    pub fn page(&self) -> &BookingPageState {
        &self.page
    }

    fn update_clock(&mut self, now_local: &str, now_ms: u64) -> Result<(), DeskbookError> {
        self.now = LocalNow::from_naive(parse_local(now_local)?, now_ms);
        Ok(())
    }

    fn query_json(ticket: RequestTicket, start: String, end: String) -> String {
        to_json(&QueryData {
            ticket: ticket.value(),
            start,
            end,
        })
    }

    fn apply_free_places_json(&mut self, ticket: u64, free_json: &str) -> Result<bool, serde_json::Error> {
        let ticket: RequestTicket = serde_json::from_value(serde_json::Value::from(ticket))?;
        let free: Vec<FreePlace> = serde_json::from_str(free_json)?;
        Ok(self.page.apply_free_places(ticket, &free))
    }
}

#[wasm_bindgen]
impl BookingEngine {
    /// Create the engine; `now_local` is the browser's local wall clock
    #[wasm_bindgen(constructor)]
    pub fn new(now_local: &str, now_ms: f64) -> Result<BookingEngine, JsValue> {
        Self::try_new(BookingConfig::default(), now_local, now_ms as u64).map_err(to_js_error)
    }

    /// Create the engine with a JSON `BookingConfig`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str, now_local: &str, now_ms: f64) -> Result<BookingEngine, JsValue> {
        let config: BookingConfig =
            serde_json::from_str(config_json).map_err(JsDeskbookError::from_error)?;
        Self::try_new(config, now_local, now_ms as u64).map_err(to_js_error)
    }

    /// Push the current clock; call before every interaction and timer tick
    #[wasm_bindgen(js_name = setClock)]
    pub fn set_clock(&mut self, now_local: &str, now_ms: f64) -> Result<(), JsValue> {
        self.update_clock(now_local, now_ms as u64).map_err(to_js_error)
    }

    /// Re-evaluate the slider against the clock; returns the range as JSON
    #[wasm_bindgen(js_name = tickClock)]
    pub fn tick_clock(&mut self) -> String {
        to_json(&self.page.tick_clock(self.now))
    }

    // --- Page state ---

    #[wasm_bindgen]
    pub fn snapshot(&self) -> String {
        to_json(&self.page.snapshot())
    }

    #[wasm_bindgen(js_name = getSeats)]
    pub fn get_seats(&self) -> String {
        to_json(&self.page.seats())
    }

    #[wasm_bindgen(js_name = getPresets)]
    pub fn get_presets(&self) -> String {
        to_json(&self.page.presets(self.now.time))
    }

    #[wasm_bindgen(js_name = getMarkers)]
    pub fn get_markers(&self) -> String {
        to_json(&self.page.slider.markers())
    }

    #[wasm_bindgen(js_name = getToasts)]
    pub fn get_toasts(&self) -> String {
        to_json(&self.page.toasts.active().collect::<Vec<_>>())
    }

    #[wasm_bindgen(js_name = dismissToast)]
    pub fn dismiss_toast(&mut self, id: f64) -> bool {
        self.page.toasts.dismiss(id as ToastId)
    }

    // --- Date and time range ---

    #[wasm_bindgen(js_name = pickToday)]
    pub fn pick_today(&mut self) {
        self.page.pick_today(self.now);
    }

    #[wasm_bindgen(js_name = pickTomorrow)]
    pub fn pick_tomorrow(&mut self) {
        self.page.pick_tomorrow(self.now);
    }

    /// Date input change; past or unparseable values fall back to today
    #[wasm_bindgen(js_name = setDate)]
    pub fn set_date(&mut self, value: &str) {
        self.page.set_date_str(value, self.now);
    }

    /// Set the range in minutes since midnight; returns the accepted range
    #[wasm_bindgen(js_name = setRange)]
    pub fn set_range(&mut self, start_minutes: u32, end_minutes: u32) -> String {
        let range = TimeRange::new(
            TimeOfDay::from_minutes(start_minutes),
            TimeOfDay::from_minutes(end_minutes),
        );
        to_json(&self.page.set_range(range, self.now))
    }

    /// Apply a quick-pick (`morning`, `day`, `fullDay`, `evening`)
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&mut self, name: &str) -> String {
        let range = parse_preset(name).and_then(|preset| self.page.apply_preset(preset, self.now));
        to_json(&range)
    }

    #[wasm_bindgen(js_name = sliderBegin)]
    pub fn slider_begin(&mut self, handle: &str) -> bool {
        parse_handle(handle).is_some_and(|handle| self.page.begin_slider_drag(handle))
    }

    #[wasm_bindgen(js_name = sliderDrag)]
    pub fn slider_drag(&mut self, px: f64, width: f64) -> String {
        to_json(&self.page.slider_drag_to(px, width, self.now))
    }

    #[wasm_bindgen(js_name = sliderEnd)]
    pub fn slider_end(&mut self) {
        self.page.end_slider_drag();
    }

    // --- Map ---

    /// Register the on-map control panel so presses on it do not pan
    #[wasm_bindgen(js_name = registerControls)]
    pub fn register_controls(&mut self, x: f64, y: f64, width: f64, height: f64, z_index: i32) {
        self.router
            .register_controls(Rect::new(x, y, width, height), z_index);
    }

    /// Route a JSON pointer event; returns the resulting map action as JSON
    #[wasm_bindgen]
    pub fn pointer(&mut self, event_json: &str) -> Result<String, JsValue> {
        let event: PointerEvent =
            serde_json::from_str(event_json).map_err(JsDeskbookError::from_error)?;
        let action = route_pointer(&mut self.page.viewport, &self.router, &event);
        Ok(to_json(&action))
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.page.viewport.zoom_in();
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.page.viewport.zoom_out();
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.page.viewport.reset();
    }

    #[wasm_bindgen(js_name = toggleFilters)]
    pub fn toggle_filters(&mut self) -> bool {
        self.page.viewport.toggle_filters()
    }

    /// Jump to a zone (`A`..`E`), `coffee` or `all`
    #[wasm_bindgen(js_name = moveToZone)]
    pub fn move_to_zone(&mut self, shortcut: &str, view_width: f64) -> Result<(), JsValue> {
        let shortcut: ZoneShortcut = shortcut.parse().map_err(to_js_error)?;
        let breakpoint =
            Breakpoint::from_width_with(view_width, self.page.config().mobile_breakpoint_px);
        self.page.viewport.move_to_zone(shortcut, breakpoint);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn transform(&self) -> String {
        self.page.viewport.transform()
    }

    #[wasm_bindgen]
    pub fn cursor(&self) -> String {
        self.page.viewport.cursor().to_string()
    }

    // --- Free places ---

    /// Debounced query due at the current clock, or `null`
    #[wasm_bindgen(js_name = takeQuery)]
    pub fn take_query(&mut self) -> String {
        match self.page.poll_query(self.now.ms) {
            Some((ticket, query)) => Self::query_json(ticket, query.start, query.end),
            None => "null".to_string(),
        }
    }

    /// Query for the current window, bypassing the debounce
    #[wasm_bindgen(js_name = refreshQuery)]
    pub fn refresh_query(&mut self) -> String {
        let (ticket, query) = self.page.refresh_query();
        Self::query_json(ticket, query.start, query.end)
    }

    /// Apply a free-place answer; stale tickets are ignored
    #[wasm_bindgen(js_name = setFreePlaces)]
    pub fn set_free_places(&mut self, ticket: f64, free_json: &str) -> Result<bool, JsValue> {
        self.apply_free_places_json(ticket as u64, free_json)
            .map_err(JsDeskbookError::from_error)
    }

    // --- Popover ---

    /// Seat glyph click; returns the click outcome as JSON
    #[wasm_bindgen(js_name = clickSeat)]
    pub fn click_seat(&mut self, name: &str, is_admin: bool) -> Result<String, JsValue> {
        let click = self
            .page
            .click_seat(name, is_admin, self.now.ms)
            .map_err(to_js_error)?;
        Ok(to_json(&click))
    }

    #[wasm_bindgen(js_name = closePopover)]
    pub fn close_popover(&mut self) {
        self.page.close_popover(self.now.ms);
    }

    /// Document mouse-down; `target_json` is a `ClickTarget`
    #[wasm_bindgen(js_name = outsideClick)]
    pub fn outside_click(&mut self, target_json: &str) -> Result<bool, JsValue> {
        let target: ClickTarget =
            serde_json::from_str(target_json).map_err(JsDeskbookError::from_error)?;
        Ok(self.page.outside_click(&target, self.now.ms))
    }

    /// Fire due popover transitions; returns the phase or `null`
    #[wasm_bindgen]
    pub fn advance(&mut self) -> String {
        to_json(&self.page.advance(self.now.ms))
    }

    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.page.next_deadline().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = getPopover)]
    pub fn get_popover(&self) -> String {
        to_json(&self.page.popover())
    }

    // --- Booking ---

    /// Booking request for the open popover, or `null` when it refuses
    #[wasm_bindgen(js_name = beginBooking)]
    pub fn begin_booking(&mut self) -> String {
        to_json(&self.page.begin_booking())
    }

    #[wasm_bindgen(js_name = bookingSucceeded)]
    pub fn booking_succeeded(&mut self) -> String {
        let push = self.page.booking_succeeded(self.now.ms);
        to_json(&ToastPushData {
            id: push.id,
            evicted: push.evicted,
        })
    }

    #[wasm_bindgen(js_name = bookingFailed)]
    pub fn booking_failed(&mut self, message: &str) -> String {
        let push = self.page.booking_failed(message);
        to_json(&ToastPushData {
            id: push.id,
            evicted: push.evicted,
        })
    }
}
