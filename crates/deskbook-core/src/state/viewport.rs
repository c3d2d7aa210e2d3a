use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DeskbookError;
use crate::seat::Zone;

pub const MIN_SCALE: f64 = 0.8;
pub const MAX_SCALE: f64 = 2.0;
pub const MIN_X: f64 = -500.0;
pub const MAX_X: f64 = 500.0;
pub const MIN_Y: f64 = -300.0;
pub const MAX_Y: f64 = 300.0;
pub const WHEEL_STEP: f64 = 0.1;
pub const BUTTON_STEP: f64 = 0.2;
pub const DOUBLE_TAP_MS: f64 = 300.0;
/// Double-tapping at or above this scale resets instead of zooming
pub const DOUBLE_TAP_RESET_THRESHOLD: f64 = 1.8;
pub const DOUBLE_TAP_SCALE: f64 = 2.0;
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

/// A point in view-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

fn clamp_position(p: Point) -> Point {
    let x = if p.x.is_nan() { 0.0 } else { p.x };
    let y = if p.y.is_nan() { 0.0 } else { p.y };
    Point::new(x.clamp(MIN_X, MAX_X), y.clamp(MIN_Y, MAX_Y))
}

/// Layout class picked from the window width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width: f64) -> Self {
        Self::from_width_with(width, MOBILE_BREAKPOINT_PX)
    }

    pub fn from_width_with(width: f64, mobile_max: f64) -> Self {
        if width <= mobile_max {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }
}

/// Target of a "jump to" button in the filter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneShortcut {
    Zone(Zone),
    Coffee,
    All,
}

/// Scale and position a shortcut jumps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneView {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

const fn view(x: f64, y: f64, scale: f64) -> ZoneView {
    ZoneView { x, y, scale }
}

impl ZoneShortcut {
    /// Hand-tuned framing per breakpoint
    pub fn view(&self, breakpoint: Breakpoint) -> ZoneView {
        match (breakpoint, self) {
            (Breakpoint::Mobile, ZoneShortcut::Zone(Zone::A)) => view(-20.0, -40.0, 1.7),
            (Breakpoint::Mobile, ZoneShortcut::Zone(Zone::B)) => view(-220.0, -30.0, 1.5),
            (Breakpoint::Mobile, ZoneShortcut::Zone(Zone::C)) => view(-18.0, -220.0, 1.7),
            (Breakpoint::Mobile, ZoneShortcut::Zone(Zone::D)) => view(-240.0, -220.0, 1.7),
            (Breakpoint::Mobile, ZoneShortcut::Zone(Zone::E)) => view(-420.0, -25.0, 1.7),
            (Breakpoint::Mobile, ZoneShortcut::Coffee) => view(-400.0, -220.0, 1.7),
            (Breakpoint::Desktop, ZoneShortcut::Zone(Zone::A)) => view(-40.0, -30.0, 2.0),
            (Breakpoint::Desktop, ZoneShortcut::Zone(Zone::B)) => view(-260.0, -30.0, 2.0),
            (Breakpoint::Desktop, ZoneShortcut::Zone(Zone::C)) => view(-40.0, -230.0, 2.0),
            (Breakpoint::Desktop, ZoneShortcut::Zone(Zone::D)) => view(-260.0, -230.0, 2.0),
            (Breakpoint::Desktop, ZoneShortcut::Zone(Zone::E)) => view(-460.0, -30.0, 2.0),
            (Breakpoint::Desktop, ZoneShortcut::Coffee) => view(-460.0, -230.0, 2.0),
            (_, ZoneShortcut::All) => view(0.0, 0.0, 1.0),
        }
    }
}

impl FromStr for ZoneShortcut {
    type Err = DeskbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coffee" => Ok(ZoneShortcut::Coffee),
            "all" => Ok(ZoneShortcut::All),
            _ => s.parse::<Zone>().map(ZoneShortcut::Zone),
        }
    }
}

/// What a touch-start turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchStart {
    DoubleTap,
    Pinch,
    Pan,
    Ignored,
}

/// Pan and zoom state of the floor-plan map.
///
/// Pan is applied in screen pixels after scaling (`scale(s) translate(x, y)`
/// with a top-left origin), so dragging moves the same number of pixels at
/// every zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewport {
    scale: f64,
    position: Point,
    is_dragging: bool,
    drag_start: Point,
    last_pinch_distance: Option<f64>,
    last_tap_ms: Option<f64>,
    double_tap_ms: f64,
    selected_zone: Option<ZoneShortcut>,
    filters_expanded: bool,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl MapViewport {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            position: Point::ORIGIN,
            is_dragging: false,
            drag_start: Point::ORIGIN,
            last_pinch_distance: None,
            last_tap_ms: None,
            double_tap_ms: DOUBLE_TAP_MS,
            selected_zone: None,
            filters_expanded: false,
        }
    }

    pub fn with_double_tap_ms(mut self, ms: f64) -> Self {
        self.double_tap_ms = ms;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn is_pinching(&self) -> bool {
        self.last_pinch_distance.is_some()
    }

    /// CSS cursor for the map surface
    pub fn cursor(&self) -> &'static str {
        if self.is_dragging {
            "grabbing"
        } else {
            "grab"
        }
    }

    pub fn selected_zone(&self) -> Option<ZoneShortcut> {
        self.selected_zone
    }

    pub fn filters_expanded(&self) -> bool {
        self.filters_expanded
    }

    pub fn toggle_filters(&mut self) -> bool {
        self.filters_expanded = !self.filters_expanded;
        self.filters_expanded
    }

    /// Set scale and position directly, clamped
    pub fn set_view(&mut self, x: f64, y: f64, scale: f64) {
        self.scale = clamp_scale(scale);
        self.position = clamp_position(Point::new(x, y));
    }

    // Pan

    pub fn begin_drag(&mut self, pointer: Point) {
        self.is_dragging = true;
        self.drag_start = Point::new(pointer.x - self.position.x, pointer.y - self.position.y);
    }

    /// Follow the pointer while a drag is active; ignored otherwise
    pub fn drag_to(&mut self, pointer: Point) {
        if !self.is_dragging {
            return;
        }
        self.position = clamp_position(Point::new(
            pointer.x - self.drag_start.x,
            pointer.y - self.drag_start.y,
        ));
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    // Zoom

    /// One wheel notch; positive `delta_y` zooms out
    pub fn wheel(&mut self, delta_y: f64) {
        let step = if delta_y > 0.0 { -WHEEL_STEP } else { WHEEL_STEP };
        self.scale = clamp_scale(self.scale + step);
    }

    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(self.scale + BUTTON_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(self.scale - BUTTON_STEP);
    }

    /// Back to the identity view
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.position = Point::ORIGIN;
    }

    pub fn begin_pinch(&mut self, distance: f64) {
        self.last_pinch_distance = Some(distance);
    }

    /// Scale by the ratio of the new finger distance to the previous one
    pub fn pinch_to(&mut self, distance: f64) {
        let Some(last) = self.last_pinch_distance else {
            return;
        };
        if last > 0.0 && distance.is_finite() {
            self.scale = clamp_scale(self.scale * (distance / last));
        }
        self.last_pinch_distance = Some(distance);
    }

    pub fn end_pinch(&mut self) {
        self.last_pinch_distance = None;
    }

    // Touch

    /// Classify a touch-start on the pan surface.
    ///
    /// Two single-finger starts less than the double-tap window apart toggle
    /// between the identity view and 2x zoom anchored at the tapped point.
    pub fn touch_start(&mut self, touches: &[Point], timestamp_ms: f64) -> TouchStart {
        let is_double = self
            .last_tap_ms
            .is_some_and(|last| timestamp_ms - last < self.double_tap_ms);

        if is_double && touches.len() == 1 {
            self.double_tap(touches[0]);
            self.last_tap_ms = None;
            return TouchStart::DoubleTap;
        }
        self.last_tap_ms = Some(timestamp_ms);

        match touches {
            [a, b] => {
                self.begin_pinch(a.distance_to(*b));
                TouchStart::Pinch
            }
            [p] => {
                self.begin_drag(*p);
                TouchStart::Pan
            }
            _ => TouchStart::Ignored,
        }
    }

    /// Single-finger touch-start at `point`; true when it completed a double tap
    pub fn tap(&mut self, point: Point, timestamp_ms: f64) -> bool {
        self.touch_start(&[point], timestamp_ms) == TouchStart::DoubleTap
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        match touches {
            [a, b] => self.pinch_to(a.distance_to(*b)),
            [p] => self.drag_to(*p),
            _ => {}
        }
    }

    /// Touch-end with `remaining` fingers still down
    pub fn touch_end(&mut self, remaining: usize) {
        if remaining < 2 {
            self.end_pinch();
        }
        if remaining == 0 {
            self.end_drag();
        }
    }

    fn double_tap(&mut self, point: Point) {
        if self.scale >= DOUBLE_TAP_RESET_THRESHOLD {
            self.reset();
            return;
        }
        let target_x = (point.x - self.position.x) / self.scale;
        let target_y = (point.y - self.position.y) / self.scale;
        self.scale = DOUBLE_TAP_SCALE;
        self.position = clamp_position(Point::new(
            point.x - target_x * DOUBLE_TAP_SCALE,
            point.y - target_y * DOUBLE_TAP_SCALE,
        ));
    }

    // Shortcuts

    pub fn move_to_zone(&mut self, shortcut: ZoneShortcut, breakpoint: Breakpoint) {
        let target = shortcut.view(breakpoint);
        self.set_view(target.x, target.y, target.scale);
        self.selected_zone = Some(shortcut);
    }

    /// CSS transform for the map layer
    pub fn transform(&self) -> String {
        format!(
            "scale({}) translate({}px, {}px)",
            self.scale, self.position.x, self.position.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_bounds(vp: &MapViewport) -> bool {
        let p = vp.position();
        (MIN_SCALE..=MAX_SCALE).contains(&vp.scale())
            && (MIN_X..=MAX_X).contains(&p.x)
            && (MIN_Y..=MAX_Y).contains(&p.y)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // Pan tests
    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut vp = MapViewport::new();
        vp.begin_drag(Point::new(100.0, 100.0));
        vp.drag_to(Point::new(130.0, 80.0));
        assert_eq!(vp.position(), Point::new(30.0, -20.0));
        assert!(vp.is_dragging());
        assert_eq!(vp.cursor(), "grabbing");
        vp.end_drag();
        assert_eq!(vp.cursor(), "grab");
    }

    #[test]
    fn test_drag_is_zoom_independent() {
        let mut vp = MapViewport::new();
        vp.set_view(0.0, 0.0, 2.0);
        vp.begin_drag(Point::new(0.0, 0.0));
        vp.drag_to(Point::new(50.0, 0.0));
        assert_eq!(vp.position().x, 50.0);
    }

    #[test]
    fn test_drag_clamps_position() {
        let mut vp = MapViewport::new();
        vp.begin_drag(Point::ORIGIN);
        vp.drag_to(Point::new(10_000.0, -10_000.0));
        assert_eq!(vp.position(), Point::new(MAX_X, MIN_Y));
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut vp = MapViewport::new();
        vp.drag_to(Point::new(40.0, 40.0));
        assert_eq!(vp.position(), Point::ORIGIN);
    }

    // Zoom tests
    #[test]
    fn test_wheel_direction() {
        let mut vp = MapViewport::new();
        vp.wheel(120.0);
        assert!(approx(vp.scale(), 0.9));
        vp.wheel(-120.0);
        vp.wheel(-1.0);
        assert!(approx(vp.scale(), 1.1));
    }

    #[test]
    fn test_buttons_clamp() {
        let mut vp = MapViewport::new();
        for _ in 0..10 {
            vp.zoom_in();
        }
        assert_eq!(vp.scale(), MAX_SCALE);
        for _ in 0..10 {
            vp.zoom_out();
        }
        assert_eq!(vp.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pinch_scales_by_ratio() {
        let mut vp = MapViewport::new();
        vp.begin_pinch(100.0);
        vp.pinch_to(150.0);
        assert!(approx(vp.scale(), 1.5));
    }

    #[test]
    fn test_pinch_clamps_to_max() {
        let mut vp = MapViewport::new();
        vp.begin_pinch(100.0);
        vp.pinch_to(400.0);
        assert_eq!(vp.scale(), MAX_SCALE);
    }

    #[test]
    fn test_pinch_without_start_is_ignored() {
        let mut vp = MapViewport::new();
        vp.pinch_to(300.0);
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn test_pinch_with_two_touches() {
        let mut vp = MapViewport::new();
        let start = vp.touch_start(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], 0.0);
        assert_eq!(start, TouchStart::Pinch);
        vp.touch_move(&[Point::new(0.0, 0.0), Point::new(150.0, 0.0)]);
        assert!(approx(vp.scale(), 1.5));
        vp.touch_end(1);
        assert!(!vp.is_pinching());
    }

    #[test]
    fn test_scale_stays_in_range_under_any_delta() {
        let mut vp = MapViewport::new();
        for delta in [1e9, -1e9, 0.0, f64::NAN, 3.0, -0.5] {
            vp.begin_pinch(10.0);
            vp.pinch_to(10.0 * delta.abs());
            vp.wheel(delta);
            vp.set_view(delta, -delta, delta);
            assert!(in_bounds(&vp), "delta {}", delta);
        }
    }

    // Double-tap tests
    #[test]
    fn test_double_tap_zooms_then_resets() {
        let mut vp = MapViewport::new();
        let p = Point::new(120.0, 80.0);

        assert!(!vp.tap(p, 1_000.0));
        assert!(vp.tap(p, 1_200.0));
        assert_eq!(vp.scale(), 2.0);
        // The tapped model point stays under the finger
        let model_x = (p.x - vp.position().x) / vp.scale();
        let model_y = (p.y - vp.position().y) / vp.scale();
        assert!(approx(model_x, 120.0));
        assert!(approx(model_y, 80.0));
        vp.touch_end(0);

        assert!(!vp.tap(p, 2_000.0));
        assert!(vp.tap(p, 2_100.0));
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.position(), Point::ORIGIN);
    }

    #[test]
    fn test_slow_taps_are_not_double() {
        let mut vp = MapViewport::new();
        assert!(!vp.tap(Point::ORIGIN, 0.0));
        assert!(!vp.tap(Point::ORIGIN, 300.0));
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn test_triple_tap_counts_once() {
        let mut vp = MapViewport::new();
        vp.tap(Point::ORIGIN, 0.0);
        assert!(vp.tap(Point::ORIGIN, 100.0));
        assert!(!vp.tap(Point::ORIGIN, 200.0));
    }

    #[test]
    fn test_single_touch_starts_pan() {
        let mut vp = MapViewport::new();
        assert_eq!(vp.touch_start(&[Point::new(10.0, 10.0)], 0.0), TouchStart::Pan);
        vp.touch_move(&[Point::new(30.0, 5.0)]);
        assert_eq!(vp.position(), Point::new(20.0, -5.0));
        vp.touch_end(0);
        assert!(!vp.is_dragging());
    }

    // Zone shortcut tests
    #[test]
    fn test_breakpoint() {
        assert_eq!(Breakpoint::from_width(768.0), Breakpoint::Mobile);
        assert_eq!(Breakpoint::from_width(769.0), Breakpoint::Desktop);
    }

    #[test]
    fn test_shortcut_parse() {
        assert_eq!("b".parse::<ZoneShortcut>().unwrap(), ZoneShortcut::Zone(Zone::B));
        assert_eq!("coffee".parse::<ZoneShortcut>().unwrap(), ZoneShortcut::Coffee);
        assert_eq!("all".parse::<ZoneShortcut>().unwrap(), ZoneShortcut::All);
        assert!("kitchen".parse::<ZoneShortcut>().is_err());
    }

    #[test]
    fn test_move_to_zone() {
        let mut vp = MapViewport::new();
        vp.move_to_zone(ZoneShortcut::Zone(Zone::B), Breakpoint::Mobile);
        assert_eq!(vp.scale(), 1.5);
        assert_eq!(vp.position(), Point::new(-220.0, -30.0));
        assert_eq!(vp.selected_zone(), Some(ZoneShortcut::Zone(Zone::B)));

        vp.move_to_zone(ZoneShortcut::Coffee, Breakpoint::Desktop);
        assert_eq!(vp.position(), Point::new(-460.0, -230.0));

        vp.move_to_zone(ZoneShortcut::All, Breakpoint::Desktop);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.position(), Point::ORIGIN);
    }

    #[test]
    fn test_move_to_zone_is_idempotent() {
        let mut vp = MapViewport::new();
        vp.begin_drag(Point::ORIGIN);
        vp.drag_to(Point::new(77.0, 33.0));
        vp.end_drag();

        vp.move_to_zone(ZoneShortcut::Zone(Zone::D), Breakpoint::Desktop);
        let first = (vp.scale(), vp.position());
        vp.move_to_zone(ZoneShortcut::Zone(Zone::D), Breakpoint::Desktop);
        assert_eq!((vp.scale(), vp.position()), first);
    }

    #[test]
    fn test_toggle_filters() {
        let mut vp = MapViewport::new();
        assert!(vp.toggle_filters());
        assert!(!vp.toggle_filters());
    }

    #[test]
    fn test_transform_string() {
        let mut vp = MapViewport::new();
        vp.set_view(-40.0, -30.0, 2.0);
        assert_eq!(vp.transform(), "scale(2) translate(-40px, -30px)");
    }
}
