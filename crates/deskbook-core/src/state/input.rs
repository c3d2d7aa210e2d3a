use serde::{Deserialize, Serialize};

use super::viewport::{MapViewport, Point, TouchStart};
use crate::routes::Route;
use crate::seat::Seat;

/// Half the side of a seat glyph in map units
pub const SEAT_HIT_RADIUS: f64 = 9.0;

/// Semantic role of whatever sits under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layer", content = "seat")]
pub enum HitLayer {
    /// The on-map zoom/zone control panel
    Controls,
    Seat(String),
    /// Bare map: the only layer that pans or tap-zooms
    Surface,
}

impl HitLayer {
    pub fn starts_gesture(&self) -> bool {
        matches!(self, HitLayer::Surface)
    }
}

/// Coordinate space a region is registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    /// Fixed to the view, unaffected by pan and zoom
    View,
    /// Moves with the map transform
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn centered(center: Point, half: f64) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitRegion {
    pub layer: HitLayer,
    pub z_index: i32,
    pub bounds: Rect,
    pub space: Space,
}

/// Z-ordered table of input targets.
///
/// Regions are kept sorted topmost first; anything not covered resolves to
/// [`HitLayer::Surface`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitRouter {
    regions: Vec<HitRegion>,
}

/// Map a view-local point into map units under the current pan and zoom
pub fn view_to_map(viewport: &MapViewport, p: Point) -> Point {
    let pos = viewport.position();
    let s = viewport.scale();
    Point::new((p.x - pos.x) / s, (p.y - pos.y) / s)
}

impl HitRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, layer: HitLayer, z_index: i32, bounds: Rect, space: Space) {
        self.regions.push(HitRegion {
            layer,
            z_index,
            bounds,
            space,
        });
        // Stable sort keeps registration order among equal z
        self.regions.sort_by(|a, b| b.z_index.cmp(&a.z_index));
    }

    /// Register the control panel in view coordinates
    pub fn register_controls(&mut self, bounds: Rect, z_index: i32) {
        self.register(HitLayer::Controls, z_index, bounds, Space::View);
    }

    /// Replace every seat region with the glyphs of `seats`
    pub fn register_seats(&mut self, seats: &[Seat], z_index: i32) {
        self.regions.retain(|r| !matches!(r.layer, HitLayer::Seat(_)));
        for seat in seats {
            self.register(
                HitLayer::Seat(seat.name.clone()),
                z_index,
                Rect::centered(Point::new(seat.x, seat.y), SEAT_HIT_RADIUS),
                Space::Map,
            );
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Topmost layer under a view-local point
    pub fn resolve(&self, viewport: &MapViewport, p: Point) -> HitLayer {
        let map_point = view_to_map(viewport, p);
        self.regions
            .iter()
            .find(|r| match r.space {
                Space::View => r.bounds.contains(p),
                Space::Map => r.bounds.contains(map_point),
            })
            .map(|r| r.layer.clone())
            .unwrap_or(HitLayer::Surface)
    }
}

/// Raw pointer input forwarded by the shell, in view-local pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    MouseDown { point: Point },
    MouseMove { point: Point },
    MouseUp,
    MouseLeave,
    #[serde(rename_all = "camelCase")]
    TouchStart { touches: Vec<Point>, timestamp_ms: f64 },
    TouchMove { touches: Vec<Point> },
    /// Also used for touch-cancel
    TouchEnd { remaining: usize },
    #[serde(rename_all = "camelCase")]
    Wheel { delta_y: f64 },
}

/// What a pointer event did to the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "seat", rename_all = "camelCase")]
pub enum MapAction {
    None,
    PanStarted,
    Panned,
    PanEnded,
    PinchStarted,
    Zoomed,
    DoubleTap,
    /// Pressed on a seat; the seat's own click handler takes over
    SeatPressed(String),
    ControlPressed,
}

/// Route a pointer event through the hit table into the viewport
pub fn route_pointer(viewport: &mut MapViewport, router: &HitRouter, event: &PointerEvent) -> MapAction {
    match event {
        PointerEvent::MouseDown { point } => match router.resolve(viewport, *point) {
            HitLayer::Surface => {
                viewport.begin_drag(*point);
                MapAction::PanStarted
            }
            HitLayer::Seat(name) => MapAction::SeatPressed(name),
            HitLayer::Controls => MapAction::ControlPressed,
        },
        PointerEvent::MouseMove { point } => {
            if viewport.is_dragging() {
                viewport.drag_to(*point);
                MapAction::Panned
            } else {
                MapAction::None
            }
        }
        PointerEvent::MouseUp | PointerEvent::MouseLeave => {
            if viewport.is_dragging() {
                viewport.end_drag();
                MapAction::PanEnded
            } else {
                MapAction::None
            }
        }
        PointerEvent::TouchStart { touches, timestamp_ms } => {
            let Some(first) = touches.first() else {
                return MapAction::None;
            };
            match router.resolve(viewport, *first) {
                HitLayer::Surface => match viewport.touch_start(touches, *timestamp_ms) {
                    TouchStart::DoubleTap => MapAction::DoubleTap,
                    TouchStart::Pinch => MapAction::PinchStarted,
                    TouchStart::Pan => MapAction::PanStarted,
                    TouchStart::Ignored => MapAction::None,
                },
                HitLayer::Seat(name) => MapAction::SeatPressed(name),
                HitLayer::Controls => MapAction::ControlPressed,
            }
        }
        PointerEvent::TouchMove { touches } => {
            let pinching = touches.len() == 2 && viewport.is_pinching();
            let panning = touches.len() == 1 && viewport.is_dragging();
            viewport.touch_move(touches);
            if pinching {
                MapAction::Zoomed
            } else if panning {
                MapAction::Panned
            } else {
                MapAction::None
            }
        }
        PointerEvent::TouchEnd { remaining } => {
            let was_dragging = viewport.is_dragging();
            viewport.touch_end(*remaining);
            if was_dragging && !viewport.is_dragging() {
                MapAction::PanEnded
            } else {
                MapAction::None
            }
        }
        PointerEvent::Wheel { delta_y } => {
            viewport.wheel(*delta_y);
            MapAction::Zoomed
        }
    }
}

/// Outcome of clicking a seat glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum SeatClick {
    /// Admins jump to the seat's booking list
    Navigate(Route),
    Select(Seat),
    Ignored,
}

pub fn dispatch_seat_click(seat: &Seat, is_admin: bool) -> SeatClick {
    if is_admin {
        SeatClick::Navigate(Route::AdminBookingPlace(seat.name.clone()))
    } else if seat.is_occupied {
        SeatClick::Ignored
    } else {
        SeatClick::Select(seat.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FreePlace;
    use crate::seat::FloorPlan;

    fn router_with_plan() -> (HitRouter, FloorPlan) {
        let mut plan = FloorPlan::new();
        plan.apply_free_places(&[FreePlace::new("A1")]);
        let mut router = HitRouter::new();
        router.register_seats(&plan.seats(), 10);
        router.register_controls(Rect::new(0.0, 0.0, 40.0, 120.0), 20);
        (router, plan)
    }

    // Hit-testing tests
    #[test]
    fn test_resolve_layers() {
        let (router, _) = router_with_plan();
        let vp = MapViewport::new();

        // A1 sits at (53, 60) but the control panel covers x < 40
        assert_eq!(router.resolve(&vp, Point::new(53.0, 60.0)), HitLayer::Seat("A1".into()));
        assert_eq!(router.resolve(&vp, Point::new(10.0, 10.0)), HitLayer::Controls);
        assert_eq!(router.resolve(&vp, Point::new(700.0, 400.0)), HitLayer::Surface);
    }

    #[test]
    fn test_resolve_follows_map_transform() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();
        vp.set_view(100.0, 50.0, 2.0);

        // A1 at map (53, 60) shows at view (2*53+100, 2*60+50)
        assert_eq!(router.resolve(&vp, Point::new(206.0, 170.0)), HitLayer::Seat("A1".into()));
        assert_eq!(router.resolve(&vp, Point::new(53.0, 60.0)), HitLayer::Surface);
        // Controls do not move with the map
        assert_eq!(router.resolve(&vp, Point::new(10.0, 10.0)), HitLayer::Controls);
    }

    #[test]
    fn test_higher_z_wins() {
        let mut router = HitRouter::new();
        router.register(HitLayer::Seat("B1".into()), 1, Rect::new(0.0, 0.0, 100.0, 100.0), Space::View);
        router.register_controls(Rect::new(0.0, 0.0, 50.0, 50.0), 5);
        let vp = MapViewport::new();
        assert_eq!(router.resolve(&vp, Point::new(25.0, 25.0)), HitLayer::Controls);
        assert_eq!(router.resolve(&vp, Point::new(75.0, 75.0)), HitLayer::Seat("B1".into()));
    }

    #[test]
    fn test_register_seats_replaces_previous() {
        let (mut router, plan) = router_with_plan();
        let before = router.len();
        router.register_seats(&plan.seats(), 10);
        assert_eq!(router.len(), before);
        assert_eq!(before, 66);
    }

    // Routing tests
    #[test]
    fn test_mouse_pan_on_surface() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();

        let down = PointerEvent::MouseDown { point: Point::new(600.0, 400.0) };
        assert_eq!(route_pointer(&mut vp, &router, &down), MapAction::PanStarted);
        let drag = PointerEvent::MouseMove { point: Point::new(620.0, 390.0) };
        assert_eq!(route_pointer(&mut vp, &router, &drag), MapAction::Panned);
        assert_eq!(vp.position(), Point::new(20.0, -10.0));
        assert_eq!(route_pointer(&mut vp, &router, &PointerEvent::MouseLeave), MapAction::PanEnded);
        assert!(!vp.is_dragging());
    }

    #[test]
    fn test_mouse_down_on_seat_does_not_pan() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();
        let down = PointerEvent::MouseDown { point: Point::new(53.0, 60.0) };
        assert_eq!(route_pointer(&mut vp, &router, &down), MapAction::SeatPressed("A1".into()));
        assert!(!vp.is_dragging());

        let drag = PointerEvent::MouseMove { point: Point::new(90.0, 90.0) };
        assert_eq!(route_pointer(&mut vp, &router, &drag), MapAction::None);
        assert_eq!(vp.position(), Point::ORIGIN);
    }

    #[test]
    fn test_double_tap_on_controls_is_blocked() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();
        let tap = PointerEvent::TouchStart {
            touches: vec![Point::new(5.0, 5.0)],
            timestamp_ms: 0.0,
        };
        assert_eq!(route_pointer(&mut vp, &router, &tap), MapAction::ControlPressed);
        let tap = PointerEvent::TouchStart {
            touches: vec![Point::new(5.0, 5.0)],
            timestamp_ms: 100.0,
        };
        assert_eq!(route_pointer(&mut vp, &router, &tap), MapAction::ControlPressed);
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn test_touch_sequence_on_surface() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();
        let at = |ms: f64| PointerEvent::TouchStart {
            touches: vec![Point::new(600.0, 250.0)],
            timestamp_ms: ms,
        };
        assert_eq!(route_pointer(&mut vp, &router, &at(0.0)), MapAction::PanStarted);
        assert_eq!(
            route_pointer(&mut vp, &router, &PointerEvent::TouchEnd { remaining: 0 }),
            MapAction::PanEnded
        );
        assert_eq!(route_pointer(&mut vp, &router, &at(150.0)), MapAction::DoubleTap);
        assert_eq!(vp.scale(), 2.0);
    }

    #[test]
    fn test_pinch_routing() {
        let (router, _) = router_with_plan();
        let mut vp = MapViewport::new();
        let start = PointerEvent::TouchStart {
            touches: vec![Point::new(500.0, 200.0), Point::new(600.0, 200.0)],
            timestamp_ms: 0.0,
        };
        assert_eq!(route_pointer(&mut vp, &router, &start), MapAction::PinchStarted);
        let spread = PointerEvent::TouchMove {
            touches: vec![Point::new(500.0, 200.0), Point::new(650.0, 200.0)],
        };
        assert_eq!(route_pointer(&mut vp, &router, &spread), MapAction::Zoomed);
        assert!((vp.scale() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_routing() {
        let router = HitRouter::new();
        let mut vp = MapViewport::new();
        let wheel = PointerEvent::Wheel { delta_y: 53.0 };
        assert_eq!(route_pointer(&mut vp, &router, &wheel), MapAction::Zoomed);
        assert!((vp.scale() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_event_from_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"type": "touchStart", "touches": [{"x": 1, "y": 2}], "timestampMs": 5}"#)
                .unwrap();
        assert_eq!(
            event,
            PointerEvent::TouchStart {
                touches: vec![Point::new(1.0, 2.0)],
                timestamp_ms: 5.0
            }
        );
    }

    // Seat click tests
    #[test]
    fn test_dispatch_seat_click() {
        let mut plan = FloorPlan::new();
        plan.apply_free_places(&[FreePlace::new("C3")]);
        let free = plan.seat("C3").unwrap();
        let taken = plan.seat("C4").unwrap();

        assert_eq!(dispatch_seat_click(&free, false), SeatClick::Select(free.clone()));
        assert_eq!(dispatch_seat_click(&taken, false), SeatClick::Ignored);
        assert_eq!(
            dispatch_seat_click(&taken, true),
            SeatClick::Navigate(Route::AdminBookingPlace("C4".into()))
        );
    }
}
