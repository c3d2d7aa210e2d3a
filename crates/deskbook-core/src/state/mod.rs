pub mod debounce;
pub mod input;
pub mod page;
pub mod popover;
pub mod slider;
pub mod timer;
pub mod viewport;

pub use debounce::{Debouncer, RequestSequence, RequestTicket};
pub use input::{
    dispatch_seat_click, route_pointer, view_to_map, HitLayer, HitRegion, HitRouter, MapAction,
    PointerEvent, Rect, SeatClick, Space, SEAT_HIT_RADIUS,
};
pub use page::{
    BookingPageState, FreePlacesQuery, LocalNow, PageSnapshot, PresetButton, TimePreset,
    BOOKED_MESSAGE,
};
pub use popover::{ClickTarget, PopoverPhase, RequestStatus, SeatPopover};
pub use slider::{Handle, TimeMarker, TimeRangeSlider, DEFAULT_RANGE, DEFAULT_SPAN_MINUTES};
pub use timer::{ScheduledTimers, TimerHandle};
pub use viewport::{Breakpoint, MapViewport, Point, TouchStart, ZoneShortcut, ZoneView};
