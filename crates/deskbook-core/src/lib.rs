pub mod admin;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod seat;
pub mod session;
pub mod state;
pub mod time;
pub mod toast;

pub use admin::{
    distinct_zones, ticket_transition, BookingFilter, DateSpan, PageLink, Paginator, TicketFilter,
    TicketStats, UserFilter,
};
pub use config::{BookingConfig, PopoverTimings};
pub use error::DeskbookError;
pub use models::{
    Booking, BookingRequest, BookingStatus, BookingUpdate, FreePlace, Place, Role, SignInRequest,
    SignUpRequest, Ticket, TicketStatus, TicketType, TokenResponse, User, UserEdit,
};
pub use routes::{guard, Route, RouteDecision};
pub use seat::{parse_seat_name, FloorPlan, Seat, SeatType, Zone};
pub use session::{MemoryStorage, Session, TokenStorage};
pub use state::{
    BookingPageState, ClickTarget, Debouncer, LocalNow, MapViewport, Point, RequestSequence,
    SeatPopover, TimePreset, TimeRangeSlider,
};
pub use time::{format_local, parse_date, parse_local, TimeOfDay, TimeRange, WorkingHours};
pub use toast::{Toast, ToastId, ToastKind, ToastManager};
