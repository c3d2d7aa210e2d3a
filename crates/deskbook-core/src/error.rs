use thiserror::Error;

use crate::models::TicketStatus;

/// Errors raised by the client-side state machines
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskbookError {
    /// Hour or minute out of range
    #[error("Invalid time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    /// Date string could not be parsed as YYYY-MM-DD
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Local date-time string could not be parsed
    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    /// Seat name does not exist on the floor plan
    #[error("Unknown seat: {0}")]
    UnknownSeat(String),

    /// Zone letter or shortcut name not recognised
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    /// Path does not match any client route
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Ticket status change not allowed from the current status
    #[error("Cannot move ticket from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    /// Status string not recognised
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    /// Working hours window is empty or inverted
    #[error("Invalid working hours: {0}")]
    InvalidWorkingHours(String),

    /// No open popover, a request already in flight, or outside working hours
    #[error("Booking not possible: {0}")]
    BookingRefused(String),
}

impl DeskbookError {
    /// Stable machine-readable code, used by the JS bridge
    pub fn code(&self) -> &'static str {
        match self {
            DeskbookError::InvalidTime { .. } => "INVALID_TIME",
            DeskbookError::InvalidDate(_) => "INVALID_DATE",
            DeskbookError::InvalidDateTime(_) => "INVALID_DATE_TIME",
            DeskbookError::UnknownSeat(_) => "UNKNOWN_SEAT",
            DeskbookError::UnknownZone(_) => "UNKNOWN_ZONE",
            DeskbookError::UnknownRoute(_) => "UNKNOWN_ROUTE",
            DeskbookError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DeskbookError::UnknownStatus(_) => "UNKNOWN_STATUS",
            DeskbookError::InvalidWorkingHours(_) => "INVALID_WORKING_HOURS",
            DeskbookError::BookingRefused(_) => "BOOKING_REFUSED",
        }
    }
}
