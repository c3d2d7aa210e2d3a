//! Filtering, pagination and ticket workflow for the admin tables.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DeskbookError;
use crate::models::{Booking, BookingStatus, Role, Ticket, TicketStatus, TicketType, User};
use crate::time::parse_date;

/// Rows shown per admin table page
pub const DEFAULT_PER_PAGE: usize = 10;

/// Calendar day of a backend timestamp such as `2025-03-07T09:15:00`
fn day_of(timestamp: &str) -> Option<NaiveDate> {
    timestamp.get(..10).and_then(|d| parse_date(d).ok())
}

fn matches_search(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Inclusive calendar-day bounds; an absent bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpan {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateSpan {
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether the timestamp's day lies in the span; unparseable stamps only pass an open span
    pub fn admits(&self, timestamp: &str) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(day) = day_of(timestamp) else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

/// Ticket table filter; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub ticket_type: Option<TicketType>,
    pub zone: Option<String>,
    /// Case-insensitive substring of the description
    pub search: String,
    pub created: DateSpan,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.ticket_type.is_some_and(|t| t != ticket.ticket_type) {
            return false;
        }
        if let Some(zone) = &self.zone {
            if ticket.zone.as_deref() != Some(zone.as_str()) {
                return false;
            }
        }
        if !self.search.is_empty() && !matches_search(&ticket.description, &self.search) {
            return false;
        }
        self.created.admits(&ticket.created_at)
    }

    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Booking table filter; dates apply to the booking start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    /// Case-insensitive substring of the owner's name
    pub search: String,
    pub starts: DateSpan,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|s| s != booking.status) {
            return false;
        }
        if !self.search.is_empty() && !matches_search(booking.user_name(), &self.search) {
            return false;
        }
        self.starts.admits(&booking.start_at)
    }

    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        bookings.iter().filter(|b| self.matches(b)).collect()
    }
}

/// User table filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub verified: Option<bool>,
    /// Case-insensitive substring of the email or the name
    pub search: String,
    pub created: DateSpan,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.active.is_some_and(|a| a != user.is_active()) {
            return false;
        }
        if self.verified.is_some_and(|v| v != user.is_verified()) {
            return false;
        }
        if !self.search.is_empty()
            && !matches_search(&user.email, &self.search)
            && !matches_search(&user.name, &self.search)
        {
            return false;
        }
        match &user.created_at {
            Some(created) => self.created.admits(created),
            None => self.created.is_open(),
        }
    }

    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}

/// One button of the compact page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// 1-based pagination over a filtered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginator {
    page: usize,
    per_page: usize,
    total_items: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            total_items: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page)
    }

    /// Update the item count, pulling the current page back into range
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.page = self.page.min(self.total_pages()).max(1);
    }

    pub fn goto(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn next(&mut self) {
        self.goto(self.page + 1);
    }

    pub fn prev(&mut self) {
        self.goto(self.page.saturating_sub(1));
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 1-based inclusive bounds of the visible rows, `(0, 0)` when empty
    pub fn showing(&self) -> (usize, usize) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let first = (self.page - 1) * self.per_page + 1;
        let last = (self.page * self.per_page).min(self.total_items);
        (first, last)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = ((self.page - 1) * self.per_page).min(items.len());
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }

    /// Page buttons to render, with a gap between the two clusters
    pub fn links(&self) -> Vec<PageLink> {
        let n = self.total_pages();
        if n <= 4 {
            return (1..=n).map(PageLink::Page).collect();
        }
        let p = self.page;
        let (a, b, c, d) = if p <= 2 || p >= n - 1 {
            (1, 2, n - 1, n)
        } else if p == 3 {
            (2, 3, n - 1, n)
        } else if p == n - 2 {
            (1, 2, n - 2, n - 1)
        } else {
            (p - 1, p, n - 1, n)
        };
        let mut links = vec![PageLink::Page(a), PageLink::Page(b)];
        if c > b + 1 {
            links.push(PageLink::Gap);
        }
        links.extend([PageLink::Page(c), PageLink::Page(d)]);
        links
    }
}

/// Check a ticket status change against the admin workflow
pub fn ticket_transition(from: TicketStatus, to: TicketStatus) -> Result<TicketStatus, DeskbookError> {
    match (from, to) {
        (TicketStatus::Open, TicketStatus::InProgress)
        | (TicketStatus::Open, TicketStatus::Closed)
        | (TicketStatus::InProgress, TicketStatus::Closed) => Ok(to),
        _ => Err(DeskbookError::InvalidTransition { from, to }),
    }
}

/// Actions offered for a ticket in its current status
pub fn allowed_transitions(from: TicketStatus) -> Vec<TicketStatus> {
    TicketStatus::ALL
        .into_iter()
        .filter(|to| ticket_transition(from, *to).is_ok())
        .collect()
}

/// Apply a status change locally after the backend accepted it
pub fn apply_ticket_status(
    tickets: &mut [Ticket],
    id: &str,
    status: TicketStatus,
    updated_at: &str,
) -> Result<(), DeskbookError> {
    for ticket in tickets.iter_mut().filter(|t| t.id == id) {
        ticket.status = ticket_transition(ticket.status, status)?;
        ticket.updated_at = Some(updated_at.to_string());
    }
    Ok(())
}

/// Sorted, de-duplicated zones mentioned by a ticket list
pub fn distinct_zones(tickets: &[Ticket]) -> Vec<String> {
    let mut zones: Vec<String> = tickets
        .iter()
        .filter_map(|t| t.zone.clone())
        .filter(|z| !z.is_empty())
        .collect();
    zones.sort();
    zones.dedup();
    zones
}

/// Dashboard counters for the ticket list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_zone: BTreeMap<String, usize>,
    /// Tickets created on each of the last seven days, oldest first
    pub last_week: Vec<(NaiveDate, usize)>,
}

impl TicketStats {
    pub fn compute(tickets: &[Ticket], today: NaiveDate) -> Self {
        let mut stats = TicketStats {
            total: tickets.len(),
            ..Default::default()
        };
        for status in TicketStatus::ALL {
            stats.by_status.insert(status.as_str().to_string(), 0);
        }
        for kind in TicketType::ALL {
            stats.by_type.insert(kind.as_str().to_string(), 0);
        }

        for ticket in tickets {
            *stats.by_status.entry(ticket.status.as_str().to_string()).or_default() += 1;
            *stats.by_type.entry(ticket.ticket_type.as_str().to_string()).or_default() += 1;
            if let Some(zone) = ticket.zone.as_ref().filter(|z| !z.is_empty()) {
                *stats.by_zone.entry(zone.clone()).or_default() += 1;
            }
        }

        stats.last_week = (0..7u64)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| {
                let count = tickets
                    .iter()
                    .filter(|t| day_of(&t.created_at) == Some(day))
                    .count();
                (day, count)
            })
            .collect();
        stats
    }
}
