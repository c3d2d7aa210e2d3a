use deskbook_core::admin::ticket_transition;
use deskbook_core::{Ticket, TicketStatus};

use super::RawBody;
use crate::error::ApiResult;
use crate::http::ApiClient;

pub struct TicketService<'a> {
    api: &'a ApiClient,
}

impl<'a> TicketService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Tickets filed against one seat; best-effort like place detail
    pub async fn by_place(&self, name: &str) -> ApiResult<Option<Vec<Ticket>>> {
        match self.api.get(&format!("/api/tickets/getByPlace/{}", name)).await {
            Ok(tickets) => Ok(Some(tickets)),
            Err(err) if err.is_session_error() => Err(err),
            Err(err) => {
                tracing::warn!("Tickets for {} unavailable: {}", name, err);
                Ok(None)
            }
        }
    }

    pub async fn all(&self) -> ApiResult<Vec<Ticket>> {
        self.api.get("/api/tickets/all").await
    }

    /// Move a ticket along its workflow; invalid moves never reach the server
    pub async fn set_status(&self, ticket: &Ticket, status: TicketStatus) -> ApiResult<RawBody> {
        let status = ticket_transition(ticket.status, status)?;
        self.api
            .post_empty(&format!(
                "/api/tickets/setStatus/{}/{}",
                ticket.id,
                status.as_str()
            ))
            .await
    }
}
