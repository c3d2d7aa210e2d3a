//! Promise-returning wrappers over the REST services.
//!
//! Every call resolves to a JSON string and rejects with a
//! `{ code, message }` object.

use std::future::Future;

use deskbook_client::{ApiClient, ApiError, ApiResult, ClientConfig, SessionHandle};
use deskbook_core::state::FreePlacesQuery;
use deskbook_core::{
    BookingRequest, BookingUpdate, SignInRequest, SignUpRequest, Ticket, TicketStatus, UserEdit,
};
use js_sys::Promise;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::api::JsDeskbookError;
use crate::storage::LocalStorage;

fn api_error(err: ApiError) -> JsValue {
    if err.is_session_error() {
        web_sys::console::warn_1(&format!("Session ended: {}", err).into());
    }
    let error = JsDeskbookError::new(err.code(), err.user_message());
    serde_wasm_bindgen::to_value(&error).unwrap_or(JsValue::NULL)
}

fn parse<T: DeserializeOwned>(json: &str) -> ApiResult<T> {
    serde_json::from_str(json).map_err(ApiError::from)
}

/// Run `fut` to completion and hand its JSON-encoded result to JavaScript
fn promise<T, F>(fut: F) -> Promise
where
    T: Serialize,
    F: Future<Output = ApiResult<T>> + 'static,
{
    future_to_promise(async move {
        let value = fut.await.map_err(api_error)?;
        let json = serde_json::to_string(&value).map_err(|err| api_error(err.into()))?;
        Ok(JsValue::from_str(&json))
    })
}

/// REST access for the JavaScript shell, sharing one session
#[wasm_bindgen]
pub struct ApiBridge {
    api: ApiClient,
}

#[wasm_bindgen]
impl ApiBridge {
    /// Session restored from `localStorage`
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: &str) -> Result<ApiBridge, JsValue> {
        let session = SessionHandle::init(LocalStorage);
        let api = ApiClient::new(&ClientConfig::new(base_url), session).map_err(api_error)?;
        Ok(Self { api })
    }

    #[wasm_bindgen(js_name = hasToken)]
    pub fn has_token(&self) -> bool {
        self.api.session().has_token()
    }

    /// Role of the cached user (`ROLE_ANONYMOUS` when unknown)
    #[wasm_bindgen]
    pub fn role(&self) -> String {
        serde_json::to_string(&self.api.session().role())
            .map(|role| role.trim_matches('"').to_string())
            .unwrap_or_default()
    }

    // --- Auth ---

    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self, email: String, password: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let credentials = SignInRequest { email, password };
            api.auth().sign_in(&credentials).await?;
            api.auth().me().await
        })
    }

    #[wasm_bindgen(js_name = signUp)]
    pub fn sign_up(&self, request_json: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let request: SignUpRequest = parse(&request_json)?;
            api.auth().sign_up(&request).await
        })
    }

    #[wasm_bindgen]
    pub fn logout(&self) {
        self.api.auth().logout();
    }

    #[wasm_bindgen]
    pub fn me(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.auth().me().await })
    }

    #[wasm_bindgen(js_name = editUser)]
    pub fn edit_user(&self, id: String, edit_json: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let edit: UserEdit = parse(&edit_json)?;
            api.auth().edit_user(&id, &edit).await
        })
    }

    #[wasm_bindgen(js_name = verifyEmail)]
    pub fn verify_email(&self, token: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.auth().verify_email(&token).await })
    }

    #[wasm_bindgen]
    pub fn pong(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.ping().pong().await })
    }

    // --- Places ---

    #[wasm_bindgen(js_name = freePlaces)]
    pub fn free_places(&self, start: String, end: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.places().free(&FreePlacesQuery { start, end }).await })
    }

    #[wasm_bindgen]
    pub fn place(&self, name: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.places().get(&name).await })
    }

    #[wasm_bindgen(js_name = placeBookings)]
    pub fn place_bookings(&self, name: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.places().bookings_for(&name).await })
    }

    // --- Bookings ---

    #[wasm_bindgen(js_name = createBooking)]
    pub fn create_booking(&self, request_json: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let request: BookingRequest = parse(&request_json)?;
            api.bookings().create(&request).await
        })
    }

    #[wasm_bindgen(js_name = myBookings)]
    pub fn my_bookings(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.bookings().mine().await })
    }

    #[wasm_bindgen(js_name = cancelBooking)]
    pub fn cancel_booking(&self, uuid: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.bookings().cancel(&uuid).await })
    }

    #[wasm_bindgen(js_name = updateBooking)]
    pub fn update_booking(&self, uuid: String, update_json: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let update: BookingUpdate = parse(&update_json)?;
            api.bookings().update(&uuid, &update).await
        })
    }

    #[wasm_bindgen(js_name = bookingQr)]
    pub fn booking_qr(&self, uuid: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.bookings().qr(&uuid).await })
    }

    #[wasm_bindgen(js_name = checkQr)]
    pub fn check_qr(&self, code: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.bookings().check_qr(&code).await })
    }

    // --- Tickets ---

    #[wasm_bindgen(js_name = placeTickets)]
    pub fn place_tickets(&self, name: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.tickets().by_place(&name).await })
    }

    #[wasm_bindgen]
    pub fn tickets(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.tickets().all().await })
    }

    /// Move a ticket along its lifecycle; `status` is e.g. `IN_PROGRESS`
    #[wasm_bindgen(js_name = setTicketStatus)]
    pub fn set_ticket_status(&self, ticket_json: String, status: String) -> Promise {
        let api = self.api.clone();
        promise(async move {
            let ticket: Ticket = parse(&ticket_json)?;
            let status: TicketStatus = status.parse()?;
            api.tickets().set_status(&ticket, status).await
        })
    }

    // --- Admin ---

    #[wasm_bindgen(js_name = isAdmin)]
    pub fn is_admin(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().is_admin().await })
    }

    #[wasm_bindgen]
    pub fn users(&self) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().users().await })
    }

    #[wasm_bindgen(js_name = verifyUser)]
    pub fn verify_user(&self, id: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().verify_user(&id).await })
    }

    #[wasm_bindgen(js_name = blockUser)]
    pub fn block_user(&self, id: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().block_user(&id).await })
    }

    #[wasm_bindgen(js_name = unblockUser)]
    pub fn unblock_user(&self, id: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().unblock_user(&id).await })
    }

    #[wasm_bindgen(js_name = deleteUser)]
    pub fn delete_user(&self, id: String) -> Promise {
        let api = self.api.clone();
        promise(async move { api.admin().delete_user(&id).await })
    }
}
