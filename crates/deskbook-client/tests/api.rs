// Integration tests against an in-process stub of the booking backend

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use deskbook_client::{ApiClient, ApiError, AppStore, ClientConfig, LoadStatus, SessionHandle};
use deskbook_core::state::FreePlacesQuery;
use deskbook_core::{
    BookingRequest, MemoryStorage, Role, SignInRequest, Ticket, TicketStatus, TicketType,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn user_json(role: &str) -> Value {
    json!({ "id": "u1", "name": "Ann", "email": "ann@example.com", "role": role })
}

async fn sign_in(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "secret" {
        (StatusCode::OK, Json(json!({ "token": "good" })))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": "Wrong password" })))
    }
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    match bearer(&headers) {
        Some("good") => (StatusCode::OK, Json(user_json("ROLE_USER"))),
        Some("admin") => (StatusCode::OK, Json(user_json("ROLE_ADMIN"))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" }))),
    }
}

async fn admin_only(headers: HeaderMap) -> StatusCode {
    match bearer(&headers) {
        Some("admin") => StatusCode::OK,
        Some("good") => StatusCode::FORBIDDEN,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn free(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("start").map(String::as_str) == Some("2025-03-07T09:00:00")
        && params.get("end").map(String::as_str) == Some("2025-03-07T10:00:00")
    {
        Json(json!([{ "name": "A1" }, { "name": "A2" }]))
    } else {
        Json(json!([]))
    }
}

async fn place(Path(name): Path<String>) -> impl IntoResponse {
    if name == "A1" {
        (StatusCode::OK, Json(json!({ "name": "A1", "type": "desk" })))
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "boom" })))
    }
}

async fn create(Json(body): Json<Value>) -> impl IntoResponse {
    if body["name"] == "B1" {
        (StatusCode::CONFLICT, Json(json!({ "message": "Seat already booked" })))
    } else {
        (StatusCode::OK, Json(json!({ "bookingId": "b-1" })))
    }
}

async fn meetings() -> Json<Value> {
    Json(json!([{
        "bookingId": "b-1",
        "startAt": "2025-03-07T09:00:00",
        "endAt": "2025-03-07T10:00:00",
        "status": "PENDING",
        "user": user_json("ROLE_USER"),
    }]))
}

async fn cancel(Path(_uuid): Path<String>) -> Json<Value> {
    Json(json!({ "status": true }))
}

async fn pong(headers: HeaderMap) -> StatusCode {
    match bearer(&headers) {
        Some("good") => StatusCode::OK,
        _ => StatusCode::NO_CONTENT,
    }
}

async fn set_status(Path((_id, status)): Path<(String, String)>) -> Json<Value> {
    Json(json!({ "status": status }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/user/sign-in", post(sign_in))
        .route("/api/user/me", get(me))
        .route("/api/admin-only", post(admin_only))
        .route("/api/place/free", get(free))
        .route("/api/place/:name", get(place))
        .route("/api/booking/create", post(create))
        .route("/api/booking/user", get(meetings))
        .route("/api/booking/:uuid/cancel", post(cancel))
        .route("/api/tickets/setStatus/:id/:status", post(set_status))
        .route("/api/pong", get(pong));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client_with(token: Option<&str>) -> ApiClient {
    let base_url = spawn_backend().await;
    let storage = match token {
        Some(token) => MemoryStorage::with_token(token),
        None => MemoryStorage::new(),
    };
    ApiClient::new(&ClientConfig::new(base_url), SessionHandle::init(storage)).unwrap()
}

fn ticket(status: TicketStatus) -> Ticket {
    Ticket {
        id: "t1".into(),
        description: "Lamp broken".into(),
        ticket_type: TicketType::ALL[0],
        status,
        zone: None,
        place_name: None,
        created_at: "2025-03-07T09:00:00".into(),
        updated_at: None,
    }
}

// ========== Auth ==========

#[tokio::test]
async fn test_sign_in_stores_token_and_me_caches_user() {
    let api = client_with(None).await;
    let credentials = SignInRequest {
        email: "ann@example.com".into(),
        password: "secret".into(),
    };
    api.auth().sign_in(&credentials).await.unwrap();
    assert_eq!(api.session().token().as_deref(), Some("good"));

    let user = api.auth().me().await.unwrap();
    assert_eq!(user.name, "Ann");
    assert_eq!(api.session().user().unwrap().email, "ann@example.com");
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_sign_in_keeps_email_out_of_info_logs() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let api = client_with(None).await;
    let credentials = SignInRequest {
        email: "ann@example.com".into(),
        password: "secret".into(),
    };
    api.auth().sign_in(&credentials).await.unwrap();

    let output = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert!(!output.contains("ann@example.com"), "email leaked: {}", output);
}

#[tokio::test]
async fn test_sign_in_error_payload() {
    let api = client_with(None).await;
    let credentials = SignInRequest {
        email: "ann@example.com".into(),
        password: "nope".into(),
    };
    let err = api.auth().sign_in(&credentials).await.unwrap_err();
    assert_eq!(err.user_message(), "Wrong password");
    assert!(!api.session().has_token());
}

#[tokio::test]
async fn test_missing_token_is_not_sent() {
    let api = client_with(None).await;
    let err = api.auth().me().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
    assert!(err.is_session_error());
}

#[tokio::test]
async fn test_unauthorized_tears_down_session() {
    let api = client_with(Some("stale")).await;
    let err = api.auth().me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!api.session().has_token());
}

// ========== Admin ==========

#[tokio::test]
async fn test_admin_probe() {
    let admin = client_with(Some("admin")).await;
    assert!(admin.admin().is_admin().await.unwrap());

    let user = client_with(Some("good")).await;
    assert!(!user.admin().is_admin().await.unwrap());

    let stale = client_with(Some("stale")).await;
    assert!(!stale.admin().is_admin().await.unwrap());
}

// ========== Places ==========

#[tokio::test]
async fn test_free_places_query() {
    let api = client_with(Some("good")).await;
    let query = FreePlacesQuery {
        start: "2025-03-07T09:00:00".into(),
        end: "2025-03-07T10:00:00".into(),
    };
    let free = api.places().free(&query).await.unwrap();
    let names: Vec<_> = free.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A1", "A2"]);
}

#[tokio::test]
async fn test_place_detail_is_best_effort() {
    let api = client_with(Some("good")).await;
    let place = api.places().get("A1").await.unwrap().unwrap();
    assert_eq!(place.place_type.as_deref(), Some("desk"));
    assert!(api.places().get("C1").await.unwrap().is_none());
}

// ========== Bookings ==========

#[tokio::test]
async fn test_booking_conflict_keeps_server_message() {
    let api = client_with(Some("good")).await;
    let request = BookingRequest {
        name: "B1".into(),
        start_at: "2025-03-07T09:00:00".into(),
        end_at: "2025-03-07T10:00:00".into(),
    };
    let err = api.bookings().create(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
    assert_eq!(err.user_message(), "Seat already booked");
    assert!(api.session().has_token());
}

#[tokio::test]
async fn test_cancel_ack() {
    let api = client_with(Some("good")).await;
    assert!(api.bookings().cancel("b-1").await.unwrap().status);
}

// ========== Tickets ==========

#[tokio::test]
async fn test_ticket_status_transitions() {
    let api = client_with(Some("good")).await;
    let body = api
        .tickets()
        .set_status(&ticket(TicketStatus::Open), TicketStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(body["status"], "IN_PROGRESS");

    let err = api
        .tickets()
        .set_status(&ticket(TicketStatus::Closed), TicketStatus::Open)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Core(_)));
}

// ========== Ping ==========

#[tokio::test]
async fn test_pong() {
    let api = client_with(Some("good")).await;
    api.ping().pong().await.unwrap();
    assert!(api.session().has_token());

    let api = client_with(Some("other")).await;
    let err = api.ping().pong().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!api.session().has_token());
}

// ========== Store ==========

#[tokio::test]
async fn test_store_login_and_meetings() {
    let api = client_with(None).await;
    let mut store = AppStore::new(api);
    let credentials = SignInRequest {
        email: "ann@example.com".into(),
        password: "secret".into(),
    };
    store.login(&credentials).await.unwrap();
    assert_eq!(store.user().status, LoadStatus::Succeeded);
    assert_eq!(store.user().user.as_ref().unwrap().role, Role::User);

    store.cancel_meeting("b-1").await.unwrap();
    assert_eq!(store.booking().meetings.len(), 1);
    assert_eq!(store.booking().meetings[0].user_name(), "Ann");
    assert_eq!(store.api().session().cached_meetings().len(), 1);

    store.logout();
    assert!(store.user().user.is_none());
    assert!(!store.api().session().has_token());
}

#[tokio::test]
async fn test_store_records_failure_message() {
    let api = client_with(None).await;
    let mut store = AppStore::new(api);
    let credentials = SignInRequest {
        email: "ann@example.com".into(),
        password: "bad".into(),
    };
    assert!(store.login(&credentials).await.is_err());
    assert_eq!(store.user().status, LoadStatus::Failed);
    assert_eq!(store.user().error.as_deref(), Some("Wrong password"));
}
