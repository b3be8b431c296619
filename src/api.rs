// Booking API client
// Thin transport over the external booking service. Every workflow talks to it
// through the `BookingApi` trait so tests can swap in a scripted fake.

use crate::config::ClientConfig;
use crate::models::{Booking, BookingId, BookingRequest, BookingStatus, Room, StatusUpdate};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

// Transport/API failures. The message is surfaced to callers as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API Error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Init(String),
}

/// Room search filters as sent to `GET /rooms`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomFilter {
    pub check_in: String,
    pub check_out: String,
    pub max_price: Option<u32>,
    pub amenities: Vec<String>,
}

impl RoomFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.check_in.is_empty() {
            pairs.push(("checkIn", self.check_in.clone()));
        }
        if !self.check_out.is_empty() {
            pairs.push(("checkOut", self.check_out.clone()));
        }
        // zero means "no ceiling"
        if let Some(max_price) = self.max_price.filter(|p| *p > 0) {
            pairs.push(("maxPrice", max_price.to_string()));
        }
        for amenity in &self.amenities {
            pairs.push(("amenities", amenity.clone()));
        }
        pairs
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
}

#[async_trait]
pub trait BookingApi: Send + Sync + 'static {
    async fn search_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, ApiError>;

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError>;

    async fn get_booking(&self, id: &BookingId) -> Result<Booking, ApiError>;

    async fn bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, ApiError>;

    async fn cancel_booking(&self, id: &BookingId) -> Result<(), ApiError>;
}

/// `BookingApi` over HTTP/JSON.
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: Url,
    stats: Mutex<ClientStats>,
}

impl HttpBookingApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Config(format!("invalid base url {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // No timeout here; the transport default applies.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }

    /// Appends `segments` to the base URL, percent-encoding each one, so an
    /// id containing `/`, `?` or `#` stays a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base URLs are rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, path = url.path(), "booking api request");
        self.client.request(method, url)
    }

    // Sends the request and returns the raw body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        self.stats.lock().requests_sent += 1;
        let result = Self::send(request).await;

        let mut stats = self.stats.lock();
        match result {
            Ok(_) => stats.requests_succeeded += 1,
            Err(_) => stats.requests_failed += 1,
        }
        result
    }

    async fn send(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "booking api unreachable");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "booking api returned an error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn search_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, ApiError> {
        let request = self
            .request(Method::GET, &["rooms"])
            .query(&filter.query_pairs());
        self.fetch_json(request).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        let request = self.request(Method::POST, &["bookings", ""]).json(request);
        self.fetch_json(request).await
    }

    async fn get_booking(&self, id: &BookingId) -> Result<Booking, ApiError> {
        let request = self.request(Method::GET, &["bookings", &id.0]);
        self.fetch_json(request).await
    }

    async fn bookings_by_email(&self, email: &str) -> Result<Vec<Booking>, ApiError> {
        let request = self
            .request(Method::GET, &["bookings"])
            .query(&[("email", email)]);
        self.fetch_json(request).await
    }

    async fn cancel_booking(&self, id: &BookingId) -> Result<(), ApiError> {
        let request = self
            .request(Method::PATCH, &["bookings", &id.0])
            .json(&StatusUpdate {
                status: BookingStatus::Cancelled,
            });
        // Response body is not used
        self.execute(request).await.map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use axum::extract::{Path, RawQuery, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use std::sync::Arc;
    use tokio_test::assert_err;

    // Every request the test server sees, as "METHOD path?query body"
    type Seen = Arc<Mutex<Vec<String>>>;

    async fn list_rooms(State(seen): State<Seen>, RawQuery(query): RawQuery) -> Json<Vec<Room>> {
        seen.lock()
            .push(format!("GET /rooms?{}", query.unwrap_or_default()));
        Json(vec![fixtures::room("room-1", "100"), fixtures::room("room-2", "180")])
    }

    async fn create(State(seen): State<Seen>, Json(request): Json<BookingRequest>) -> Json<Booking> {
        seen.lock().push(format!("POST /bookings/ {}", request.room_id));
        let room = fixtures::room(&request.room_id, "100");
        Json(Booking {
            id: BookingId::from("bk-new"),
            guest_id: "g-new".to_string(),
            guest: request.guest_details,
            room_id: request.room_id,
            room,
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            total_price: 300.0,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        })
    }

    async fn list_bookings(
        State(seen): State<Seen>,
        RawQuery(query): RawQuery,
    ) -> Json<Vec<Booking>> {
        seen.lock()
            .push(format!("GET /bookings?{}", query.unwrap_or_default()));
        Json(vec![fixtures::booking(
            "bk-1",
            BookingStatus::Confirmed,
            "2025-06-01",
            "2025-06-04",
        )])
    }

    async fn get_one(Path(id): Path<String>) -> Result<Json<Booking>, (StatusCode, String)> {
        if id == "missing" {
            return Err((StatusCode::NOT_FOUND, "Booking not found".to_string()));
        }
        Ok(Json(fixtures::booking(
            &id,
            BookingStatus::Confirmed,
            "2025-06-01",
            "2025-06-04",
        )))
    }

    async fn cancel(
        State(seen): State<Seen>,
        Path(id): Path<String>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        seen.lock().push(format!("PATCH /bookings/{} {}", id, body));
        if id == "missing" {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::NO_CONTENT
        }
    }

    async fn garbage() -> &'static str {
        "<html>not json</html>"
    }

    async fn spawn_server() -> (HttpBookingApi, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let api = Router::new()
            .route("/rooms", get(list_rooms))
            .route("/bookings/", post(create))
            .route("/bookings", get(list_bookings))
            .route("/bookings/{id}", get(get_one).patch(cancel))
            .route("/broken", get(garbage))
            .with_state(seen.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = HttpBookingApi::new(ClientConfig::new(format!("http://{}/api/", addr))).unwrap();
        (client, seen)
    }

    #[tokio::test]
    async fn test_search_sends_filters_as_query() {
        let (api, seen) = spawn_server().await;

        let filter = RoomFilter {
            check_in: "2025-06-01".to_string(),
            check_out: "2025-06-04".to_string(),
            max_price: Some(200),
            amenities: vec!["wifi".to_string(), "spa".to_string()],
        };
        let rooms = api.search_rooms(&filter).await.unwrap();

        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[1].room_type.base_price, "180");
        assert_eq!(
            seen.lock()[0],
            "GET /rooms?checkIn=2025-06-01&checkOut=2025-06-04&maxPrice=200&amenities=wifi&amenities=spa"
        );
    }

    #[tokio::test]
    async fn test_search_omits_zero_price_ceiling() {
        let (api, seen) = spawn_server().await;

        let filter = RoomFilter {
            check_in: "2025-06-01".to_string(),
            check_out: "2025-06-04".to_string(),
            max_price: Some(0),
            amenities: vec![],
        };
        api.search_rooms(&filter).await.unwrap();

        assert_eq!(seen.lock()[0], "GET /rooms?checkIn=2025-06-01&checkOut=2025-06-04");
    }

    #[tokio::test]
    async fn test_create_preserves_room_and_email() {
        let (api, seen) = spawn_server().await;

        let request = BookingRequest {
            guest_details: fixtures::guest("grace@example.org"),
            room_id: "room-7".to_string(),
            check_in_date: "2025-06-01".parse().unwrap(),
            check_out_date: "2025-06-04".parse().unwrap(),
        };
        let booking = api.create_booking(&request).await.unwrap();

        assert_eq!(booking.room_id, "room-7");
        assert_eq!(booking.guest.email, "grace@example.org");
        assert_eq!(seen.lock()[0], "POST /bookings/ room-7");
    }

    #[tokio::test]
    async fn test_list_by_email_encodes_query() {
        let (api, seen) = spawn_server().await;

        let bookings = api.bookings_by_email("ada@example.com").await.unwrap();

        assert_eq!(bookings.len(), 1);
        assert_eq!(seen.lock()[0], "GET /bookings?email=ada%40example.com");
    }

    #[tokio::test]
    async fn test_get_booking_and_not_found() {
        let (api, _) = spawn_server().await;

        let booking = api.get_booking(&BookingId::from("bk-9")).await.unwrap();
        assert_eq!(booking.id, BookingId::from("bk-9"));

        let err = assert_err!(api.get_booking(&BookingId::from("missing")).await);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API Error: 404 - Booking not found");
    }

    #[tokio::test]
    async fn test_cancel_sends_status_patch() {
        let (api, seen) = spawn_server().await;

        api.cancel_booking(&BookingId::from("bk-1")).await.unwrap();
        assert_eq!(seen.lock()[0], r#"PATCH /bookings/bk-1 {"status":"cancelled"}"#);

        let err = assert_err!(api.cancel_booking(&BookingId::from("missing")).await);
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (api, _) = spawn_server().await;

        let request = api.request(Method::GET, &["broken"]);
        let result: Result<Vec<Room>, ApiError> = api.fetch_json(request).await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_stats_count_outcomes() {
        let (api, _) = spawn_server().await;

        api.get_booking(&BookingId::from("bk-1")).await.unwrap();
        let _ = api.get_booking(&BookingId::from("missing")).await;

        let stats = api.stats();
        assert_eq!(stats.requests_sent, 2);
        assert_eq!(stats.requests_succeeded, 1);
        assert_eq!(stats.requests_failed, 1);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpBookingApi::new(ClientConfig::new(format!("http://{}/api", addr))).unwrap();
        let result = api.bookings_by_email("ada@example.com").await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpBookingApi::new(ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ClientError::Config(_))));

        let result = HttpBookingApi::new(ClientConfig::new("mailto:desk@hotel.example.com"));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = HttpBookingApi::new(ClientConfig::new("https://hotel.example.com/api/")).unwrap();
        assert_eq!(
            api.endpoint(&["bookings", ""]).as_str(),
            "https://hotel.example.com/api/bookings/"
        );
        assert_eq!(
            api.endpoint(&["bookings", "bk/7?x#y"]).as_str(),
            "https://hotel.example.com/api/bookings/bk%2F7%3Fx%23y"
        );

        let api = HttpBookingApi::new(ClientConfig::new("http://localhost:3001")).unwrap();
        assert_eq!(api.endpoint(&["rooms"]).as_str(), "http://localhost:3001/rooms");
    }

    #[tokio::test]
    async fn test_booking_id_sent_as_one_segment() {
        let (api, seen) = spawn_server().await;

        let booking = api.get_booking(&BookingId::from("bk/7?x#y")).await.unwrap();
        assert_eq!(booking.id, BookingId::from("bk/7?x#y"));

        api.cancel_booking(&BookingId::from("a b/c")).await.unwrap();
        assert_eq!(seen.lock()[0], r#"PATCH /bookings/a b/c {"status":"cancelled"}"#);
    }
}
