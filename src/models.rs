// Domain records exchanged with the booking API
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoomType {
    pub id: String,
    pub name: String,
    pub description: String,
    // Decimal string as sent by the API, e.g. "129.99"
    pub base_price: String,
    pub max_occupancy: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub room_type: RoomType,
    pub floor_number: i32,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: RoomStatus,
}

// Contact rules checked before a booking is submitted
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
pub struct Guest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Last name is required"))]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Email is required"),
        regex(path = *crate::validation::EMAIL_SHAPE, message = "Email is invalid")
    )]
    pub email: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Phone number is required"))]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

impl Guest {
    /// Blank contact details with the placeholder values the booking form
    /// starts from.
    pub fn blank() -> Self {
        Self {
            full_name: Some("N/A".to_string()),
            address: Some(String::new()),
            date_of_birth: Some("2025-01-01".to_string()),
            nationality: Some("N/A".to_string()),
            ..Default::default()
        }
    }
}

/// Identity of a booking assigned by the external system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(id: &str) -> Self {
        BookingId(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub guest_id: String,
    pub guest: Guest,
    pub room_id: String,
    pub room: Room,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        crate::pricing::nights_between(self.check_in_date, self.check_out_date)
    }

    /// Whether the booking may be offered for cancellation at `now`.
    ///
    /// Only confirmed bookings whose check-in (midnight UTC) is still strictly
    /// in the future qualify. The API decides whether the cancel is accepted.
    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        let check_in = self.check_in_date.and_time(chrono::NaiveTime::MIN).and_utc();
        self.status == BookingStatus::Confirmed && check_in > now
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRequest {
    pub guest_details: Guest,
    pub room_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

// Body of the cancel call
#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: BookingStatus,
}
