//! Booking Model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One pre-ordered dish line in a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingItem {
    pub menu_item_id: String,
    pub quantity: u32,
}

/// Create booking payload (`POST /api/bookings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Client-generated id, lets the server drop duplicate submissions
    pub client_request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub guest_count: u32,
    pub date: NaiveDate,
    #[serde(with = "crate::time_format")]
    pub time: NaiveTime,
    pub duration_minutes: u32,
    /// Omitted entirely when nothing was pre-ordered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<BookingItem>>,
}

/// Booking creation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub id: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
