//! Shared types for the reservation workspace
//!
//! Data models and API envelope types used by both the booking API client
//! and the reservation core.

pub mod models;
pub mod response;
pub mod time_format;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    BookingConfirmation, BookingItem, BookingRequest, LocationType, MenuItem, Room, RoomStatus,
};
pub use response::ApiResponse;
