//! Data models
//!
//! Shared between the booking API client and the reservation core.
//! Room IDs are `i64`, menu item IDs are strings (cart keys).

pub mod booking;
pub mod menu_item;
pub mod room;

// Re-exports
pub use booking::*;
pub use menu_item::*;
pub use room::*;
