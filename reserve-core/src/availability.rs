//! Availability Resolver
//!
//! Turns the raw room list from the API into the annotated list shown on the
//! room step.
//!
//! A room qualifies when its type matches the requested location, it seats
//! the party, and (for private rooms with audio requested) it has audio.
//! Qualifying rooms that are not bookable stay in the output with
//! `is_available = false` so they can be rendered disabled.
//!
//! `booked_for_date` depends on the requested date/time, so a change of
//! either forces a refetch. Location, party size and audio only re-filter
//! the cached rows.

use crate::session::BookingSession;
use chrono::{NaiveDate, NaiveTime};
use reserve_client::{BookingApi, ClientResult};
use serde::{Deserialize, Serialize};
use shared::{LocationType, Room, RoomStatus};

/// Resolved room as presented on the room step
///
/// The wizard keeps a clone of this once the user picks it; it is a snapshot
/// and may go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: i64,
    pub name: String,
    pub room_type: LocationType,
    pub capacity: u32,
    pub has_audio: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Surcharge in cents
    #[serde(default)]
    pub surcharge: i64,
    pub is_available: bool,
    pub booked_for_date: bool,
}

impl RoomView {
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
            room_type: room.room_type,
            capacity: room.capacity,
            has_audio: room.has_audio,
            images: room.images.clone(),
            description: room.description.clone(),
            amenities: amenities(room),
            surcharge: room.surcharge,
            is_available: room.status == RoomStatus::Available && !room.booked_for_date,
            booked_for_date: room.booked_for_date,
        }
    }

    /// Whether the room may be picked
    pub fn is_selectable(&self) -> bool {
        self.is_available && !self.booked_for_date
    }
}

fn amenities(room: &Room) -> Vec<String> {
    [
        (room.has_audio, "Audio system"),
        (room.has_projector, "Projector"),
        (room.has_heating, "Heating"),
    ]
    .into_iter()
    .filter(|(present, _)| *present)
    .map(|(_, label)| label.to_string())
    .collect()
}

/// Filter inputs taken from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location_type: LocationType,
    pub guest_count: u32,
    pub audio_needed: bool,
}

impl AvailabilityQuery {
    pub fn from_session(session: &BookingSession) -> Self {
        Self {
            date: session.date,
            time: session.time,
            location_type: session.location_type,
            guest_count: session.guest_count,
            audio_needed: session.audio_needed,
        }
    }

    fn fetch_key(&self) -> (Option<NaiveDate>, Option<NaiveTime>) {
        (self.date, self.time)
    }
}

/// Type, capacity and audio constraints
pub fn qualifies(room: &Room, query: &AvailabilityQuery) -> bool {
    room.room_type == query.location_type
        && room.capacity >= query.guest_count
        && (query.location_type != LocationType::Private || !query.audio_needed || room.has_audio)
}

/// Filter and annotate raw rooms, keeping input order
pub fn resolve(rooms: &[Room], query: &AvailabilityQuery) -> Vec<RoomView> {
    rooms
        .iter()
        .filter(|room| qualifies(room, query))
        .map(RoomView::from_room)
        .collect()
}

/// Caches the raw rooms of the last date/time fetch
#[derive(Debug, Default)]
pub struct AvailabilityResolver {
    fetched_for: Option<(Option<NaiveDate>, Option<NaiveTime>)>,
    raw: Vec<Room>,
}

impl AvailabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the cached rows were fetched for a different date/time
    pub fn needs_fetch(&self, query: &AvailabilityQuery) -> bool {
        self.fetched_for != Some(query.fetch_key())
    }

    /// Resolve rooms, refetching first if date or time changed
    ///
    /// On fetch failure the cache is left as it was.
    pub async fn refresh(
        &mut self,
        api: &dyn BookingApi,
        query: &AvailabilityQuery,
    ) -> ClientResult<Vec<RoomView>> {
        if self.needs_fetch(query) {
            let rooms = api.fetch_rooms(query.date, query.time).await?;
            tracing::debug!(
                date = ?query.date,
                time = ?query.time,
                rooms = rooms.len(),
                "Fetched rooms"
            );
            self.raw = rooms;
            self.fetched_for = Some(query.fetch_key());
        }
        Ok(self.rooms(query))
    }

    /// Re-filter the cached rows without a fetch
    pub fn rooms(&self, query: &AvailabilityQuery) -> Vec<RoomView> {
        resolve(&self.raw, query)
    }

    /// Force the next `refresh` to hit the API
    pub fn invalidate(&mut self) {
        self.fetched_for = None;
    }
}
