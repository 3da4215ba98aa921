//! Booking session state and its persistence
//!
//! The whole wizard state is written under [`SESSION_KEY`] together with the
//! capture time. A record older than the TTL is dropped on load, so an
//! abandoned booking does not come back after the customer walked away.
//! Expiry is only checked lazily, when loading.

use crate::availability::RoomView;
use crate::cart::DishMap;
use crate::clock::Clock;
use crate::storage::{KeyValueStore, SESSION_KEY, StorageError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::LocationType;
use std::sync::Arc;
use std::time::Duration;

/// Default session time-to-live
pub const SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// Default party size for a fresh session
pub const DEFAULT_GUEST_COUNT: u32 = 2;

/// Wizard step, stored as its number (1..=4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BookingStep {
    #[default]
    Basics,
    Room,
    Menu,
    Confirm,
    /// Terminal, never persisted
    Submitted,
}

impl BookingStep {
    pub fn number(self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Room => 2,
            Self::Menu => 3,
            Self::Confirm => 4,
            Self::Submitted => 5,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Room => Some(Self::Basics),
            Self::Menu => Some(Self::Room),
            Self::Confirm => Some(Self::Menu),
            Self::Basics | Self::Submitted => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Basics => "Basics",
            Self::Room => "Room",
            Self::Menu => "Menu",
            Self::Confirm => "Confirm",
            Self::Submitted => "Submitted",
        }
    }
}

impl From<BookingStep> for u8 {
    fn from(step: BookingStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for BookingStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Basics),
            2 => Ok(Self::Room),
            3 => Ok(Self::Menu),
            4 => Ok(Self::Confirm),
            5 => Ok(Self::Submitted),
            other => Err(format!("Invalid booking step: {}", other)),
        }
    }
}

impl std::fmt::Display for BookingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// The wizard's aggregate state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSession {
    pub step: BookingStep,
    pub guest_count: u32,
    pub date: Option<NaiveDate>,
    #[serde(with = "shared::time_format::option")]
    pub time: Option<NaiveTime>,
    pub location_type: LocationType,
    /// Only meaningful for private rooms
    pub audio_needed: bool,
    /// Snapshot taken at selection time
    pub selected_room: Option<RoomView>,
    pub selected_dishes: DishMap,
    /// Cart contents as of the last merge, so cart deletions made while no
    /// wizard was running are still detected after a restart
    pub cart_seen: DishMap,
    pub customer_name: String,
    pub customer_phone: String,
    pub note: String,
}

impl Default for BookingSession {
    fn default() -> Self {
        Self {
            step: BookingStep::Basics,
            guest_count: DEFAULT_GUEST_COUNT,
            date: None,
            time: None,
            location_type: LocationType::Private,
            audio_needed: false,
            selected_room: None,
            selected_dishes: DishMap::new(),
            cart_seen: DishMap::new(),
            customer_name: String::new(),
            customer_phone: String::new(),
            note: String::new(),
        }
    }
}

/// Persisted envelope: session plus capture time (Unix millis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session: BookingSession,
    pub saved_at: i64,
}

/// Return the stored session if the record is still within `ttl`
///
/// A record stamped in the future (clock moved back) counts as fresh. A
/// record that somehow captured the terminal step is never restored.
pub fn load_if_fresh(now: i64, record: SessionRecord, ttl: Duration) -> Option<BookingSession> {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let age = now.saturating_sub(record.saved_at);
    if age > ttl_ms {
        return None;
    }
    if record.session.step == BookingStep::Submitted {
        return None;
    }
    Some(record.session)
}

/// Session persistence manager
pub struct SessionPersistence {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    /// Set once the booking went through; blocks further saves
    completed: bool,
}

impl std::fmt::Debug for SessionPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPersistence")
            .field("ttl", &self.ttl)
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl SessionPersistence {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            ttl: SESSION_TTL,
            completed: false,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Overwrite the stored record; no-op once completed
    pub fn save(&self, session: &BookingSession) {
        if self.completed {
            tracing::trace!("Session completed, skipping save");
            return;
        }
        let record = SessionRecord {
            session: session.clone(),
            saved_at: self.clock.now_millis(),
        };
        let result = serde_json::to_vec(&record)
            .map_err(StorageError::from)
            .and_then(|bytes| self.storage.put(SESSION_KEY, &bytes));
        match result {
            Ok(()) => tracing::trace!(step = session.step.number(), "Session saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to persist booking session"),
        }
    }

    /// Load the stored session if present, readable and fresh
    ///
    /// Expired or unreadable records are removed.
    pub fn load(&self) -> Option<BookingSession> {
        let bytes = match self.storage.get(SESSION_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read booking session");
                return None;
            }
        };

        let record: SessionRecord = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Stored booking session is malformed, discarding");
                self.remove_record();
                return None;
            }
        };

        let saved_at = record.saved_at;
        match load_if_fresh(self.clock.now_millis(), record, self.ttl) {
            Some(session) => {
                tracing::info!(step = session.step.number(), "Restored booking session");
                Some(session)
            }
            None => {
                tracing::info!(saved_at, "Booking session expired, discarding");
                self.remove_record();
                None
            }
        }
    }

    /// Remove the stored record
    pub fn clear(&self) {
        self.remove_record();
        tracing::debug!("Booking session cleared");
    }

    /// Enter the terminal state; subsequent saves are ignored
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Leave the terminal state for a new booking
    pub fn reset(&mut self) {
        self.completed = false;
    }

    fn remove_record(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "Failed to remove booking session");
        }
    }
}
