//! Submission Gateway
//!
//! Builds the booking payload from the session and performs the submit round
//! trip against [`BookingApi`]. The wizard only clears its state once the API
//! accepted the booking; any failure keeps everything so the user can retry.
//!
//! Before posting, the selected room is checked again against a fresh room
//! list for the session's date/time. The room snapshot in the session may be
//! minutes old, and a conflict caught here gets a specific message instead of
//! the generic retry prompt.

use crate::availability::{AvailabilityQuery, resolve};
use crate::cart::DishMap;
use crate::session::BookingSession;
use crate::wizard::{BookingReceipt, BookingWizard, ValidationError, WizardError};
use reserve_client::{BookingApi, ClientError};
use shared::{BookingItem, BookingRequest};
use std::sync::Arc;
use thiserror::Error;

/// Default booking length sent with every request
pub const DEFAULT_DURATION_MINUTES: u32 = 120;

/// Generic retry prompt shown for any non-conflict failure
pub const RETRY_MESSAGE: &str = "We couldn't submit your booking. Please try again.";

/// Build the create-booking payload
///
/// `items` is omitted entirely when no dishes are selected.
pub fn build_booking_request(
    session: &BookingSession,
    dishes: &DishMap,
    duration_minutes: u32,
    client_request_id: String,
) -> Result<BookingRequest, ValidationError> {
    let date = session.date.ok_or(ValidationError::MissingDate)?;
    let time = session.time.ok_or(ValidationError::MissingTime)?;

    let items: Vec<BookingItem> = dishes
        .iter()
        .filter(|(_, qty)| **qty > 0)
        .map(|(id, qty)| BookingItem {
            menu_item_id: id.clone(),
            quantity: *qty,
        })
        .collect();

    let note = session.note.trim();

    Ok(BookingRequest {
        client_request_id,
        room_id: session.selected_room.as_ref().map(|r| r.id),
        customer_name: session.customer_name.trim().to_string(),
        customer_phone: session.customer_phone.trim().to_string(),
        note: (!note.is_empty()).then(|| note.to_string()),
        guest_count: session.guest_count,
        date,
        time,
        duration_minutes,
        items: (!items.is_empty()).then_some(items),
    })
}

/// Submission errors
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected locally before any network call
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Room {room_id} ({room_name}) was booked in the meantime")]
    RoomConflict { room_id: i64, room_name: String },

    #[error(transparent)]
    Api(#[from] ClientError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Wizard(e) => e.user_message(),
            Self::RoomConflict { room_name, .. } => format!(
                "{} has just been booked for this date and time. Please go back and choose another room.",
                room_name
            ),
            Self::Api(_) => RETRY_MESSAGE.to_string(),
        }
    }

    /// Whether resubmitting the same request can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::Wizard(WizardError::SubmissionInFlight) => true,
            _ => false,
        }
    }
}

/// Performs the submit round trip for a wizard
pub struct SubmissionGateway<A: BookingApi + ?Sized> {
    api: Arc<A>,
    duration_minutes: u32,
}

impl<A: BookingApi + ?Sized> SubmissionGateway<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Submit the wizard's booking
    ///
    /// Local validation errors leave the wizard untouched. Once the request
    /// is built the wizard is in flight until this returns; failures are
    /// recorded on the wizard via `fail_submission`.
    pub async fn submit(&self, wizard: &mut BookingWizard) -> Result<BookingReceipt, SubmitError> {
        let request = wizard.begin_submission(self.duration_minutes)?;

        tracing::info!(
            client_request_id = %request.client_request_id,
            room_id = ?request.room_id,
            guests = request.guest_count,
            items = request.items.as_ref().map_or(0, Vec::len),
            "Submitting booking"
        );

        if let Err(e) = self.check_room_still_free(wizard.session()).await {
            wizard.fail_submission(e.user_message());
            return Err(e);
        }

        match self.api.create_booking(&request).await {
            Ok(confirmation) => Ok(wizard.complete_submission(confirmation).clone()),
            Err(e) => {
                let err = match e {
                    ClientError::Conflict(msg) => {
                        tracing::warn!(message = %msg, "Booking rejected with a room conflict");
                        room_conflict(wizard.session())
                    }
                    other => SubmitError::Api(other),
                };
                wizard.fail_submission(err.user_message());
                Err(err)
            }
        }
    }

    async fn check_room_still_free(&self, session: &BookingSession) -> Result<(), SubmitError> {
        let Some(selected) = session.selected_room.as_ref() else {
            return Err(WizardError::from(ValidationError::NoRoomSelected).into());
        };

        let rooms = self.api.fetch_rooms(session.date, session.time).await?;
        let query = AvailabilityQuery::from_session(session);
        let still_free = resolve(&rooms, &query)
            .iter()
            .any(|room| room.id == selected.id && room.is_selectable());

        if still_free {
            Ok(())
        } else {
            tracing::warn!(room_id = selected.id, "Selected room no longer available");
            Err(room_conflict(session))
        }
    }
}

fn room_conflict(session: &BookingSession) -> SubmitError {
    match session.selected_room.as_ref() {
        Some(room) => SubmitError::RoomConflict {
            room_id: room.id,
            room_name: room.name.clone(),
        },
        None => SubmitError::Wizard(ValidationError::NoRoomSelected.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::RoomView;
    use crate::session::BookingStep;
    use chrono::{NaiveDate, NaiveTime};
    use shared::LocationType;

    fn session() -> BookingSession {
        BookingSession {
            step: BookingStep::Confirm,
            guest_count: 4,
            date: NaiveDate::from_ymd_opt(2026, 10, 24),
            time: NaiveTime::from_hms_opt(19, 30, 0),
            location_type: LocationType::Private,
            audio_needed: false,
            selected_room: Some(RoomView {
                id: 7,
                name: "Garden Room".to_string(),
                room_type: LocationType::Private,
                capacity: 6,
                has_audio: false,
                images: vec![],
                description: None,
                amenities: vec![],
                surcharge: 0,
                is_available: true,
                booked_for_date: false,
            }),
            selected_dishes: DishMap::new(),
            cart_seen: DishMap::new(),
            customer_name: "  Ana ".to_string(),
            customer_phone: "600111222".to_string(),
            note: "   ".to_string(),
        }
    }

    #[test]
    fn test_items_omitted_when_empty() {
        let request =
            build_booking_request(&session(), &DishMap::new(), 120, "req-1".to_string()).unwrap();
        assert!(request.items.is_none());
        assert!(request.note.is_none());
        assert_eq!(request.customer_name, "Ana");
        assert_eq!(request.room_id, Some(7));
        assert_eq!(request.duration_minutes, 120);

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("items").is_none());
        assert_eq!(json["time"], "19:30");
        assert_eq!(json["date"], "2026-10-24");
    }

    #[test]
    fn test_items_listed_in_id_order() {
        let dishes = DishMap::from([("12".to_string(), 2), ("3".to_string(), 1)]);
        let request = build_booking_request(&session(), &dishes, 90, "req-2".to_string()).unwrap();
        let items = request.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].menu_item_id, "12");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].menu_item_id, "3");
    }

    #[test]
    fn test_missing_time_rejected() {
        let mut s = session();
        s.time = None;
        let err = build_booking_request(&s, &DishMap::new(), 120, "x".to_string()).unwrap_err();
        assert_eq!(err, ValidationError::MissingTime);
    }

    #[test]
    fn test_user_messages() {
        let api_err = SubmitError::Api(ClientError::Internal("boom".to_string()));
        assert_eq!(api_err.user_message(), RETRY_MESSAGE);
        assert!(api_err.is_retryable());

        let conflict = room_conflict(&session());
        assert!(conflict.user_message().contains("Garden Room"));
        assert!(!conflict.is_retryable());
    }
}
