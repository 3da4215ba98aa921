//! End-to-end booking flow against an in-process booking API

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use reserve_client::{BookingApi, ClientError, ClientResult};
use reserve_core::storage::{CART_KEY, SESSION_KEY};
use reserve_core::submission::RETRY_MESSAGE;
use reserve_core::{
    AvailabilityQuery, AvailabilityResolver, BookingStep, BookingWizard, CartStore, FixedClock,
    KeyValueStore, OrderSummary, RedbStore, SessionPersistence, SubmissionGateway, SubmitError,
};
use shared::{BookingConfirmation, BookingRequest, LocationType, MenuItem, Room, RoomStatus};
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq)]
enum Outcome {
    Accept,
    Conflict,
    ServerError,
}

struct MockApi {
    rooms: Mutex<Vec<Room>>,
    outcome: Mutex<Outcome>,
    bookings: Mutex<Vec<BookingRequest>>,
}

impl MockApi {
    fn new() -> Self {
        Self {
            rooms: Mutex::new(vec![
                room(1, "Jade Room", LocationType::Private, 8, true),
                room(2, "Small Room", LocationType::Private, 4, true),
                room(3, "Terrace", LocationType::Outdoor, 20, false),
            ]),
            outcome: Mutex::new(Outcome::Accept),
            bookings: Mutex::new(Vec::new()),
        }
    }

    fn book_room(&self, id: i64) {
        for r in self.rooms.lock().iter_mut().filter(|r| r.id == id) {
            r.booked_for_date = true;
        }
    }
}

#[async_trait]
impl BookingApi for MockApi {
    async fn fetch_menu_items(&self) -> ClientResult<Vec<MenuItem>> {
        Ok(vec![menu_item("12", "Dumplings", 850), menu_item("3", "Tea", 300)])
    }

    async fn fetch_rooms(
        &self,
        _date: Option<NaiveDate>,
        _time: Option<NaiveTime>,
    ) -> ClientResult<Vec<Room>> {
        Ok(self.rooms.lock().clone())
    }

    async fn create_booking(&self, request: &BookingRequest) -> ClientResult<BookingConfirmation> {
        self.bookings.lock().push(request.clone());
        match *self.outcome.lock() {
            Outcome::Accept => Ok(BookingConfirmation {
                id: 501,
                reference: Some("BK-501".to_string()),
                status: Some("confirmed".to_string()),
            }),
            Outcome::Conflict => Err(ClientError::Conflict("room taken".to_string())),
            Outcome::ServerError => Err(ClientError::Internal("database down".to_string())),
        }
    }
}

fn room(id: i64, name: &str, room_type: LocationType, capacity: u32, has_audio: bool) -> Room {
    Room {
        id,
        name: name.to_string(),
        room_type,
        capacity,
        has_audio,
        has_projector: false,
        has_heating: false,
        images: vec![],
        description: None,
        status: RoomStatus::Available,
        booked_for_date: false,
        surcharge: 1000,
    }
}

fn menu_item(id: &str, name: &str, price: i64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category: None,
        image: None,
        description: None,
        is_available: true,
    }
}

struct App {
    store: Arc<RedbStore>,
    clock: Arc<FixedClock>,
    _dir: tempfile::TempDir,
}

impl App {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RedbStore::open(dir.path().join("reserve.redb")).unwrap());
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()));
        Self {
            store,
            clock,
            _dir: dir,
        }
    }

    fn wizard(&self) -> (BookingWizard, CartStore) {
        let cart = CartStore::load(self.store.clone());
        let persistence = SessionPersistence::new(self.store.clone(), self.clock.clone());
        (BookingWizard::new(cart.clone(), persistence), cart)
    }
}

/// Basics → room list → select room 1 → contact details
async fn walk_to_confirm(api: &MockApi, wizard: &mut BookingWizard, cart: &CartStore) {
    cart.set_quantity("12", 2);

    wizard.set_date(NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()).unwrap();
    wizard.set_time(NaiveTime::from_hms_opt(19, 30, 0).unwrap()).unwrap();
    wizard.set_guest_count(6).unwrap();
    wizard.set_audio_needed(true).unwrap();
    wizard.continue_from_basics().unwrap();

    let mut resolver = AvailabilityResolver::new();
    let rooms = resolver
        .refresh(api, &AvailabilityQuery::from_session(wizard.session()))
        .await
        .unwrap();
    // the 4-seat room and the terrace are filtered out
    assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

    assert_eq!(wizard.select_room(&rooms[0]).unwrap(), BookingStep::Confirm);
    wizard.set_customer_name("Ana").unwrap();
    wizard.set_customer_phone("600111222").unwrap();
}

#[tokio::test]
async fn test_full_booking_flow() {
    let app = App::new();
    let api = Arc::new(MockApi::new());
    let (mut wizard, cart) = app.wizard();
    walk_to_confirm(&api, &mut wizard, &cart).await;

    let menu = api.fetch_menu_items().await.unwrap();
    let summary = OrderSummary::build(
        &wizard.merged_dishes(),
        &menu,
        wizard.session().selected_room.as_ref(),
    );
    assert_eq!(summary.total, 2 * 850 + 1000);

    let gateway = SubmissionGateway::new(api.clone());
    let receipt = gateway.submit(&mut wizard).await.unwrap();
    assert_eq!(receipt.confirmation.reference.as_deref(), Some("BK-501"));
    assert_eq!(wizard.step(), BookingStep::Submitted);

    let sent = api.bookings.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].room_id, Some(1));
    assert_eq!(sent[0].guest_count, 6);
    assert_eq!(sent[0].duration_minutes, 120);
    assert_eq!(sent[0].items.as_ref().unwrap()[0].quantity, 2);
    drop(sent);

    // both keys cleared, nothing comes back on reload
    assert!(app.store.get(SESSION_KEY).unwrap().is_none());
    assert_eq!(app.store.get(CART_KEY).unwrap().unwrap(), b"{}".to_vec());
    let (reloaded, reloaded_cart) = app.wizard();
    assert_eq!(reloaded.step(), BookingStep::Basics);
    assert!(reloaded_cart.is_empty());
}

#[tokio::test]
async fn test_room_taken_before_submit() {
    let app = App::new();
    let api = Arc::new(MockApi::new());
    let (mut wizard, cart) = app.wizard();
    walk_to_confirm(&api, &mut wizard, &cart).await;

    api.book_room(1);
    let gateway = SubmissionGateway::new(api.clone());
    let err = gateway.submit(&mut wizard).await.unwrap_err();

    assert!(matches!(err, SubmitError::RoomConflict { room_id: 1, .. }));
    assert!(api.bookings.lock().is_empty());
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.step(), BookingStep::Confirm);
    assert!(wizard.last_error().unwrap().contains("Jade Room"));
    assert!(app.store.get(SESSION_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_server_conflict_maps_to_room_conflict() {
    let app = App::new();
    let api = Arc::new(MockApi::new());
    let (mut wizard, cart) = app.wizard();
    walk_to_confirm(&api, &mut wizard, &cart).await;

    *api.outcome.lock() = Outcome::Conflict;
    let gateway = SubmissionGateway::new(api.clone());
    let err = gateway.submit(&mut wizard).await.unwrap_err();
    assert!(matches!(err, SubmitError::RoomConflict { .. }));
    assert_eq!(cart.quantity("12"), 2);
}

#[tokio::test]
async fn test_server_error_keeps_state_for_retry() {
    let app = App::new();
    let api = Arc::new(MockApi::new());
    let (mut wizard, cart) = app.wizard();
    walk_to_confirm(&api, &mut wizard, &cart).await;

    *api.outcome.lock() = Outcome::ServerError;
    let gateway = SubmissionGateway::new(api.clone()).with_duration_minutes(90);
    let err = gateway.submit(&mut wizard).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(wizard.last_error(), Some(RETRY_MESSAGE));
    assert_eq!(wizard.step(), BookingStep::Confirm);
    assert_eq!(cart.quantity("12"), 2);

    *api.outcome.lock() = Outcome::Accept;
    gateway.submit(&mut wizard).await.unwrap();

    let sent = api.bookings.lock();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].client_request_id, sent[1].client_request_id);
    assert_eq!(sent[1].duration_minutes, 90);
}

#[tokio::test]
async fn test_resume_after_restart() {
    let app = App::new();
    let api = Arc::new(MockApi::new());
    {
        let (mut wizard, cart) = app.wizard();
        walk_to_confirm(&api, &mut wizard, &cart).await;
        wizard.set_note("Birthday").unwrap();
    }

    app.clock.advance(chrono::Duration::minutes(10));
    let (wizard, _) = app.wizard();
    assert_eq!(wizard.step(), BookingStep::Confirm);
    assert_eq!(wizard.session().note, "Birthday");
    assert_eq!(wizard.session().location_type, LocationType::Private);

    app.clock.advance(chrono::Duration::minutes(20));
    let (expired, _) = app.wizard();
    assert_eq!(expired.step(), BookingStep::Basics);
}
