use super::*;
use crate::clock::FixedClock;
use crate::storage::{CART_KEY, KeyValueStore, MemoryStore, SESSION_KEY};

const TODAY: (i32, u32, u32) = (2026, 10, 18);

struct Harness {
    wizard: BookingWizard,
    cart: CartStore,
    storage: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
}

impl Harness {
    /// A second wizard over the same storage, as after an app restart
    fn restart(&self) -> BookingWizard {
        let cart = CartStore::load(self.storage.clone());
        let persistence = SessionPersistence::new(self.storage.clone(), self.clock.clone());
        BookingWizard::new(cart, persistence)
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
}

fn create_harness() -> Harness {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at_date(today()));
    let cart = CartStore::load(storage.clone());
    let persistence = SessionPersistence::new(storage.clone(), clock.clone());
    let wizard = BookingWizard::new(cart.clone(), persistence);
    Harness {
        wizard,
        cart,
        storage,
        clock,
    }
}

fn room(id: i64, name: &str) -> RoomView {
    RoomView {
        id,
        name: name.to_string(),
        room_type: LocationType::Private,
        capacity: 8,
        has_audio: true,
        images: vec![],
        description: None,
        amenities: vec!["Audio system".to_string()],
        surcharge: 0,
        is_available: true,
        booked_for_date: false,
    }
}

fn dishes(entries: &[(&str, u32)]) -> DishMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Fill basics for 2026-10-24 19:30 and move to the room step
fn fill_basics(wizard: &mut BookingWizard) {
    wizard.set_date(NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()).unwrap();
    wizard.set_time(NaiveTime::from_hms_opt(19, 30, 0).unwrap()).unwrap();
    wizard.set_guest_count(4).unwrap();
    assert_eq!(wizard.continue_from_basics().unwrap(), BookingStep::Room);
}

/// Drive a wizard all the way to Confirm with contact details filled in
fn reach_confirm(h: &mut Harness) {
    h.cart.add("12");
    fill_basics(&mut h.wizard);
    assert_eq!(h.wizard.select_room(&room(4, "Jade Room")).unwrap(), BookingStep::Confirm);
    h.wizard.set_customer_name("Ana").unwrap();
    h.wizard.set_customer_phone("600111222").unwrap();
}

fn confirmation(id: i64) -> BookingConfirmation {
    BookingConfirmation {
        id,
        reference: Some(format!("BK-{}", id)),
        status: Some("confirmed".to_string()),
    }
}
