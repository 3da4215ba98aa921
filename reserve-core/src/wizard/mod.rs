//! BookingWizard - 预订向导状态机
//!
//! Owns the [`BookingSession`], moves it between steps, keeps its dish
//! selection in line with the shared cart and writes it through
//! [`SessionPersistence`] after every mutation.
//!
//! # Steps
//!
//! ```text
//! Basics ──continue──▶ Room ──select / continue──▶ Menu ──continue──▶ Confirm ──submit──▶ Submitted
//!                            └──────── dishes already chosen ────────▶┘
//! ```
//!
//! `back()` moves one step down from Room, Menu or Confirm without checks.
//!
//! # Cart reconciliation
//!
//! The cart can change behind the wizard's back (menu pages mutate it
//! directly). [`BookingWizard::sync_cart`] runs the pure [`reconcile`]
//! reducer against the live cart; every wizard operation calls it first, and
//! UIs call it after mutating the cart themselves. The session is only
//! re-persisted when the merge actually changed something.

mod error;
mod reconcile;

pub use error::*;
pub use reconcile::reconcile;

use crate::availability::RoomView;
use crate::cart::{CartStore, DishMap};
use crate::clock::Clock;
use crate::session::{BookingSession, BookingStep, SessionPersistence};
use crate::submission::build_booking_request;
use chrono::{NaiveDate, NaiveTime, Timelike};
use shared::{BookingConfirmation, BookingRequest, LocationType};
use std::sync::Arc;

/// Context handed to the menu page when the wizard sends the user there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuContext {
    /// Show a "back to booking" action instead of the normal checkout
    ReturnToBooking,
}

/// What the success view shows
#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    pub confirmation: BookingConfirmation,
    pub customer_name: String,
    pub customer_phone: String,
}

pub struct BookingWizard {
    session: BookingSession,
    cart: CartStore,
    persistence: SessionPersistence,
    clock: Arc<dyn Clock>,
    cart_revision: u64,
    menu_context: Option<MenuContext>,
    submitting: bool,
    /// Last payload sent; its id is reused while the payload is unchanged
    pending_request: Option<BookingRequest>,
    last_error: Option<String>,
    receipt: Option<BookingReceipt>,
}

impl std::fmt::Debug for BookingWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingWizard")
            .field("step", &self.session.step)
            .field("submitting", &self.submitting)
            .field("completed", &self.persistence.is_completed())
            .finish_non_exhaustive()
    }
}

impl BookingWizard {
    /// Restore the last fresh session, or start a default one
    pub fn new(cart: CartStore, persistence: SessionPersistence) -> Self {
        let clock = persistence.clock().clone();
        let mut session = persistence.load().unwrap_or_default();
        let (live_cart, cart_revision) = cart.snapshot_with_revision();

        // deletions made while no wizard was running show up against cart_seen
        let merged = reconcile(&session.cart_seen, &live_cart, &session.selected_dishes);
        let changed = merged != session.selected_dishes || live_cart != session.cart_seen;
        session.selected_dishes = merged;
        session.cart_seen = live_cart;

        let wizard = Self {
            session,
            cart,
            persistence,
            clock,
            cart_revision,
            menu_context: None,
            submitting: false,
            pending_request: None,
            last_error: None,
            receipt: None,
        };
        if changed {
            wizard.persist();
        }

        tracing::debug!(step = wizard.session.step.number(), "Booking wizard ready");
        wizard
    }

    // ========== Accessors ==========

    pub fn session(&self) -> &BookingSession {
        &self.session
    }

    pub fn step(&self) -> BookingStep {
        self.session.step
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn menu_context(&self) -> Option<MenuContext> {
        self.menu_context
    }

    /// Confirm must be disabled while this is true
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_completed(&self) -> bool {
        self.persistence.is_completed()
    }

    /// Retry prompt from the last failed submission
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        self.receipt.as_ref()
    }

    pub fn can_go_back(&self) -> bool {
        !self.is_completed() && self.session.step.previous().is_some()
    }

    /// Cart ∪ selected dishes, reading the cart as it is right now
    pub fn merged_dishes(&self) -> DishMap {
        let cart = self.cart.snapshot();
        reconcile(&self.session.cart_seen, &cart, &self.session.selected_dishes)
    }

    // ========== Cart sync ==========

    /// Fold the live cart into `selected_dishes`
    ///
    /// Returns whether the dishes changed. The session is saved only when
    /// the dishes or the recorded cart contents differ.
    pub fn sync_cart(&mut self) -> bool {
        let (cart, revision) = self.cart.snapshot_with_revision();
        if revision == self.cart_revision {
            return false;
        }
        self.cart_revision = revision;

        let merged = reconcile(&self.session.cart_seen, &cart, &self.session.selected_dishes);
        let dishes_changed = merged != self.session.selected_dishes;
        if !dishes_changed && cart == self.session.cart_seen {
            return false;
        }

        self.session.cart_seen = cart;
        if dishes_changed {
            tracing::debug!(dishes = merged.len(), "Dishes reconciled with cart");
            self.session.selected_dishes = merged;
        }
        self.persist();
        dishes_changed
    }

    // ========== Field edits ==========

    pub fn set_guest_count(&mut self, guest_count: u32) -> WizardResult<()> {
        self.ensure_open()?;
        if guest_count == 0 {
            return Err(ValidationError::InvalidGuestCount.into());
        }
        self.edit(|s| s.guest_count = guest_count);
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> WizardResult<()> {
        self.ensure_open()?;
        self.edit(|s| s.date = Some(date));
        Ok(())
    }

    /// Bookings are made to the minute; seconds are dropped
    pub fn set_time(&mut self, time: NaiveTime) -> WizardResult<()> {
        self.ensure_open()?;
        let time = time
            .with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .unwrap_or(time);
        self.edit(|s| s.time = Some(time));
        Ok(())
    }

    /// Switching to outdoor drops the audio requirement
    pub fn set_location_type(&mut self, location_type: LocationType) -> WizardResult<()> {
        self.ensure_open()?;
        self.edit(|s| {
            s.location_type = location_type;
            if location_type == LocationType::Outdoor {
                s.audio_needed = false;
            }
        });
        Ok(())
    }

    pub fn set_audio_needed(&mut self, audio_needed: bool) -> WizardResult<()> {
        self.ensure_open()?;
        self.edit(|s| s.audio_needed = audio_needed);
        Ok(())
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) -> WizardResult<()> {
        self.ensure_open()?;
        let name = name.into();
        self.edit(|s| s.customer_name = name);
        Ok(())
    }

    pub fn set_customer_phone(&mut self, phone: impl Into<String>) -> WizardResult<()> {
        self.ensure_open()?;
        let phone = phone.into();
        self.edit(|s| s.customer_phone = phone);
        Ok(())
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> WizardResult<()> {
        self.ensure_open()?;
        let note = note.into();
        self.edit(|s| s.note = note);
        Ok(())
    }

    // ========== Transitions ==========

    /// Basics → Room
    pub fn continue_from_basics(&mut self) -> WizardResult<BookingStep> {
        self.ensure_open()?;
        self.ensure_step(BookingStep::Basics, "continue from basics")?;
        self.validate_basics()?;
        self.sync_cart();
        self.move_to(BookingStep::Room);
        Ok(self.session.step)
    }

    /// Pick a room and auto-advance past the room step
    ///
    /// Goes straight to Confirm when dishes are already chosen, otherwise to
    /// Menu with [`MenuContext::ReturnToBooking`].
    pub fn select_room(&mut self, room: &RoomView) -> WizardResult<BookingStep> {
        self.ensure_open()?;
        self.ensure_step(BookingStep::Room, "select a room")?;
        if !room.is_selectable() {
            return Err(WizardError::RoomUnavailable {
                room_id: room.id,
                room_name: room.name.clone(),
            });
        }

        self.sync_cart();
        self.session.selected_room = Some(room.clone());
        tracing::info!(room_id = room.id, room = %room.name, "Room selected");
        Ok(self.advance_past_room())
    }

    /// Room → Menu/Confirm keeping the current selection
    ///
    /// When `latest_rooms` is given (a fresh resolve for the current
    /// date/time), the selected room must still be selectable in it.
    pub fn continue_from_room(
        &mut self,
        latest_rooms: Option<&[RoomView]>,
    ) -> WizardResult<BookingStep> {
        self.ensure_open()?;
        self.ensure_step(BookingStep::Room, "continue from room")?;
        self.revalidate_room(latest_rooms)?;
        self.sync_cart();
        Ok(self.advance_past_room())
    }

    /// Check the selected room against a fresh room list
    pub fn revalidate_room(&self, latest_rooms: Option<&[RoomView]>) -> WizardResult<()> {
        let selected = self
            .session
            .selected_room
            .as_ref()
            .ok_or(ValidationError::NoRoomSelected)?;

        if let Some(rooms) = latest_rooms {
            let still_ok = rooms
                .iter()
                .any(|r| r.id == selected.id && r.is_selectable());
            if !still_ok {
                return Err(WizardError::RoomUnavailable {
                    room_id: selected.id,
                    room_name: selected.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Menu → Confirm
    pub fn continue_from_menu(&mut self) -> WizardResult<BookingStep> {
        self.ensure_open()?;
        self.ensure_step(BookingStep::Menu, "continue from menu")?;
        self.sync_cart();
        self.move_to(BookingStep::Confirm);
        Ok(self.session.step)
    }

    /// One step back, no validation
    pub fn back(&mut self) -> WizardResult<BookingStep> {
        self.ensure_open()?;
        let previous = self
            .session
            .step
            .previous()
            .ok_or(WizardError::InvalidTransition {
                from: self.session.step,
                action: "go back",
            })?;
        self.sync_cart();
        self.move_to(previous);
        Ok(previous)
    }

    // ========== Dishes ==========

    /// Add with quantity 1, or remove entirely if already chosen
    pub fn toggle_dish(&mut self, dish_id: &str) -> WizardResult<()> {
        self.ensure_open()?;
        if dish_id.trim().is_empty() {
            return Ok(());
        }
        self.sync_cart();
        if self.merged_dishes().contains_key(dish_id) {
            self.write_dish(dish_id, 0);
        } else {
            self.write_dish(dish_id, 1);
        }
        Ok(())
    }

    /// Set a quantity in both the wizard and the cart; ≤ 0 removes
    pub fn update_dish_qty(&mut self, dish_id: &str, qty: i64) -> WizardResult<()> {
        self.ensure_open()?;
        if dish_id.trim().is_empty() {
            return Ok(());
        }
        self.sync_cart();
        self.write_dish(dish_id, qty);
        Ok(())
    }

    /// Empty both the cart and the wizard dishes, step unchanged
    pub fn clear_dishes(&mut self) -> WizardResult<()> {
        self.ensure_open()?;
        self.cart.clear();
        self.session.selected_dishes.clear();
        self.refresh_baseline();
        self.persist();
        tracing::debug!("All dishes cleared");
        Ok(())
    }

    // ========== Submission ==========

    /// Validate the confirm step and build the booking payload
    ///
    /// Marks the submission in flight; the caller must follow up with
    /// [`complete_submission`](Self::complete_submission) or
    /// [`fail_submission`](Self::fail_submission).
    pub fn begin_submission(&mut self, duration_minutes: u32) -> WizardResult<BookingRequest> {
        self.ensure_open()?;
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        self.ensure_step(BookingStep::Confirm, "submit")?;
        self.sync_cart();
        self.validate_submission()?;

        let mut request = build_booking_request(
            &self.session,
            &self.merged_dishes(),
            duration_minutes,
            String::new(),
        )?;
        request.client_request_id = match &self.pending_request {
            Some(previous) if same_payload(previous, &request) => previous.client_request_id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        self.pending_request = Some(request.clone());

        self.submitting = true;
        self.last_error = None;
        Ok(request)
    }

    /// The booking went through
    ///
    /// Clears the cart and the stored session and blocks further saves. The
    /// step only moves to Submitted if the user is still on Confirm.
    pub fn complete_submission(&mut self, confirmation: BookingConfirmation) -> &BookingReceipt {
        self.submitting = false;
        self.pending_request = None;
        self.last_error = None;

        self.cart.clear();
        self.persistence.clear();
        self.persistence.mark_completed();
        self.session.selected_dishes.clear();
        self.refresh_baseline();

        if self.session.step == BookingStep::Confirm {
            self.session.step = BookingStep::Submitted;
        } else {
            tracing::info!(
                step = self.session.step.number(),
                "Booking completed after leaving the confirm step"
            );
        }

        tracing::info!(
            booking_id = confirmation.id,
            reference = ?confirmation.reference,
            "Booking submitted"
        );

        self.receipt.insert(BookingReceipt {
            confirmation,
            customer_name: self.session.customer_name.clone(),
            customer_phone: self.session.customer_phone.clone(),
        })
    }

    /// The submission failed; nothing is discarded
    pub fn fail_submission(&mut self, message: impl Into<String>) {
        self.submitting = false;
        let message = message.into();
        tracing::warn!(message = %message, "Booking submission failed");
        self.last_error = Some(message);
    }

    /// Start a new booking after a completed one
    pub fn start_over(&mut self) {
        self.persistence.reset();
        self.session = BookingSession::default();
        self.menu_context = None;
        self.submitting = false;
        self.pending_request = None;
        self.last_error = None;
        self.receipt = None;
        // cart-origin dishes come back in through the merge
        let (cart, revision) = self.cart.snapshot_with_revision();
        self.session.selected_dishes = cart.clone();
        self.session.cart_seen = cart;
        self.cart_revision = revision;
        self.persist();
        tracing::debug!("Booking wizard reset");
    }

    // ========== Internals ==========

    fn ensure_open(&self) -> WizardResult<()> {
        if self.persistence.is_completed() {
            return Err(WizardError::AlreadyCompleted);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: BookingStep, action: &'static str) -> WizardResult<()> {
        if self.session.step != expected {
            return Err(WizardError::InvalidTransition {
                from: self.session.step,
                action,
            });
        }
        Ok(())
    }

    fn validate_basics(&self) -> Result<(), ValidationError> {
        let date = self.session.date.ok_or(ValidationError::MissingDate)?;
        if self.session.time.is_none() {
            return Err(ValidationError::MissingTime);
        }
        if self.session.guest_count < 1 {
            return Err(ValidationError::InvalidGuestCount);
        }
        let today = self.clock.today();
        if date < today {
            return Err(ValidationError::DateInPast { date, today });
        }
        Ok(())
    }

    fn validate_submission(&self) -> Result<(), ValidationError> {
        if self.session.customer_name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.session.customer_phone.trim().is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        match &self.session.selected_room {
            Some(room) if room.id > 0 => Ok(()),
            _ => Err(ValidationError::NoRoomSelected),
        }
    }

    fn advance_past_room(&mut self) -> BookingStep {
        if self.merged_dishes().is_empty() {
            self.move_to(BookingStep::Menu);
            self.menu_context = Some(MenuContext::ReturnToBooking);
        } else {
            self.move_to(BookingStep::Confirm);
        }
        self.session.step
    }

    fn move_to(&mut self, step: BookingStep) {
        let from = self.session.step;
        self.session.step = step;
        self.menu_context = None;
        self.persist();
        tracing::debug!(from = from.number(), to = step.number(), "Booking step changed");
    }

    fn write_dish(&mut self, dish_id: &str, qty: i64) {
        if qty <= 0 {
            self.session.selected_dishes.remove(dish_id);
            self.cart.remove(dish_id);
        } else {
            let qty = u32::try_from(qty).unwrap_or(u32::MAX);
            self.session.selected_dishes.insert(dish_id.to_string(), qty);
            self.cart.set_quantity(dish_id, i64::from(qty));
        }
        self.refresh_baseline();
        self.persist();
    }

    /// Accept the cart as-is after the wizard itself wrote to it
    fn refresh_baseline(&mut self) {
        let (cart, revision) = self.cart.snapshot_with_revision();
        self.session.cart_seen = cart;
        self.cart_revision = revision;
    }

    fn edit(&mut self, f: impl FnOnce(&mut BookingSession)) {
        self.sync_cart();
        f(&mut self.session);
        self.persist();
    }

    fn persist(&self) {
        self.persistence.save(&self.session);
    }
}

/// Equal apart from the request id
fn same_payload(previous: &BookingRequest, next: &BookingRequest) -> bool {
    BookingRequest {
        client_request_id: previous.client_request_id.clone(),
        ..next.clone()
    } == *previous
}

#[cfg(test)]
mod tests;
