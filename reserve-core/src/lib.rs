//! Reservation core
//!
//! The multi-step booking session: a persisted, resumable wizard that
//! coordinates the shared cart, room availability, step progression and
//! submission to the booking API.
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`cart`] | Shared cart handle, persisted under its own key |
//! | [`session`] | Session snapshot persistence with a 15 minute TTL |
//! | [`availability`] | Room filtering and availability annotation |
//! | [`wizard`] | Step state machine and cart/dish reconciliation |
//! | [`submission`] | Booking payload and the submit round trip |

pub mod availability;
pub mod cart;
pub mod clock;
pub mod config;
pub mod session;
pub mod storage;
pub mod submission;
pub mod summary;
pub mod wizard;

pub use availability::{AvailabilityQuery, AvailabilityResolver, RoomView};
pub use cart::{CartStore, DishMap};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use session::{BookingSession, BookingStep, SessionPersistence, SessionRecord};
pub use storage::{KeyValueStore, MemoryStore, RedbStore, StorageError};
pub use submission::{SubmissionGateway, SubmitError};
pub use summary::OrderSummary;
pub use wizard::{BookingReceipt, BookingWizard, MenuContext, ValidationError, WizardError};
