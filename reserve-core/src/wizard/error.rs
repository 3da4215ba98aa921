use crate::session::BookingStep;
use chrono::NaiveDate;
use thiserror::Error;

/// Missing or invalid input that blocks a transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Date is required")]
    MissingDate,

    #[error("Time is required")]
    MissingTime,

    #[error("Guest count must be at least 1")]
    InvalidGuestCount,

    #[error("Date {date} is in the past (today is {today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },

    #[error("Customer name is required")]
    MissingName,

    #[error("Customer phone is required")]
    MissingPhone,

    #[error("No room selected")]
    NoRoomSelected,
}

impl ValidationError {
    /// Inline text for the form
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingDate => "Please choose a date.".to_string(),
            Self::MissingTime => "Please choose a time.".to_string(),
            Self::InvalidGuestCount => "Please enter at least one guest.".to_string(),
            Self::DateInPast { .. } => "The selected date has already passed.".to_string(),
            Self::MissingName => "Please enter your name.".to_string(),
            Self::MissingPhone => "Please enter a phone number.".to_string(),
            Self::NoRoomSelected => "Please select a room.".to_string(),
        }
    }
}

/// Wizard errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Room {room_id} ({room_name}) is not available")]
    RoomUnavailable { room_id: i64, room_name: String },

    #[error("Cannot {action} at step {from}")]
    InvalidTransition {
        from: BookingStep,
        action: &'static str,
    },

    #[error("A booking submission is already in progress")]
    SubmissionInFlight,

    #[error("Booking already submitted")]
    AlreadyCompleted,
}

impl WizardError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.user_message(),
            Self::RoomUnavailable { room_name, .. } => format!(
                "{} is no longer available for this date and time. Please choose another room.",
                room_name
            ),
            Self::InvalidTransition { .. } => "That action is not available right now.".to_string(),
            Self::SubmissionInFlight => "Your booking is being submitted, please wait.".to_string(),
            Self::AlreadyCompleted => "This booking has already been submitted.".to_string(),
        }
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
