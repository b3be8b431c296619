// Booking form: draft, validation, quote and submission
use crate::api::{ApiError, BookingApi};
use crate::models::{Booking, BookingRequest, Guest, Room};
use crate::pricing::{self, PriceQuote, PricingError};
use crate::validation::{self, GuestFieldErrors};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("No booking in progress")]
    NoDraft,

    #[error("{0}")]
    Invalid(GuestFieldErrors),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The in-progress booking for one room.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub room: Room,
    pub check_in: String,
    pub check_out: String,
    pub guest: Guest,
}

impl BookingDraft {
    pub fn new(room: Room, check_in: impl Into<String>, check_out: impl Into<String>) -> Self {
        Self {
            room,
            check_in: check_in.into(),
            check_out: check_out.into(),
            guest: Guest::blank(),
        }
    }

    pub fn quote(&self) -> Result<PriceQuote, PricingError> {
        pricing::quote_stay(&self.room.room_type, &self.check_in, &self.check_out)
    }

    /// Runs every field check and builds the request only if all pass.
    pub fn to_request(&self) -> Result<BookingRequest, GuestFieldErrors> {
        let mut errors = validation::validate_guest(&self.guest);
        let stay = match validation::validate_stay(&self.check_in, &self.check_out) {
            Ok(stay) => Some(stay),
            Err(e) => {
                errors.dates = Some(e.to_string());
                None
            }
        };

        match stay {
            Some((check_in, check_out)) if errors.is_empty() => Ok(BookingRequest {
                guest_details: self.guest.clone(),
                room_id: self.room.id.clone(),
                check_in_date: check_in,
                check_out_date: check_out,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    pub draft: Option<BookingDraft>,
    pub submitting: bool,
    pub field_errors: GuestFieldErrors,
    pub error: Option<String>,
    pub confirmed: Option<Booking>,
}

pub struct BookingSubmission {
    api: Arc<dyn BookingApi>,
    state: watch::Sender<SubmissionState>,
}

impl BookingSubmission {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        let (state, _) = watch::channel(SubmissionState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Opens a fresh draft for `room`, replacing any previous one.
    pub fn start(&self, room: Room, check_in: &str, check_out: &str) {
        debug!(room_id = %room.id, "booking draft opened");
        let draft = BookingDraft::new(room, check_in, check_out);
        self.state.send_modify(|s| {
            s.draft = Some(draft);
            s.field_errors = GuestFieldErrors::default();
            s.error = None;
            s.confirmed = None;
        });
    }

    /// Applies `edit` to the draft's guest. Returns false if no draft is open.
    pub fn edit_guest(&self, edit: impl FnOnce(&mut Guest)) -> bool {
        self.state.send_if_modified(|s| match s.draft.as_mut() {
            Some(draft) => {
                edit(&mut draft.guest);
                true
            }
            None => false,
        })
    }

    pub fn set_dates(&self, check_in: &str, check_out: &str) -> bool {
        self.state.send_if_modified(|s| match s.draft.as_mut() {
            Some(draft) => {
                draft.check_in = check_in.to_string();
                draft.check_out = check_out.to_string();
                true
            }
            None => false,
        })
    }

    pub fn quote(&self) -> Result<PriceQuote, SubmissionError> {
        let state = self.state.borrow();
        let draft = state.draft.as_ref().ok_or(SubmissionError::NoDraft)?;
        Ok(draft.quote()?)
    }

    pub fn discard(&self) {
        self.state.send_modify(|s| {
            s.draft = None;
            s.field_errors = GuestFieldErrors::default();
            s.error = None;
        });
    }

    /// Validates the open draft and, if every field passes, creates the
    /// booking. Invalid drafts never reach the API.
    pub async fn submit(&self) -> Result<Booking, SubmissionError> {
        let draft = self.state.borrow().draft.clone();
        let draft = draft.ok_or(SubmissionError::NoDraft)?;

        let request = match draft.to_request() {
            Ok(request) => request,
            Err(errors) => {
                debug!(%errors, "booking form rejected");
                self.state.send_modify(|s| s.field_errors = errors.clone());
                return Err(SubmissionError::Invalid(errors));
            }
        };

        self.state.send_modify(|s| {
            s.field_errors = GuestFieldErrors::default();
            s.submitting = true;
            s.error = None;
        });

        let result = self.api.create_booking(&request).await;

        match result {
            Ok(booking) => {
                info!(booking_id = %booking.id, room_id = %booking.room_id, "booking created");
                self.state.send_modify(|s| {
                    s.draft = None;
                    s.submitting = false;
                    s.confirmed = Some(booking.clone());
                });
                Ok(booking)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.submitting = false;
                });
                Err(e.into())
            }
        }
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Clears the confirmation once it has been shown.
    pub fn acknowledge(&self) {
        self.state.send_modify(|s| s.confirmed = None);
    }
}
