// A guest's bookings, keyed by the email they booked with
use crate::api::{ApiError, BookingApi};
use crate::models::{Booking, BookingId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingsState {
    pub email: Option<String>,
    pub bookings: Vec<Booking>,
    pub loading: bool,
    pub cancelling: Option<BookingId>,
    pub error: Option<String>,
}

pub struct GuestBookings {
    api: Arc<dyn BookingApi>,
    state: watch::Sender<BookingsState>,
}

impl GuestBookings {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        let (state, _) = watch::channel(BookingsState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<BookingsState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> BookingsState {
        self.state.borrow().clone()
    }

    /// Switches to another guest. The list reloads only when the email
    /// actually changes; a blank email empties it without a request.
    pub async fn track(&self, email: Option<&str>) -> Result<(), ApiError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let changed = self.state.send_if_modified(|s| {
            if s.email == email {
                return false;
            }
            s.email = email.clone();
            s.bookings.clear();
            true
        });

        if changed {
            self.load().await?;
        }
        Ok(())
    }

    /// Reloads the full list for the tracked email.
    pub async fn load(&self) -> Result<usize, ApiError> {
        let email = self.state.borrow().email.clone();
        let Some(email) = email else {
            self.state.send_modify(|s| s.bookings.clear());
            return Ok(0);
        };

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.api.bookings_by_email(&email).await;

        match result {
            Ok(bookings) => {
                let count = bookings.len();
                debug!(count, "bookings loaded");
                self.state.send_modify(|s| {
                    s.bookings = bookings;
                    s.loading = false;
                });
                Ok(count)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
                Err(e)
            }
        }
    }

    /// Fetches a single booking without touching the list.
    pub async fn lookup(&self, id: &BookingId) -> Result<Booking, ApiError> {
        let result = self.api.get_booking(id).await;
        if let Err(e) = &result {
            self.state.send_modify(|s| s.error = Some(e.to_string()));
        }
        result
    }

    /// Asks the API to cancel, then reloads the whole list from the API
    /// rather than patching the one record. On failure the list is left as
    /// it was.
    pub async fn cancel(&self, id: &BookingId) -> Result<(), ApiError> {
        self.state.send_modify(|s| {
            s.cancelling = Some(id.clone());
            s.error = None;
        });

        let result = self.api.cancel_booking(id).await;
        self.state.send_modify(|s| {
            s.cancelling = None;
            if let Err(e) = &result {
                s.error = Some(e.to_string());
            }
        });
        result?;

        info!(booking_id = %id, "booking cancelled");
        if let Err(e) = self.load().await {
            warn!(error = %e, "reload after cancel failed");
        }
        Ok(())
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }
}
