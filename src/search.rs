// Room availability search
use crate::api::{ApiError, BookingApi, RoomFilter};
use crate::models::Room;
use crate::validation::{self, DateRangeError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] DateRangeError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub check_in: String,
    pub check_out: String,
    pub max_price: Option<u32>,
    pub amenities: Vec<String>,
}

impl SearchQuery {
    pub fn new(check_in: impl Into<String>, check_out: impl Into<String>) -> Self {
        Self {
            check_in: check_in.into(),
            check_out: check_out.into(),
            ..Default::default()
        }
    }

    pub fn max_price(mut self, max_price: u32) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenities.push(amenity.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub rooms: Vec<Room>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct RoomSearch {
    api: Arc<dyn BookingApi>,
    state: watch::Sender<SearchState>,
}

impl RoomSearch {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Validates the stay, then queries the API once.
    ///
    /// A failed request keeps the rooms from the previous successful search
    /// alongside the error.
    pub async fn search(&self, query: SearchQuery) -> Result<usize, SearchError> {
        if let Err(e) = validation::validate_stay(&query.check_in, &query.check_out) {
            debug!(error = %e, "search rejected locally");
            self.state.send_modify(|s| s.error = Some(e.to_string()));
            return Err(e.into());
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let filter = RoomFilter {
            check_in: query.check_in.trim().to_string(),
            check_out: query.check_out.trim().to_string(),
            max_price: query.max_price,
            amenities: query.amenities,
        };
        let result = self.api.search_rooms(&filter).await;

        match result {
            Ok(rooms) => {
                let found = rooms.len();
                debug!(found, "search completed");
                self.state.send_modify(|s| {
                    s.rooms = rooms;
                    s.loading = false;
                });
                Ok(found)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
                Err(e.into())
            }
        }
    }

    pub fn clear(&self) {
        self.state.send_modify(|s| {
            s.rooms.clear();
            s.error = None;
        });
    }

    pub fn dismiss_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }
}
