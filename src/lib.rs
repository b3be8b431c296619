// Client library for the hotel booking API

// Modules, leaf first
pub mod api;
pub mod bookings;
pub mod config;
pub mod models;
pub mod pricing;
pub mod search;
pub mod submission;
pub mod validation;

// Re-export key types for convenience
pub use api::{ApiError, BookingApi, ClientError, ClientStats, HttpBookingApi, RoomFilter};
pub use bookings::{BookingsState, GuestBookings};
pub use config::ClientConfig;
pub use models::{
    Booking, BookingId, BookingRequest, BookingStatus, Guest, Room, RoomStatus, RoomType,
};
pub use pricing::{PriceQuote, PricingError};
pub use search::{RoomSearch, SearchError, SearchQuery, SearchState};
pub use submission::{BookingDraft, BookingSubmission, SubmissionError, SubmissionState};
pub use validation::{DateRangeError, GuestFieldErrors};
