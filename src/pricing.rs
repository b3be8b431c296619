// Display-only price quotes. The API's `totalPrice` is authoritative.
use crate::models::RoomType;
use crate::validation::{self, DateRangeError};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid nightly rate: {0:?}")]
    InvalidRate(String),

    #[error(transparent)]
    Dates(#[from] DateRangeError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub nights: i64,
    pub nightly_rate: f64,
    pub total: f64,
}

/// Whole nights between two dates, rounded up.
///
/// Calendar dates carry no time component so the day difference is already
/// integral. A reversed range yields a negative count.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    let seconds = (check_out - check_in).num_seconds();
    seconds.div_euclid(86_400) + i64::from(seconds.rem_euclid(86_400) != 0)
}

pub fn parse_rate(base_price: &str) -> Result<f64, PricingError> {
    base_price
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
        .ok_or_else(|| PricingError::InvalidRate(base_price.to_string()))
}

pub fn quote(room_type: &RoomType, check_in: NaiveDate, check_out: NaiveDate) -> Result<PriceQuote, PricingError> {
    let rate = parse_rate(&room_type.base_price)?;
    Ok(quote_with_rate(rate, check_in, check_out))
}

fn quote_with_rate(nightly_rate: f64, check_in: NaiveDate, check_out: NaiveDate) -> PriceQuote {
    let nights = nights_between(check_in, check_out);
    PriceQuote {
        nights,
        nightly_rate,
        total: nights as f64 * nightly_rate,
    }
}

/// Quotes a stay from raw form input, validating the dates and the rate.
pub fn quote_stay(room_type: &RoomType, check_in: &str, check_out: &str) -> Result<PriceQuote, PricingError> {
    let (check_in, check_out) = validation::validate_stay(check_in, check_out)?;
    quote(room_type, check_in, check_out)
}

/// Price shown next to a search result, before the guest has necessarily
/// picked dates: falls back to a single night while either date is blank.
/// Once both are filled in, the stay is validated like [`quote_stay`].
pub fn quote_display(room_type: &RoomType, check_in: &str, check_out: &str) -> Result<PriceQuote, PricingError> {
    if check_in.trim().is_empty() || check_out.trim().is_empty() {
        let rate = parse_rate(&room_type.base_price)?;
        return Ok(PriceQuote {
            nights: 1,
            nightly_rate: rate,
            total: rate,
        });
    }
    quote_stay(room_type, check_in, check_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use test_case::test_case;

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    #[test_case("2025-06-01", "2025-06-04", "100", 3, 300.0; "#1 three nights")]
    #[test_case("2025-06-01", "2025-06-02", "89.99", 1, 89.99; "#2 single night")]
    #[test_case("2025-12-30", "2026-01-02", "120.5", 3, 361.5; "#3 across new year")]
    #[test_case("2024-02-28", "2024-03-01", "75", 2, 150.0; "#4 leap day")]
    fn test_quote_stay(check_in: &str, check_out: &str, rate: &str, nights: i64, total: f64) {
        let room = fixtures::room("room-1", rate);
        let quote = quote_stay(&room.room_type, check_in, check_out).unwrap();

        assert_eq!(quote.nights, nights);
        assert_eq!(quote.total, nights as f64 * rate.parse::<f64>().unwrap());
        assert!((quote.total - total).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_unrounded_product() {
        let room = fixtures::room("room-1", "33.33");
        let quote = quote(&room.room_type, date("2025-06-01"), date("2025-06-08")).unwrap();

        assert_eq!(quote.nights, 7);
        assert_eq!(quote.total, 7.0 * 33.33);
    }

    #[test]
    fn test_nights_reversed_is_negative() {
        assert_eq!(nights_between(date("2025-06-04"), date("2025-06-01")), -3);
        assert_eq!(nights_between(date("2025-06-01"), date("2025-06-01")), 0);
    }

    #[test]
    fn test_invalid_rate() {
        let room = fixtures::room("room-1", "call us");

        assert_eq!(
            quote_stay(&room.room_type, "2025-06-01", "2025-06-04"),
            Err(PricingError::InvalidRate("call us".to_string()))
        );
        assert!(quote(&room.room_type, date("2025-06-01"), date("2025-06-04")).is_err());
    }

    #[test]
    fn test_invalid_dates_surface_date_error() {
        let room = fixtures::room("room-1", "100");

        assert_eq!(
            quote_stay(&room.room_type, "2025-06-04", "2025-06-04"),
            Err(PricingError::Dates(DateRangeError::CheckOutNotAfterCheckIn))
        );
    }

    #[test_case("", "", 1, 129.99; "#1 no dates")]
    #[test_case("2025-06-01", "", 1, 129.99; "#2 check-out missing")]
    #[test_case("  ", "2025-06-04", 1, 129.99; "#3 blank check-in")]
    #[test_case("2025-06-01", "2025-06-04", 3, 3.0 * 129.99; "#4 both dates")]
    fn test_quote_display(check_in: &str, check_out: &str, nights: i64, total: f64) {
        let room = fixtures::room("room-1", "129.99");
        let quote = quote_display(&room.room_type, check_in, check_out).unwrap();

        assert_eq!(quote.nights, nights);
        assert_eq!(quote.nightly_rate, 129.99);
        assert_eq!(quote.total, total);
    }

    #[test]
    fn test_quote_display_errors() {
        let room = fixtures::room("room-1", "call us");
        assert_eq!(
            quote_display(&room.room_type, "", ""),
            Err(PricingError::InvalidRate("call us".to_string()))
        );

        let room = fixtures::room("room-1", "100");
        assert_eq!(
            quote_display(&room.room_type, "2025-06-04", "2025-06-01"),
            Err(PricingError::Dates(DateRangeError::CheckOutNotAfterCheckIn))
        );
    }
}
