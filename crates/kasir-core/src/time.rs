//! # Business Date Module
//!
//! One place for the store-local calendar rules.
//!
//! A sale at 23:30 UTC belongs to the *next* calendar day for a store at
//! UTC+7. Every read and write path that needs "which day was this?" goes
//! through [`business_date_of`] so the offset lives in exactly one function,
//! parameterized by configuration instead of hard-coded at call sites.
//!
//! Two string formats are external contracts and must never drift:
//! - business date: `yyyy-MM-dd` (e.g. `2025-08-23`)
//! - invoice number: `{prefix}-{yyyyMMdd}-{4-digit sequence}`
//!   (e.g. `INV-20250823-0001`)

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Converts a UTC instant to the store-local calendar date.
///
/// ## Example
/// ```rust
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use kasir_core::time::business_date_of;
///
/// let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
/// // 18:30 UTC is already 01:30 the next day in Jakarta
/// let instant = Utc.with_ymd_and_hms(2025, 1, 1, 18, 30, 0).unwrap();
/// let date = business_date_of(instant, jakarta);
/// assert_eq!(date.to_string(), "2025-01-02");
/// ```
#[inline]
pub fn business_date_of(instant: DateTime<Utc>, store_offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&store_offset).date_naive()
}

/// Builds a `FixedOffset` from a configured offset in minutes east of UTC.
///
/// Returns `None` for out-of-range offsets (beyond ±24h), matching chrono's
/// own bounds.
#[inline]
pub fn store_offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes * 60)
}

/// Returns the UTC half-open interval `[start, end)` covering one store-local
/// calendar day.
///
/// Every instant `t` satisfies `start <= t < end` exactly when
/// `business_date_of(t, store_offset) == date`, so queries can filter UTC
/// timestamp columns without re-deriving the offset in SQL.
pub fn business_day_bounds(
    date: NaiveDate,
    store_offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let offset_seconds = TimeDelta::seconds(store_offset.local_minus_utc() as i64);
    let start = DateTime::<Utc>::from_naive_utc_and_offset(local_midnight - offset_seconds, Utc);
    (start, start + TimeDelta::days(1))
}

/// Formats a business date as `yyyy-MM-dd`.
#[inline]
pub fn format_business_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Builds an invoice number: `{prefix}-{yyyyMMdd}-{seq:04}`.
///
/// The sequence is zero-padded to four digits and keeps growing past 9999
/// rather than wrapping; padding is a display minimum, not a cap.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use kasir_core::time::invoice_number;
///
/// let date = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
/// assert_eq!(invoice_number("INV", date, 1), "INV-20250823-0001");
/// ```
#[inline]
pub fn invoice_number(prefix: &str, business_date: NaiveDate, seq: i64) -> String {
    format!("{}-{}-{:04}", prefix, business_date.format("%Y%m%d"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plus_seven() -> FixedOffset {
        store_offset_from_minutes(420).unwrap()
    }

    #[test]
    fn test_business_date_same_day() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 23, 10, 0, 0).unwrap();
        let date = business_date_of(instant, plus_seven());
        assert_eq!(format_business_date(date), "2025-08-23");
    }

    #[test]
    fn test_business_date_rolls_forward_at_utc_evening() {
        // 17:00 UTC = 00:00 next day at +7
        let instant = Utc.with_ymd_and_hms(2025, 8, 23, 17, 0, 0).unwrap();
        let date = business_date_of(instant, plus_seven());
        assert_eq!(format_business_date(date), "2025-08-24");
    }

    #[test]
    fn test_business_date_just_before_rollover() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 23, 16, 59, 59).unwrap();
        let date = business_date_of(instant, plus_seven());
        assert_eq!(format_business_date(date), "2025-08-23");
    }

    #[test]
    fn test_business_date_negative_offset() {
        // A store west of UTC shifts the other way: 02:00 UTC at -5 is
        // still the previous day.
        let lima = store_offset_from_minutes(-300).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 8, 23, 2, 0, 0).unwrap();
        let date = business_date_of(instant, lima);
        assert_eq!(format_business_date(date), "2025-08-22");
    }

    #[test]
    fn test_invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        assert_eq!(invoice_number("INV", date, 1), "INV-20250823-0001");
        assert_eq!(invoice_number("INV", date, 42), "INV-20250823-0042");
        assert_eq!(invoice_number("WRG", date, 9999), "WRG-20250823-9999");
    }

    #[test]
    fn test_invoice_number_grows_past_four_digits() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        assert_eq!(invoice_number("INV", date, 10_000), "INV-20250823-10000");
    }

    #[test]
    fn test_store_offset_bounds() {
        assert!(store_offset_from_minutes(420).is_some());
        assert!(store_offset_from_minutes(0).is_some());
        assert!(store_offset_from_minutes(24 * 60 + 1).is_none());
    }

    #[test]
    fn test_business_day_bounds_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 23).unwrap();
        let (start, end) = business_day_bounds(date, plus_seven());

        // Aug 23 at +7 runs from Aug 22 17:00 UTC to Aug 23 17:00 UTC.
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 22, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 8, 23, 17, 0, 0).unwrap());

        assert_eq!(business_date_of(start, plus_seven()), date);
        assert_eq!(
            business_date_of(end - TimeDelta::seconds(1), plus_seven()),
            date
        );
        assert_ne!(business_date_of(end, plus_seven()), date);
    }
}
