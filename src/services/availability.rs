use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{BlockedDate, Booking, BookingStatus, Listing};

pub const HOURS_PER_DAY: i64 = 24;

#[derive(Debug)]
pub enum AvailabilityError {
    InvalidRange,
    Unavailable { date: NaiveDate },
}

impl std::fmt::Display for AvailabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityError::InvalidRange => {
                write!(f, "End date must be after the start date.")
            }
            AvailabilityError::Unavailable { date } => {
                write!(f, "{date} is not available for this listing. Please pick different dates.")
            }
        }
    }
}

/// Why a calendar day is or is not bookable. One field per rule so the
/// calendar UI can distinguish booked from blocked from buffered days.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DayStatus {
    pub past: bool,
    pub outside_window: bool,
    pub blocked: bool,
    pub booked: bool,
    pub pending: bool,
    pub in_buffer: bool,
}

impl DayStatus {
    pub fn unavailable(&self) -> bool {
        self.past
            || self.outside_window
            || self.blocked
            || self.booked
            || self.pending
            || self.in_buffer
    }
}

/// Pending and approved bookings both reserve dates; declined and cancelled
/// rows release immediately. Ended lifecycles never block future dates.
fn reserves_dates(booking: &Booking) -> bool {
    matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Approved
    )
}

fn is_hourly(booking: &Booking) -> bool {
    booking.start_hour.is_some() && booking.end_hour.is_some()
}

fn overlaps_day(booking: &Booking, date: NaiveDate) -> bool {
    booking.start_date <= date && date <= booking.end_date
}

pub fn day_status(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    today: NaiveDate,
) -> DayStatus {
    let mut status = DayStatus {
        past: date < today,
        ..DayStatus::default()
    };

    if let Some(from) = listing.available_from {
        if date < from {
            status.outside_window = true;
        }
    }
    if let Some(to) = listing.available_to {
        if date > to {
            status.outside_window = true;
        }
    }

    status.blocked = blocks
        .iter()
        .any(|b| b.date == date && b.is_whole_day());

    for booking in bookings.iter().filter(|b| reserves_dates(b)) {
        // Hourly reservations consume hours, not the whole day.
        if is_hourly(booking) {
            continue;
        }
        if overlaps_day(booking, date) {
            match booking.status {
                BookingStatus::Approved => status.booked = true,
                _ => status.pending = true,
            }
            continue;
        }
        if listing.buffer_days > 0 {
            let buffer = Duration::days(listing.buffer_days);
            let lo = booking.start_date - buffer;
            let hi = booking.end_date + buffer;
            if lo <= date && date <= hi {
                status.in_buffer = true;
            }
        }
    }

    status
}

pub fn is_date_unavailable(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    today: NaiveDate,
) -> bool {
    day_status(listing, blocks, bookings, date, today).unavailable()
}

pub fn is_date_booked(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    today: NaiveDate,
) -> bool {
    day_status(listing, blocks, bookings, date, today).booked
}

pub fn is_date_pending(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    today: NaiveDate,
) -> bool {
    day_status(listing, blocks, bookings, date, today).pending
}

pub fn is_date_blocked(blocks: &[BlockedDate], date: NaiveDate) -> bool {
    blocks.iter().any(|b| b.date == date && b.is_whole_day())
}

/// Validates a prospective day range and returns the number of chargeable
/// days. Run once at the wizard's date step and again at insert time under
/// the write lock, so a range that went stale between read and submit is
/// caught as a conflict.
pub fn validate_range(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<i64, AvailabilityError> {
    let days = (end - start).num_days();
    if days <= 0 {
        return Err(AvailabilityError::InvalidRange);
    }

    let mut date = start;
    while date <= end {
        if is_date_unavailable(listing, blocks, bookings, date, today) {
            return Err(AvailabilityError::Unavailable { date });
        }
        date = date + Duration::days(1);
    }

    Ok(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourWindow {
    pub start_hour: i64,
    pub end_hour: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DayAvailabilityInfo {
    pub has_full_day: bool,
    pub has_hourly_slots: bool,
    /// Hourly slots exist but the full day is gone.
    pub is_limited: bool,
}

/// Free hourly windows on a date, after subtracting hourly reservations and
/// hourly blocks and applying the listing's minimum-notice and
/// minimum-duration thresholds.
pub fn available_windows_for_date(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    now: NaiveDateTime,
) -> Vec<HourWindow> {
    if !listing.supports_hourly() {
        return vec![];
    }

    // A day lost to whole-day rules has no windows at all.
    let status = day_status(listing, blocks, bookings, date, now.date());
    if status.unavailable() {
        return vec![];
    }

    let mut busy = [false; HOURS_PER_DAY as usize];

    for booking in bookings.iter().filter(|b| reserves_dates(b)) {
        if !is_hourly(booking) || !overlaps_day(booking, date) {
            continue;
        }
        let (Some(from), Some(to)) = (booking.start_hour, booking.end_hour) else {
            continue;
        };
        mark_busy(&mut busy, i64::from(from), i64::from(to));
    }

    for block in blocks.iter().filter(|b| b.date == date && !b.is_whole_day()) {
        let from = block.start_hour.map_or(0, i64::from);
        let to = block.end_hour.map_or(HOURS_PER_DAY, i64::from);
        mark_busy(&mut busy, from, to);
    }

    // Minimum notice: the earliest hour a window may start today.
    let earliest = earliest_start_hour(listing, date, now);

    let mut windows = vec![];
    let mut hour = earliest.max(0);
    while hour < HOURS_PER_DAY {
        if busy[hour as usize] {
            hour += 1;
            continue;
        }
        let start = hour;
        while hour < HOURS_PER_DAY && !busy[hour as usize] {
            hour += 1;
        }
        if hour - start >= listing.min_duration_hours.max(1) {
            windows.push(HourWindow {
                start_hour: start,
                end_hour: hour,
            });
        }
    }

    windows
}

pub fn day_availability_info(
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    date: NaiveDate,
    now: NaiveDateTime,
) -> DayAvailabilityInfo {
    let status = day_status(listing, blocks, bookings, date, now.date());

    let hourly_consumption = bookings
        .iter()
        .any(|b| reserves_dates(b) && is_hourly(b) && overlaps_day(b, date))
        || blocks.iter().any(|b| b.date == date && !b.is_whole_day());

    let windows = available_windows_for_date(listing, blocks, bookings, date, now);
    let has_hourly_slots = !windows.is_empty();
    let has_full_day = !status.unavailable() && !hourly_consumption;

    DayAvailabilityInfo {
        has_full_day,
        has_hourly_slots,
        is_limited: has_hourly_slots && !has_full_day,
    }
}

fn mark_busy(busy: &mut [bool; HOURS_PER_DAY as usize], from: i64, to: i64) {
    let from = from.clamp(0, HOURS_PER_DAY);
    let to = to.clamp(0, HOURS_PER_DAY);
    for h in from..to {
        busy[h as usize] = true;
    }
}

fn earliest_start_hour(listing: &Listing, date: NaiveDate, now: NaiveDateTime) -> i64 {
    let cutoff = now + Duration::hours(listing.min_notice_hours);
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    if cutoff <= midnight {
        return 0;
    }
    let hours_in = (cutoff - midnight).num_hours();
    // Round up to the next whole hour when the cutoff lands mid-hour.
    if cutoff > midnight + Duration::hours(hours_in) {
        hours_in + 1
    } else {
        hours_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FulfillmentMethod, ListingCategory, ListingMode, PaymentStatus};
    use chrono::NaiveDateTime;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn listing() -> Listing {
        Listing {
            id: "l1".to_string(),
            host_id: "h1".to_string(),
            title: "Taco truck".to_string(),
            category: ListingCategory::FoodTruck,
            mode: ListingMode::Rent,
            daily_rate_cents: 10_000,
            weekly_rate_cents: None,
            hourly_rate_cents: Some(2_500),
            available_from: Some(date("2026-03-01")),
            available_to: Some(date("2026-12-31")),
            instant_book: false,
            allows_pickup: true,
            allows_delivery: true,
            allows_on_site: false,
            delivery_fee_cents: 0,
            deposit_cents: None,
            buffer_days: 0,
            min_notice_hours: 0,
            min_duration_hours: 2,
            created_at: dt("2026-01-01 00:00"),
        }
    }

    fn booking(start: &str, end: &str, status: BookingStatus) -> Booking {
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            listing_id: "l1".to_string(),
            host_id: "h1".to_string(),
            shopper_id: "s1".to_string(),
            start_date: date(start),
            end_date: date(end),
            start_hour: None,
            end_hour: None,
            total_price_cents: 0,
            delivery_fee_cents: 0,
            deposit_cents: None,
            status,
            payment_status: PaymentStatus::Unpaid,
            is_instant_book: false,
            host_confirmed_at: None,
            shopper_confirmed_at: None,
            dispute_status: None,
            dispute_opened_at: None,
            dispute_reason: None,
            deposit_status: None,
            deposit_deduction_cents: None,
            deposit_refund_notes: None,
            fulfillment_method: FulfillmentMethod::Pickup,
            delivery_address: None,
            message_to_host: None,
            host_response: None,
            business_info: None,
            created_at: dt("2026-01-01 00:00"),
            updated_at: dt("2026-01-01 00:00"),
        }
    }

    fn hourly_booking(day: &str, from: i32, to: i32) -> Booking {
        let mut b = booking(day, day, BookingStatus::Approved);
        b.start_hour = Some(from);
        b.end_hour = Some(to);
        b
    }

    #[test]
    fn test_past_dates_unavailable() {
        let l = listing();
        assert!(is_date_unavailable(&l, &[], &[], date("2026-03-01"), date("2026-03-02")));
    }

    #[test]
    fn test_outside_listing_window() {
        let l = listing();
        assert!(is_date_unavailable(&l, &[], &[], date("2027-01-10"), date("2026-03-01")));
        assert!(is_date_unavailable(&l, &[], &[], date("2026-02-20"), date("2026-02-01")));
    }

    #[test]
    fn test_blocked_date() {
        let l = listing();
        let blocks = [BlockedDate {
            listing_id: "l1".to_string(),
            date: date("2026-04-01"),
            start_hour: None,
            end_hour: None,
        }];
        assert!(is_date_blocked(&blocks, date("2026-04-01")));
        assert!(is_date_unavailable(&l, &blocks, &[], date("2026-04-01"), date("2026-03-01")));
    }

    #[test]
    fn test_pending_booking_soft_reserves() {
        let l = listing();
        let bookings = [booking("2026-04-10", "2026-04-12", BookingStatus::Pending)];
        assert!(is_date_pending(&l, &[], &bookings, date("2026-04-11"), date("2026-03-01")));
        assert!(is_date_unavailable(&l, &[], &bookings, date("2026-04-11"), date("2026-03-01")));
    }

    #[test]
    fn test_declined_and_cancelled_release() {
        let l = listing();
        let bookings = [
            booking("2026-04-10", "2026-04-12", BookingStatus::Declined),
            booking("2026-04-10", "2026-04-12", BookingStatus::Cancelled),
        ];
        assert!(!is_date_unavailable(&l, &[], &bookings, date("2026-04-11"), date("2026-03-01")));
    }

    #[test]
    fn test_buffer_zone() {
        let mut l = listing();
        l.buffer_days = 1;
        let bookings = [booking("2026-04-10", "2026-04-12", BookingStatus::Approved)];
        let status = day_status(&l, &[], &bookings, date("2026-04-13"), date("2026-03-01"));
        assert!(status.in_buffer);
        assert!(!status.booked);
        // Two days out is clear.
        assert!(!is_date_unavailable(&l, &[], &bookings, date("2026-04-14"), date("2026-03-01")));
    }

    #[test]
    fn test_validate_range_rejects_zero_days() {
        let l = listing();
        let result = validate_range(&l, &[], &[], date("2026-04-10"), date("2026-04-10"), date("2026-03-01"));
        assert!(matches!(result, Err(AvailabilityError::InvalidRange)));
    }

    #[test]
    fn test_validate_range_catches_mid_range_conflict() {
        let l = listing();
        let bookings = [booking("2026-04-11", "2026-04-11", BookingStatus::Approved)];
        let result = validate_range(&l, &[], &bookings, date("2026-04-10"), date("2026-04-13"), date("2026-03-01"));
        assert!(matches!(result, Err(AvailabilityError::Unavailable { .. })));
    }

    #[test]
    fn test_validate_range_counts_days() {
        let l = listing();
        let days = validate_range(&l, &[], &[], date("2026-03-10"), date("2026-03-13"), date("2026-03-01")).unwrap();
        assert_eq!(days, 3);
    }

    #[test]
    fn test_hourly_windows_subtract_reservations() {
        let l = listing();
        let bookings = [hourly_booking("2026-04-10", 10, 14)];
        let windows =
            available_windows_for_date(&l, &[], &bookings, date("2026-04-10"), dt("2026-03-01 09:00"));
        assert_eq!(
            windows,
            vec![
                HourWindow { start_hour: 0, end_hour: 10 },
                HourWindow { start_hour: 14, end_hour: 24 },
            ]
        );
    }

    #[test]
    fn test_hourly_windows_respect_min_duration() {
        let mut l = listing();
        l.min_duration_hours = 4;
        let bookings = [
            hourly_booking("2026-04-10", 0, 9),
            hourly_booking("2026-04-10", 12, 24),
        ];
        // Only a 3-hour gap remains; too short.
        let windows =
            available_windows_for_date(&l, &[], &bookings, date("2026-04-10"), dt("2026-03-01 09:00"));
        assert!(windows.is_empty());
    }

    #[test]
    fn test_hourly_windows_respect_min_notice() {
        let mut l = listing();
        l.min_notice_hours = 3;
        let windows =
            available_windows_for_date(&l, &[], &[], date("2026-04-10"), dt("2026-04-10 08:30"));
        assert_eq!(windows, vec![HourWindow { start_hour: 12, end_hour: 24 }]);
    }

    #[test]
    fn test_partial_hourly_day_is_not_booked() {
        let l = listing();
        let bookings = [hourly_booking("2026-04-10", 10, 14)];
        assert!(!is_date_booked(&l, &[], &bookings, date("2026-04-10"), date("2026-03-01")));

        let info =
            day_availability_info(&l, &[], &bookings, date("2026-04-10"), dt("2026-03-01 09:00"));
        assert!(!info.has_full_day);
        assert!(info.has_hourly_slots);
        assert!(info.is_limited);
    }

    #[test]
    fn test_untouched_day_has_full_day() {
        let l = listing();
        let info = day_availability_info(&l, &[], &[], date("2026-04-10"), dt("2026-03-01 09:00"));
        assert!(info.has_full_day);
        assert!(info.has_hourly_slots);
        assert!(!info.is_limited);
    }
}
