use chrono::{Days, NaiveDateTime};
use serde::Serialize;

use crate::models::{Booking, BookingStatus, PaymentStatus};

/// Hours either party has after the rental ends to confirm or dispute
/// before the booking auto-closes.
pub const GRACE_HOURS: u64 = 24;

/// The display-facing lifecycle stage of a booking, derived fresh on every
/// read from the persisted fields plus the clock. Never persisted: a paid
/// booking flips from `Upcoming` to `HappeningNow` to
/// `EndedAwaitingConfirmation` purely by wall-clock progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    AwaitingPayment,
    Upcoming,
    HappeningNow,
    EndedAwaitingConfirmation,
    Disputed,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::AwaitingPayment => "awaiting_payment",
            Phase::Upcoming => "upcoming",
            Phase::HappeningNow => "happening_now",
            Phase::EndedAwaitingConfirmation => "ended_awaiting_confirmation",
            Phase::Disputed => "disputed",
            Phase::Completed => "completed",
        }
    }
}

/// First match wins. An open dispute outranks everything, freezing any
/// pending fund release regardless of confirmation timestamps.
pub fn resolve_phase(booking: &Booking, now: NaiveDateTime) -> Phase {
    if booking.has_open_dispute() {
        return Phase::Disputed;
    }

    match booking.status {
        BookingStatus::Completed => return Phase::Completed,
        BookingStatus::Pending => return Phase::Pending,
        // Terminal display bucket for cancelled/declined rows.
        BookingStatus::Cancelled | BookingStatus::Declined => return Phase::Completed,
        BookingStatus::Approved => {}
    }

    if booking.payment_status != PaymentStatus::Paid {
        return Phase::AwaitingPayment;
    }

    let today = now.date();
    if booking.start_date > today {
        Phase::Upcoming
    } else if today <= booking.end_date {
        Phase::HappeningNow
    } else if booking.both_confirmed() {
        Phase::Completed
    } else {
        Phase::EndedAwaitingConfirmation
    }
}

/// When the post-rental grace window closes: `GRACE_HOURS` after the end of
/// the booking's last day.
pub fn grace_deadline(booking: &Booking) -> NaiveDateTime {
    let end_of_last_day = booking
        .end_date
        .checked_add_days(Days::new(1))
        .unwrap_or(booking.end_date)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();
    end_of_last_day + chrono::Duration::hours(GRACE_HOURS as i64)
}

/// Seconds until auto-close, surfaced to clients as a live countdown.
/// `None` unless the booking is currently awaiting confirmation.
pub fn auto_close_countdown(booking: &Booking, now: NaiveDateTime) -> Option<i64> {
    if resolve_phase(booking, now) != Phase::EndedAwaitingConfirmation {
        return None;
    }
    Some((grace_deadline(booking) - now).num_seconds().max(0))
}

/// True once the grace window has elapsed with the booking still awaiting
/// confirmation; the sweep force-completes such bookings.
pub fn auto_close_due(booking: &Booking, now: NaiveDateTime) -> bool {
    resolve_phase(booking, now) == Phase::EndedAwaitingConfirmation
        && now >= grace_deadline(booking)
}
