use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::services::notifications::notify_detached;
use crate::state::AppState;

fn fetch_owned_by_host(
    db: &rusqlite::Connection,
    booking_id: &str,
    host_id: &str,
) -> Result<Booking, AppError> {
    let booking = queries::get_booking_by_id(db, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
    if booking.host_id != host_id {
        return Err(AppError::Forbidden);
    }
    Ok(booking)
}

pub async fn approve(
    state: &Arc<AppState>,
    booking_id: &str,
    host_id: &str,
    message: Option<&str>,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        fetch_owned_by_host(&db, booking_id, host_id)?;

        if !queries::approve_booking(&db, booking_id, message, now)? {
            return Err(AppError::Conflict(
                "Only pending requests can be approved.".to_string(),
            ));
        }
        queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?
    };

    notify_detached(
        state,
        &booking.shopper_id,
        "booking_approved",
        "Your booking request was approved. Complete payment to lock in your dates.",
    );

    Ok(booking)
}

pub async fn decline(
    state: &Arc<AppState>,
    booking_id: &str,
    host_id: &str,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        fetch_owned_by_host(&db, booking_id, host_id)?;

        if !queries::decline_booking(&db, booking_id, reason, now)? {
            return Err(AppError::Conflict(
                "Only pending requests can be declined.".to_string(),
            ));
        }
        queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?
    };

    notify_detached(
        state,
        &booking.shopper_id,
        "booking_declined",
        "Your booking request was declined by the host.",
    );

    Ok(booking)
}

/// Host cancels an approved, paid booking. The host decides the refund
/// amount; a reason is always required so the shopper hears why.
pub async fn cancel(
    state: &Arc<AppState>,
    booking_id: &str,
    host_id: &str,
    refund_cents: i64,
    reason: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation(
            "A cancellation reason is required.".to_string(),
        ));
    }

    let booking = {
        let db = state.db.lock().unwrap();
        let booking = fetch_owned_by_host(&db, booking_id, host_id)?;

        if refund_cents <= 0 || refund_cents > booking.total_price_cents {
            return Err(AppError::Validation(
                "Refund must be positive and no more than the amount paid.".to_string(),
            ));
        }

        if !queries::cancel_paid_booking(&db, booking_id, reason, now)? {
            return Err(AppError::Conflict(
                "Only approved, paid bookings can be cancelled this way.".to_string(),
            ));
        }
        queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?
    };

    if let Err(e) = state.gateway.issue_refund(booking_id, refund_cents).await {
        tracing::error!(error = %e, booking_id = %booking_id, "cancellation refund failed");
    }

    notify_detached(
        state,
        &booking.shopper_id,
        "booking_cancelled",
        &format!("The host cancelled your booking: {reason}"),
    );

    Ok(booking)
}

/// Shopper withdraws their own booking. A pending request just closes; an
/// approved, paid booking is refunded in full.
pub async fn shopper_cancel(
    state: &Arc<AppState>,
    booking_id: &str,
    shopper_id: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let (booking, refund_cents) = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if booking.shopper_id != shopper_id {
            return Err(AppError::Forbidden);
        }

        let refund_cents = match (booking.status, booking.payment_status) {
            (BookingStatus::Pending, _) => {
                if !queries::cancel_unpaid_booking(&db, booking_id, now)? {
                    return Err(AppError::Conflict(
                        "This booking can no longer be withdrawn.".to_string(),
                    ));
                }
                0
            }
            (BookingStatus::Approved, PaymentStatus::Paid) => {
                if !queries::cancel_paid_booking(&db, booking_id, "Cancelled by renter", now)? {
                    return Err(AppError::Conflict(
                        "This booking can no longer be cancelled.".to_string(),
                    ));
                }
                booking.total_price_cents
            }
            _ => {
                return Err(AppError::Conflict(
                    "This booking cannot be cancelled in its current state.".to_string(),
                ))
            }
        };

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        (booking, refund_cents)
    };

    if refund_cents > 0 {
        if let Err(e) = state.gateway.issue_refund(booking_id, refund_cents).await {
            tracing::error!(error = %e, booking_id = %booking_id, "cancellation refund failed");
        }
    }

    notify_detached(
        state,
        &booking.host_id,
        "booking_cancelled",
        "The renter cancelled their booking.",
    );

    Ok(booking)
}

/// The pay-now affordance: a fresh checkout session for a booking the
/// shopper still owes on, including instant-book rows whose original
/// checkout never went through.
pub async fn request_checkout(
    state: &Arc<AppState>,
    booking_id: &str,
    shopper_id: &str,
) -> Result<String, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if booking.shopper_id != shopper_id {
            return Err(AppError::Forbidden);
        }

        let payable = matches!(
            booking.status,
            BookingStatus::Approved | BookingStatus::Pending
        ) && matches!(
            booking.payment_status,
            PaymentStatus::Unpaid | PaymentStatus::Failed
        );
        // Only instant-book rows are payable while still pending.
        if !payable || (booking.status == BookingStatus::Pending && !booking.is_instant_book) {
            return Err(AppError::Conflict(
                "This booking is not awaiting payment.".to_string(),
            ));
        }
        booking
    };

    state
        .gateway
        .create_checkout_session(
            &booking.id,
            &booking.listing_id,
            booking.total_price_cents,
            booking.delivery_fee_cents,
            booking.deposit_cents.unwrap_or(0),
        )
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))
}
