use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, DepositStatus};
use crate::services::notifications::notify_detached;
use crate::state::AppState;

/// Host's deposit resolution. Settlement is single-shot: the guarded
/// update only fires while the deposit is still `charged`.
#[derive(Debug, Clone)]
pub enum DepositAction {
    /// Return the full deposit to the shopper.
    Refund { notes: Option<String> },
    /// Keep part for damages, refund the rest. Notes are mandatory.
    Deduct { deduction_cents: i64, notes: String },
    /// Keep the whole deposit. Notes are mandatory.
    Forfeit { notes: String },
}

pub async fn settle(
    state: &Arc<AppState>,
    booking_id: &str,
    host_id: &str,
    action: DepositAction,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let (booking, deposit) = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        if booking.host_id != host_id {
            return Err(AppError::Forbidden);
        }

        let deposit = booking.deposit_cents.filter(|c| *c > 0).ok_or_else(|| {
            AppError::Conflict("This booking has no deposit.".to_string())
        })?;
        if booking.deposit_status != Some(DepositStatus::Charged) {
            return Err(AppError::Conflict(
                "The deposit has already been settled or was never charged.".to_string(),
            ));
        }
        if now.date() <= booking.end_date {
            return Err(AppError::Conflict(
                "The deposit can only be settled after the rental ends.".to_string(),
            ));
        }
        if !matches!(
            booking.status,
            BookingStatus::Approved | BookingStatus::Completed
        ) {
            return Err(AppError::Conflict(
                "The deposit cannot be settled in this state.".to_string(),
            ));
        }

        let (status, deduction, notes) = match &action {
            DepositAction::Refund { notes } => {
                (DepositStatus::Refunded, None, notes.as_deref())
            }
            DepositAction::Deduct {
                deduction_cents,
                notes,
            } => {
                if *deduction_cents <= 0 || *deduction_cents > deposit {
                    return Err(AppError::Validation(
                        "Deduction must be positive and no more than the deposit.".to_string(),
                    ));
                }
                if notes.trim().is_empty() {
                    return Err(AppError::Validation(
                        "Notes are required when deducting from a deposit.".to_string(),
                    ));
                }
                (DepositStatus::Refunded, Some(*deduction_cents), Some(notes.as_str()))
            }
            DepositAction::Forfeit { notes } => {
                if notes.trim().is_empty() {
                    return Err(AppError::Validation(
                        "Notes are required when keeping a deposit.".to_string(),
                    ));
                }
                (DepositStatus::Forfeited, None, Some(notes.as_str()))
            }
        };

        if !queries::settle_deposit(&db, booking_id, status, deduction, notes, now)? {
            return Err(AppError::Conflict(
                "The deposit has already been settled.".to_string(),
            ));
        }

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        (booking, deposit)
    };

    // Gateway side effects happen after the settlement is durable. A failure
    // here is an operational retry, never a rollback.
    let result = match &action {
        DepositAction::Refund { .. } => state.gateway.issue_refund(booking_id, deposit).await,
        DepositAction::Deduct {
            deduction_cents, ..
        } => {
            state
                .gateway
                .issue_refund(booking_id, deposit - deduction_cents)
                .await
        }
        DepositAction::Forfeit { .. } => state.gateway.release_deposit(booking_id).await,
    };
    if let Err(e) = result {
        tracing::error!(error = %e, booking_id = %booking_id, "deposit gateway call failed");
    }

    let message = match &action {
        DepositAction::Refund { .. } => "Your security deposit has been refunded in full.",
        DepositAction::Deduct { .. } => {
            "Part of your security deposit was kept for damages; the rest has been refunded."
        }
        DepositAction::Forfeit { .. } => "Your security deposit was kept by the host.",
    };
    notify_detached(state, &booking.shopper_id, "deposit_settled", message);

    Ok(booking)
}
