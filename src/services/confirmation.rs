use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, PartyRole};
use crate::services::notifications::notify_detached;
use crate::services::phase::{self, Phase};
use crate::state::AppState;

/// Which side of the booking the actor is on. Anyone else gets nothing.
pub fn party_role_for(booking: &Booking, actor_id: &str) -> Result<PartyRole, AppError> {
    if booking.host_id == actor_id {
        Ok(PartyRole::Host)
    } else if booking.shopper_id == actor_id {
        Ok(PartyRole::Shopper)
    } else {
        Err(AppError::Forbidden)
    }
}

/// Records one party's end-of-rental confirmation. Idempotent per party;
/// the second party's confirmation completes the booking and releases the
/// escrowed funds to the host, exactly once even under concurrent calls.
pub async fn confirm(
    state: &Arc<AppState>,
    booking_id: &str,
    actor_id: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let (booking, role, won_completion, wrote) = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        let role = party_role_for(&booking, actor_id)?;

        match phase::resolve_phase(&booking, now) {
            Phase::EndedAwaitingConfirmation => {}
            // Repeat confirm after completion stays a no-op.
            Phase::Completed if confirmed_by(&booking, role) => return Ok(booking),
            Phase::Disputed => {
                return Err(AppError::Conflict(
                    "This booking has an open dispute.".to_string(),
                ))
            }
            _ => {
                return Err(AppError::Conflict(
                    "Confirmation is only available once the rental has ended.".to_string(),
                ))
            }
        }

        let wrote = queries::set_confirmation(&db, booking_id, role, now)?;

        // Re-read: the other party may have confirmed in between.
        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

        let won = if booking.both_confirmed() {
            queries::complete_booking(&db, booking_id, now)?
        } else {
            false
        };

        let booking = if won {
            queries::get_booking_by_id(&db, booking_id)?
                .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?
        } else {
            booking
        };

        (booking, role, won, wrote)
    };

    if won_completion {
        // The completion is already durable; a failed release is retried
        // out of band, never rolled back.
        if let Err(e) = state.gateway.release_funds(booking_id).await {
            tracing::error!(error = %e, booking_id = %booking_id, "fund release failed");
        }
        notify_detached(
            state,
            &booking.host_id,
            "booking_completed",
            "Your rental is complete and the payout has been released.",
        );
    } else if wrote {
        // A repeat confirm by the same party writes nothing and must not
        // re-nag the other side.
        let counterpart = match role {
            PartyRole::Host => &booking.shopper_id,
            PartyRole::Shopper => &booking.host_id,
        };
        notify_detached(
            state,
            counterpart,
            "confirmation_requested",
            "The other party confirmed the rental went smoothly. Please confirm on your side.",
        );
    }

    Ok(booking)
}

fn confirmed_by(booking: &Booking, role: PartyRole) -> bool {
    match role {
        PartyRole::Host => booking.host_confirmed_at.is_some(),
        PartyRole::Shopper => booking.shopper_confirmed_at.is_some(),
    }
}

/// Opens a dispute during the post-rental grace window. An open dispute
/// freezes the fund release until staff close it.
pub async fn open_dispute(
    state: &Arc<AppState>,
    booking_id: &str,
    actor_id: &str,
    reason: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let reason = reason.trim();
    if reason.len() < 10 {
        return Err(AppError::Validation(
            "Please describe the problem in at least 10 characters.".to_string(),
        ));
    }

    let (booking, role) = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        let role = party_role_for(&booking, actor_id)?;

        if phase::resolve_phase(&booking, now) != Phase::EndedAwaitingConfirmation {
            return Err(AppError::Conflict(
                "Disputes can only be opened after the rental ends, before it completes."
                    .to_string(),
            ));
        }

        if !queries::open_dispute(&db, booking_id, reason, now)? {
            return Err(AppError::Conflict(
                "A dispute is already open on this booking.".to_string(),
            ));
        }

        let booking = queries::get_booking_by_id(&db, booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        (booking, role)
    };

    let counterpart = match role {
        PartyRole::Host => &booking.shopper_id,
        PartyRole::Shopper => &booking.host_id,
    };
    notify_detached(
        state,
        counterpart,
        "dispute_opened",
        "A dispute was opened on your booking. Our team will be in touch.",
    );

    Ok(booking)
}

/// Staff resolution. The booking drops back into the confirmation flow;
/// if the grace window already lapsed the sweep closes it out.
pub fn close_dispute(
    state: &Arc<AppState>,
    booking_id: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let db = state.db.lock().unwrap();

    if !queries::close_dispute(&db, booking_id, now)? {
        return Err(AppError::Conflict(
            "No open dispute on this booking.".to_string(),
        ));
    }

    queries::get_booking_by_id(&db, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))
}

/// Periodic sweep that force-completes paid bookings whose grace window
/// elapsed without both confirmations or a dispute. Returns how many
/// bookings were closed this pass.
pub async fn sweep_auto_close(state: &Arc<AppState>, now: NaiveDateTime) -> anyhow::Result<usize> {
    let closed: Vec<Booking> = {
        let db = state.db.lock().unwrap();

        let candidates = queries::auto_close_candidates(&db, now.date())?;
        let mut closed = vec![];
        for booking in candidates {
            if !phase::auto_close_due(&booking, now) {
                continue;
            }
            if queries::complete_booking(&db, &booking.id, now)? {
                closed.push(booking);
            }
        }
        closed
    };

    for booking in &closed {
        tracing::info!(booking_id = %booking.id, "auto-closed after grace window");
        if let Err(e) = state.gateway.release_funds(&booking.id).await {
            tracing::error!(error = %e, booking_id = %booking.id, "fund release failed");
        }
        notify_detached(
            state,
            &booking.host_id,
            "booking_completed",
            "Your rental auto-completed and the payout has been released.",
        );
    }

    Ok(closed.len())
}
