use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::actor_id;
use crate::db::queries::{self, HostStats};
use crate::errors::AppError;
use crate::models::{Booking, DocumentUpload, PartyRole};
use crate::services::confirmation::{self, party_role_for};
use crate::services::deposit::{self, DepositAction};
use crate::services::phase::{self, Phase};
use crate::services::lifecycle;
use crate::state::AppState;

/// A booking as clients see it: the stored row plus the derived phase and,
/// when applicable, the auto-close countdown.
#[derive(Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub phase: Phase,
    pub auto_close_seconds: Option<i64>,
}

impl BookingView {
    fn build(booking: Booking, now: chrono::NaiveDateTime) -> Self {
        let phase = phase::resolve_phase(&booking, now);
        let auto_close_seconds = phase::auto_close_countdown(&booking, now);
        Self {
            booking,
            phase,
            auto_close_seconds,
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub role: PartyRole,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let actor = actor_id(&headers)?;
    let now = Utc::now().naive_utc();
    let limit = params.limit.unwrap_or(100).clamp(1, 500);

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_bookings_for_party(&db, params.role, &actor, params.status.as_deref(), limit)?
    };

    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingView::build(b, now))
            .collect(),
    ))
}

#[derive(Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub view: BookingView,
    pub uploads: Vec<DocumentUpload>,
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BookingDetail>, AppError> {
    let actor = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let (booking, uploads) = {
        let db = state.db.lock().unwrap();
        let booking = queries::get_booking_by_id(&db, &booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        party_role_for(&booking, &actor)?;
        let uploads = queries::get_uploads_for_booking(&db, &booking_id)?;
        (booking, uploads)
    };

    Ok(Json(BookingDetail {
        view: BookingView::build(booking, now),
        uploads,
    }))
}

#[derive(Deserialize, Default)]
pub struct HostResponseBody {
    pub message: Option<String>,
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<HostResponseBody>>,
) -> Result<Json<BookingView>, AppError> {
    let host = actor_id(&headers)?;
    let now = Utc::now().naive_utc();
    let message = body.as_ref().and_then(|b| b.message.as_deref());

    let booking = lifecycle::approve(&state, &booking_id, &host, message, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

pub async fn decline(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<HostResponseBody>>,
) -> Result<Json<BookingView>, AppError> {
    let host = actor_id(&headers)?;
    let now = Utc::now().naive_utc();
    let reason = body.as_ref().and_then(|b| b.message.as_deref());

    let booking = lifecycle::decline(&state, &booking_id, &host, reason, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

#[derive(Deserialize)]
pub struct CancelBody {
    pub refund_cents: i64,
    pub reason: String,
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CancelBody>,
) -> Result<Json<BookingView>, AppError> {
    let host = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let booking =
        lifecycle::cancel(&state, &booking_id, &host, body.refund_cents, &body.reason, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

pub async fn shopper_cancel(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BookingView>, AppError> {
    let shopper = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let booking = lifecycle::shopper_cancel(&state, &booking_id, &shopper, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

pub async fn pay(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, AppError> {
    let shopper = actor_id(&headers)?;

    let checkout_url = lifecycle::request_checkout(&state, &booking_id, &shopper).await?;
    Ok(Json(CheckoutResponse { checkout_url }))
}

pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BookingView>, AppError> {
    let actor = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let booking = confirmation::confirm(&state, &booking_id, &actor, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

#[derive(Deserialize)]
pub struct DisputeBody {
    pub reason: String,
}

pub async fn open_dispute(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<DisputeBody>,
) -> Result<Json<BookingView>, AppError> {
    let actor = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let booking = confirmation::open_dispute(&state, &booking_id, &actor, &body.reason, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

/// Staff-side dispute resolution. Closing a dispute unfreezes the fund
/// release, so neither booking party may do it; the staff key is required.
pub async fn close_dispute(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BookingView>, AppError> {
    super::require_staff(&state.config.admin_api_key, &headers)?;
    let now = Utc::now().naive_utc();

    let booking = confirmation::close_dispute(&state, &booking_id, now)?;
    Ok(Json(BookingView::build(booking, now)))
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DepositBody {
    Refund {
        notes: Option<String>,
    },
    Deduct {
        deduction_cents: i64,
        notes: String,
    },
    Forfeit {
        notes: String,
    },
}

pub async fn settle_deposit(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<DepositBody>,
) -> Result<Json<BookingView>, AppError> {
    let host = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let action = match body {
        DepositBody::Refund { notes } => DepositAction::Refund { notes },
        DepositBody::Deduct {
            deduction_cents,
            notes,
        } => DepositAction::Deduct {
            deduction_cents,
            notes,
        },
        DepositBody::Forfeit { notes } => DepositAction::Forfeit { notes },
    };

    let booking = deposit::settle(&state, &booking_id, &host, action, now).await?;
    Ok(Json(BookingView::build(booking, now)))
}

pub async fn host_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HostStats>, AppError> {
    let host = actor_id(&headers)?;
    let today = Utc::now().date_naive();

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_host_stats(&db, &host, today)?
    };

    Ok(Json(stats))
}
