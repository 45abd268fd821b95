use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::actor_id;
use crate::db::queries;
use crate::errors::AppError;
use crate::services::wizard::{self, SubmitOutcome, WizardDraft, WizardStep};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PlanParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct PlanResponse {
    pub steps: Vec<WizardStep>,
    pub starting_step: usize,
}

/// The step sequence for this listing, computed once up front.
pub async fn step_plan(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Query(params): Query<PlanParams>,
) -> Result<Json<PlanResponse>, AppError> {
    let db = state.db.lock().unwrap();

    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let requirements = queries::get_requirements(&db, &listing_id)?;

    let steps = wizard::step_plan(
        listing.category.requires_business_info(),
        !requirements.is_empty(),
    );
    let dates_preselected = params.start_date.is_some() && params.end_date.is_some();

    Ok(Json(PlanResponse {
        steps,
        starting_step: wizard::starting_step(dates_preselected),
    }))
}

/// The shopper's saved draft for this listing, or a blank one.
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<WizardDraft>, AppError> {
    let shopper_id = actor_id(&headers)?;
    let db = state.db.lock().unwrap();

    let draft = queries::get_draft(&db, &shopper_id, &listing_id)?
        .and_then(|payload| serde_json::from_value(payload).ok())
        .unwrap_or_default();

    Ok(Json(draft))
}

/// Persists the draft as-is. Partial drafts are expected; validation only
/// runs when a step is advanced or the wizard is submitted.
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<WizardDraft>,
) -> Result<StatusCode, AppError> {
    let shopper_id = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let payload = serde_json::to_value(&draft)
        .map_err(|_| AppError::Validation("Malformed draft.".to_string()))?;

    let db = state.db.lock().unwrap();
    queries::save_draft(&db, &shopper_id, &listing_id, &payload, now)?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct StepCheckBody {
    pub step: WizardStep,
    pub draft: WizardDraft,
}

/// Validates a single step so the client can gate its Next button.
pub async fn check_step(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Json(body): Json<StepCheckBody>,
) -> Result<StatusCode, AppError> {
    let now = Utc::now().naive_utc();
    let db = state.db.lock().unwrap();

    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let requirements = queries::get_requirements(&db, &listing_id)?;
    let blocks = queries::get_blocked_dates(&db, &listing_id)?;
    let bookings = queries::get_bookings_for_listing(&db, &listing_id)?;

    wizard::validate_step(
        body.step,
        &body.draft,
        &listing,
        &requirements,
        &blocks,
        &bookings,
        now,
    )
    .map_err(AppError::Validation)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<WizardDraft>,
) -> Result<(StatusCode, Json<SubmitOutcome>), AppError> {
    let shopper_id = actor_id(&headers)?;
    let now = Utc::now().naive_utc();

    let outcome = wizard::submit(&state, &listing_id, &shopper_id, &draft, now).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}
