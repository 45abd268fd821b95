use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{DocumentRequirement, FulfillmentMethod, Listing};
use crate::services::availability::{self, DayStatus, HourWindow};
use crate::services::{pricing, wizard};
use crate::state::AppState;

const MAX_CALENDAR_DAYS: i64 = 366;

#[derive(Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub document_requirements: Vec<DocumentRequirement>,
}

pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingDetail>, AppError> {
    let db = state.db.lock().unwrap();

    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let document_requirements = queries::get_requirements(&db, &listing_id)?;

    Ok(Json(ListingDetail {
        listing,
        document_requirements,
    }))
}

#[derive(Deserialize)]
pub struct CalendarParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: DayStatus,
    pub has_full_day: bool,
    pub has_hourly_slots: bool,
    pub is_limited: bool,
}

/// Day-by-day availability calendar. Defaults to the next 90 days.
pub async fn availability_calendar(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<Vec<CalendarDay>>, AppError> {
    let now = Utc::now().naive_utc();
    let today = now.date();
    let start = params.start.unwrap_or(today);
    let end = params.end.unwrap_or(start + Duration::days(90));

    if end < start || (end - start).num_days() > MAX_CALENDAR_DAYS {
        return Err(AppError::Validation(
            "Calendar range must be within one year.".to_string(),
        ));
    }

    let db = state.db.lock().unwrap();
    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let blocks = queries::get_blocked_dates(&db, &listing_id)?;
    let bookings = queries::get_bookings_for_listing(&db, &listing_id)?;

    let mut days = vec![];
    let mut date = start;
    while date <= end {
        let status = availability::day_status(&listing, &blocks, &bookings, date, today);
        let info = availability::day_availability_info(&listing, &blocks, &bookings, date, now);
        days.push(CalendarDay {
            date,
            status,
            has_full_day: info.has_full_day,
            has_hourly_slots: info.has_hourly_slots,
            is_limited: info.is_limited,
        });
        date = date + Duration::days(1);
    }

    Ok(Json(days))
}

/// Free hourly windows on a single date.
pub async fn hourly_windows(
    State(state): State<Arc<AppState>>,
    Path((listing_id, date)): Path<(String, NaiveDate)>,
) -> Result<Json<Vec<HourWindow>>, AppError> {
    let now = Utc::now().naive_utc();

    let db = state.db.lock().unwrap();
    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let blocks = queries::get_blocked_dates(&db, &listing_id)?;
    let bookings = queries::get_bookings_for_listing(&db, &listing_id)?;

    Ok(Json(availability::available_windows_for_date(
        &listing, &blocks, &bookings, date, now,
    )))
}

#[derive(Deserialize)]
pub struct QuoteParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_hour: Option<i32>,
    pub end_hour: Option<i32>,
    pub fulfillment_method: Option<FulfillmentMethod>,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub days: i64,
    #[serde(flatten)]
    pub fees: pricing::FeeBreakdown,
}

/// Price preview for a prospective range, using the same arithmetic as the
/// eventual charge.
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<QuoteResponse>, AppError> {
    let now = Utc::now().naive_utc();

    let db = state.db.lock().unwrap();
    let listing = queries::get_listing(&db, &listing_id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
    let blocks = queries::get_blocked_dates(&db, &listing_id)?;
    let bookings = queries::get_bookings_for_listing(&db, &listing_id)?;

    let draft = wizard::WizardDraft {
        start_date: Some(params.start_date),
        end_date: Some(params.end_date),
        start_hour: params.start_hour,
        end_hour: params.end_hour,
        fulfillment_method: params.fulfillment_method,
        ..wizard::WizardDraft::default()
    };

    let days = wizard::validate_step(
        wizard::WizardStep::Dates,
        &draft,
        &listing,
        &[],
        &blocks,
        &bookings,
        now,
    )
    .map_err(AppError::Validation)
    .map(|_| (params.end_date - params.start_date).num_days())?;

    Ok(Json(QuoteResponse {
        days,
        fees: wizard::quote(&listing, &draft, days),
    }))
}
