use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    BlockedDate, Booking, BookingStatus, DocumentRequirement, DocumentUpload, FulfillmentMethod,
    Listing, PaymentStatus, UploadApproval,
};
use crate::services::notifications::notify_detached;
use crate::services::{availability, pricing};
use crate::state::AppState;

pub const MAX_FILE_BYTES: i64 = 10 * 1024 * 1024;
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/png", "image/webp"];

/// One step of the booking wizard. The sequence is computed once per
/// listing from two booleans; steps never reshuffle mid-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Dates,
    Requirements,
    BusinessInfo,
    DocumentUpload,
    Details,
    Review,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Dates => "dates",
            WizardStep::Requirements => "requirements",
            WizardStep::BusinessInfo => "business_info",
            WizardStep::DocumentUpload => "document_upload",
            WizardStep::Details => "details",
            WizardStep::Review => "review",
        }
    }
}

pub fn step_plan(requires_business_info: bool, has_required_docs: bool) -> Vec<WizardStep> {
    let mut plan = vec![WizardStep::Dates, WizardStep::Requirements];
    if requires_business_info {
        plan.push(WizardStep::BusinessInfo);
    }
    if has_required_docs {
        plan.push(WizardStep::DocumentUpload);
    }
    plan.push(WizardStep::Details);
    plan.push(WizardStep::Review);
    plan
}

/// 1-based step to land on; date pre-selection (arriving from a calendar
/// picker) skips straight to step 2.
pub fn starting_step(dates_preselected: bool) -> usize {
    if dates_preselected {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub license_type: String,
    #[serde(default)]
    pub license_other: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_time_employees: i64,
    #[serde(default)]
    pub part_time_employees: i64,
    #[serde(default)]
    pub has_workers_comp: bool,
    #[serde(default)]
    pub has_certified_manager: bool,
    #[serde(default)]
    pub products: String,
}

/// A document selected client-side but not yet persisted to the document
/// store; only metadata travels through the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedFile {
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// The wizard's accumulated answers. Persisted as a draft keyed by
/// (shopper, listing) so back navigation and page reloads lose nothing;
/// cleared only on successful submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardDraft {
    #[serde(default)]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub end_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub start_hour: Option<i32>,
    #[serde(default)]
    pub end_hour: Option<i32>,
    #[serde(default)]
    pub business_info: Option<BusinessInfo>,
    #[serde(default)]
    pub staged_files: Vec<StagedFile>,
    #[serde(default)]
    pub fulfillment_method: Option<FulfillmentMethod>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub message_to_host: Option<String>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub terms_agreed: bool,
    #[serde(default)]
    pub insurance_acknowledged: bool,
}

impl WizardDraft {
    fn is_hourly(&self) -> bool {
        self.start_hour.is_some() && self.end_hour.is_some()
    }
}

pub fn validate_staged_file(file: &StagedFile) -> Result<(), String> {
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(format!(
            "{}: only PDF, JPEG, PNG, or WebP files are accepted",
            file.file_name
        ));
    }
    if file.size_bytes > MAX_FILE_BYTES {
        return Err(format!("{}: files must be 10MB or smaller", file.file_name));
    }
    if file.size_bytes <= 0 {
        return Err(format!("{}: file is empty", file.file_name));
    }
    Ok(())
}

/// Gate for a single step. Steps not in the listing's plan always pass, so
/// callers can validate the whole plan uniformly at submit time.
pub fn validate_step(
    step: WizardStep,
    draft: &WizardDraft,
    listing: &Listing,
    requirements: &[DocumentRequirement],
    blocks: &[BlockedDate],
    bookings: &[Booking],
    now: NaiveDateTime,
) -> Result<(), String> {
    match step {
        WizardStep::Dates => validate_dates(draft, listing, blocks, bookings, now).map(|_| ()),
        // Read-only display of upcoming document requirements.
        WizardStep::Requirements => Ok(()),
        WizardStep::BusinessInfo => validate_business_info(draft),
        WizardStep::DocumentUpload => validate_documents(draft, requirements),
        WizardStep::Details => validate_details(draft, listing),
        WizardStep::Review => Ok(()),
    }
}

fn validate_dates(
    draft: &WizardDraft,
    listing: &Listing,
    blocks: &[BlockedDate],
    bookings: &[Booking],
    now: NaiveDateTime,
) -> Result<i64, String> {
    let (Some(start), Some(end)) = (draft.start_date, draft.end_date) else {
        return Err("Select a start and end date.".to_string());
    };

    if draft.is_hourly() {
        let (Some(from), Some(to)) = (draft.start_hour, draft.end_hour) else {
            unreachable!()
        };
        if listing.hourly_rate_cents.is_none() {
            return Err("This listing does not offer hourly rental.".to_string());
        }
        if start != end {
            return Err("Hourly bookings must start and end on the same day.".to_string());
        }
        if i64::from(to - from) < listing.min_duration_hours.max(1) {
            return Err(format!(
                "Hourly bookings must be at least {} hours.",
                listing.min_duration_hours.max(1)
            ));
        }
        let fits = availability::available_windows_for_date(listing, blocks, bookings, start, now)
            .iter()
            .any(|w| w.start_hour <= i64::from(from) && i64::from(to) <= w.end_hour);
        if !fits {
            return Err("That time window is no longer available.".to_string());
        }
        return Ok(0);
    }

    availability::validate_range(listing, blocks, bookings, start, end, now.date())
        .map_err(|e| e.to_string())
}

fn validate_business_info(draft: &WizardDraft) -> Result<(), String> {
    let Some(info) = &draft.business_info else {
        return Err("Business information is required for this listing.".to_string());
    };

    if info.business_name.trim().is_empty() {
        return Err("Business name is required.".to_string());
    }
    if info.license_type.trim().is_empty() {
        return Err("License type is required.".to_string());
    }
    if info.license_type == "other"
        && info
            .license_other
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
    {
        return Err("Describe your license type.".to_string());
    }
    if info.description.trim().is_empty() {
        return Err("Business description is required.".to_string());
    }
    if info.products.trim().is_empty() {
        return Err("List the products and equipment you will use.".to_string());
    }
    if info.full_time_employees < 0 || info.part_time_employees < 0 {
        return Err("Employee counts cannot be negative.".to_string());
    }
    Ok(())
}

fn validate_documents(
    draft: &WizardDraft,
    requirements: &[DocumentRequirement],
) -> Result<(), String> {
    for file in &draft.staged_files {
        validate_staged_file(file)?;
    }

    for req in requirements {
        let staged = draft
            .staged_files
            .iter()
            .any(|f| f.document_type == req.document_type);
        if !staged {
            return Err(format!("{} is required before you can continue.", req.label));
        }
    }
    Ok(())
}

fn validate_details(draft: &WizardDraft, listing: &Listing) -> Result<(), String> {
    let Some(method) = draft.fulfillment_method else {
        return Err("Choose how you will receive the asset.".to_string());
    };

    if !listing.supports(method) {
        return Err("This listing does not support that fulfillment method.".to_string());
    }
    if method == FulfillmentMethod::Delivery
        && draft
            .delivery_address
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
    {
        return Err("A delivery address is required for delivery.".to_string());
    }
    if !draft.terms_agreed {
        return Err("You must agree to the rental terms.".to_string());
    }
    if !draft.insurance_acknowledged {
        return Err("You must acknowledge the insurance requirements.".to_string());
    }

    let Some(contact) = &draft.contact else {
        return Err("Contact information is required.".to_string());
    };
    if contact.name.trim().is_empty()
        || contact.phone.trim().is_empty()
        || contact.address.trim().is_empty()
    {
        return Err("Contact name, phone, and address are all required.".to_string());
    }
    Ok(())
}

/// The exact fee breakdown shown on the review step. Recomputed with the
/// same functions at charge time.
pub fn quote(listing: &Listing, draft: &WizardDraft, days: i64) -> pricing::FeeBreakdown {
    let base = if draft.is_hourly() {
        let hours = i64::from(draft.end_hour.unwrap_or(0) - draft.start_hour.unwrap_or(0));
        pricing::price_for_hours(listing.hourly_rate_cents.unwrap_or(0), hours)
    } else {
        pricing::price_for_range(listing.daily_rate_cents, listing.weekly_rate_cents, days)
    };

    let delivery_fee = if draft.fulfillment_method == Some(FulfillmentMethod::Delivery) {
        listing.delivery_fee_cents
    } else {
        0
    };

    pricing::apply_fees(base, delivery_fee)
}

#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub booking_id: String,
    pub checkout_url: Option<String>,
    /// Set when the booking row was created but the checkout session could
    /// not be: the booking stays payable through the pay endpoint.
    pub checkout_error: Option<String>,
}

/// Final wizard submission. Every step in the listing's plan is
/// re-validated, and availability is re-checked against fresh rows under
/// the write lock so two shoppers cannot land overlapping ranges.
pub async fn submit(
    state: &Arc<AppState>,
    listing_id: &str,
    shopper_id: &str,
    draft: &WizardDraft,
    now: NaiveDateTime,
) -> Result<SubmitOutcome, AppError> {
    let (booking, listing) = {
        let db = state.db.lock().unwrap();

        let listing = queries::get_listing(&db, listing_id)?
            .ok_or_else(|| AppError::NotFound(format!("listing {listing_id}")))?;
        let requirements = queries::get_requirements(&db, listing_id)?;
        let blocks = queries::get_blocked_dates(&db, listing_id)?;
        let bookings = queries::get_bookings_for_listing(&db, listing_id)?;

        let plan = step_plan(
            listing.category.requires_business_info(),
            !requirements.is_empty(),
        );
        for step in &plan {
            // The dates step is checked separately below so a stale range
            // surfaces as a conflict rather than a validation error.
            if *step == WizardStep::Dates {
                continue;
            }
            validate_step(*step, draft, &listing, &requirements, &blocks, &bookings, now)
                .map_err(AppError::Validation)?;
        }

        let (Some(start), Some(end)) = (draft.start_date, draft.end_date) else {
            return Err(AppError::Validation("Select a start and end date.".to_string()));
        };
        let days = validate_dates(draft, &listing, &blocks, &bookings, now)
            .map_err(AppError::Conflict)?;

        let fees = quote(&listing, draft, days);

        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            listing_id: listing.id.clone(),
            host_id: listing.host_id.clone(),
            shopper_id: shopper_id.to_string(),
            start_date: start,
            end_date: end,
            start_hour: draft.start_hour,
            end_hour: draft.end_hour,
            total_price_cents: fees.customer_total_cents,
            delivery_fee_cents: fees.delivery_fee_cents,
            deposit_cents: listing.deposit_cents,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            is_instant_book: listing.instant_book,
            host_confirmed_at: None,
            shopper_confirmed_at: None,
            dispute_status: None,
            dispute_opened_at: None,
            dispute_reason: None,
            deposit_status: listing
                .deposit_cents
                .filter(|c| *c > 0)
                .map(|_| crate::models::DepositStatus::Pending),
            deposit_deduction_cents: None,
            deposit_refund_notes: None,
            fulfillment_method: draft.fulfillment_method.unwrap_or(FulfillmentMethod::Pickup),
            delivery_address: draft.delivery_address.clone(),
            message_to_host: draft.message_to_host.clone(),
            host_response: None,
            business_info: draft
                .business_info
                .as_ref()
                .and_then(|b| serde_json::to_value(b).ok()),
            created_at: now,
            updated_at: now,
        };

        queries::create_booking(&db, &booking)?;

        // Commit staged files now that the booking row exists.
        for file in &draft.staged_files {
            let upload = DocumentUpload {
                id: uuid::Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                document_type: file.document_type.clone(),
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
                size_bytes: file.size_bytes,
                approval_status: UploadApproval::Pending,
                uploaded_at: now,
            };
            queries::insert_upload(&db, &upload)?;
        }

        queries::delete_draft(&db, shopper_id, listing_id)?;

        (booking, listing)
    };

    if listing.instant_book {
        let deposit = booking.deposit_cents.unwrap_or(0);
        match state
            .gateway
            .create_checkout_session(
                &booking.id,
                &listing.id,
                booking.total_price_cents,
                booking.delivery_fee_cents,
                deposit,
            )
            .await
        {
            Ok(url) => Ok(SubmitOutcome {
                booking_id: booking.id,
                checkout_url: Some(url),
                checkout_error: None,
            }),
            Err(e) => {
                tracing::error!(error = %e, booking_id = %booking.id, "checkout session creation failed");
                Ok(SubmitOutcome {
                    booking_id: booking.id,
                    checkout_url: None,
                    checkout_error: Some(
                        "Payment could not be started; your request was saved and can be paid from your bookings."
                            .to_string(),
                    ),
                })
            }
        }
    } else {
        notify_detached(
            state,
            &booking.host_id,
            "booking_requested",
            &format!(
                "New booking request for {} ({} to {})",
                listing.title, booking.start_date, booking.end_date
            ),
        );
        Ok(SubmitOutcome {
            booking_id: booking.id,
            checkout_url: None,
            checkout_error: None,
        })
    }
}
