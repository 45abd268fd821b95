use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A per-listing required document type, with the point in the booking
/// lifecycle by which it must be provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub id: String,
    pub listing_id: String,
    pub document_type: String,
    pub label: String,
    pub deadline: DocumentDeadline,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDeadline {
    BeforeBookingRequest,
    BeforeApproval,
    AfterApproval,
}

impl DocumentDeadline {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentDeadline::BeforeBookingRequest => "before_booking_request",
            DocumentDeadline::BeforeApproval => "before_approval",
            DocumentDeadline::AfterApproval => "after_approval",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "before_approval" => DocumentDeadline::BeforeApproval,
            "after_approval" => DocumentDeadline::AfterApproval,
            _ => DocumentDeadline::BeforeBookingRequest,
        }
    }
}

/// A committed upload record for one required document on one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub id: String,
    pub booking_id: String,
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub approval_status: UploadApproval,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadApproval {
    Pending,
    Approved,
    Rejected,
}

impl UploadApproval {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadApproval::Pending => "pending",
            UploadApproval::Approved => "approved",
            UploadApproval::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => UploadApproval::Approved,
            "rejected" => UploadApproval::Rejected,
            _ => UploadApproval::Pending,
        }
    }
}
