use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A rental booking. `status` and `payment_status` are independent axes:
/// a booking can be `approved` and still `unpaid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub host_id: String,
    pub shopper_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_hour: Option<i32>,
    pub end_hour: Option<i32>,
    pub total_price_cents: i64,
    /// Delivery fee snapshot taken at request time; immune to later rate changes.
    pub delivery_fee_cents: i64,
    pub deposit_cents: Option<i64>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub is_instant_book: bool,
    pub host_confirmed_at: Option<NaiveDateTime>,
    pub shopper_confirmed_at: Option<NaiveDateTime>,
    pub dispute_status: Option<DisputeStatus>,
    pub dispute_opened_at: Option<NaiveDateTime>,
    pub dispute_reason: Option<String>,
    pub deposit_status: Option<DepositStatus>,
    pub deposit_deduction_cents: Option<i64>,
    pub deposit_refund_notes: Option<String>,
    pub fulfillment_method: FulfillmentMethod,
    pub delivery_address: Option<String>,
    pub message_to_host: Option<String>,
    pub host_response: Option<String>,
    pub business_info: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn both_confirmed(&self) -> bool {
        self.host_confirmed_at.is_some() && self.shopper_confirmed_at.is_some()
    }

    pub fn has_open_dispute(&self) -> bool {
        matches!(self.dispute_status, Some(DisputeStatus::Pending))
    }

    /// Nights charged for this booking (checkout-style: Mar 10–13 is 3 days).
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Declined,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => BookingStatus::Approved,
            "declined" => BookingStatus::Declined,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => PaymentStatus::Pending,
            "paid" => PaymentStatus::Paid,
            "refunded" => PaymentStatus::Refunded,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Unpaid,
        }
    }
}

/// Deposit lifecycle is monotonic: pending → charged → refunded | forfeited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Charged,
    Refunded,
    Forfeited,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Charged => "charged",
            DepositStatus::Refunded => "refunded",
            DepositStatus::Forfeited => "forfeited",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "charged" => DepositStatus::Charged,
            "refunded" => DepositStatus::Refunded,
            "forfeited" => DepositStatus::Forfeited,
            _ => DepositStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Pending,
    Closed,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Pending => "pending",
            DisputeStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "closed" => DisputeStatus::Closed,
            _ => DisputeStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    Pickup,
    Delivery,
    OnSite,
}

impl FulfillmentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentMethod::Pickup => "pickup",
            FulfillmentMethod::Delivery => "delivery",
            FulfillmentMethod::OnSite => "on_site",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "delivery" => FulfillmentMethod::Delivery,
            "on_site" => FulfillmentMethod::OnSite,
            _ => FulfillmentMethod::Pickup,
        }
    }
}

/// Which side of the marketplace an actor is on for a given booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Host,
    Shopper,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Host => "host",
            PartyRole::Shopper => "shopper",
        }
    }
}
