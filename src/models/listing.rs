use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::FulfillmentMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub category: ListingCategory,
    pub mode: ListingMode,
    pub daily_rate_cents: i64,
    pub weekly_rate_cents: Option<i64>,
    pub hourly_rate_cents: Option<i64>,
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub instant_book: bool,
    pub allows_pickup: bool,
    pub allows_delivery: bool,
    pub allows_on_site: bool,
    pub delivery_fee_cents: i64,
    pub deposit_cents: Option<i64>,
    /// Days kept free on either side of an existing booking.
    pub buffer_days: i64,
    pub min_notice_hours: i64,
    pub min_duration_hours: i64,
    pub created_at: NaiveDateTime,
}

impl Listing {
    pub fn supports_hourly(&self) -> bool {
        self.hourly_rate_cents.is_some()
    }

    pub fn supports(&self, method: FulfillmentMethod) -> bool {
        if self.category.is_immobile() {
            return method == FulfillmentMethod::OnSite;
        }
        match method {
            FulfillmentMethod::Pickup => self.allows_pickup,
            FulfillmentMethod::Delivery => self.allows_delivery,
            FulfillmentMethod::OnSite => self.allows_on_site,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    FoodTruck,
    FoodTrailer,
    GhostKitchen,
    VendorLot,
}

impl ListingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCategory::FoodTruck => "food_truck",
            ListingCategory::FoodTrailer => "food_trailer",
            ListingCategory::GhostKitchen => "ghost_kitchen",
            ListingCategory::VendorLot => "vendor_lot",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "food_trailer" => ListingCategory::FoodTrailer,
            "ghost_kitchen" => ListingCategory::GhostKitchen,
            "vendor_lot" => ListingCategory::VendorLot,
            _ => ListingCategory::FoodTruck,
        }
    }

    /// Categories operating food equipment need a regulatory business
    /// disclosure in the booking wizard.
    pub fn requires_business_info(&self) -> bool {
        matches!(
            self,
            ListingCategory::FoodTruck
                | ListingCategory::FoodTrailer
                | ListingCategory::GhostKitchen
        )
    }

    /// Immobile assets can only be used where they stand.
    pub fn is_immobile(&self) -> bool {
        matches!(self, ListingCategory::GhostKitchen | ListingCategory::VendorLot)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    Rent,
    Sale,
}

impl ListingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingMode::Rent => "rent",
            ListingMode::Sale => "sale",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "sale" => ListingMode::Sale,
            _ => ListingMode::Rent,
        }
    }
}

/// A host-entered block. Hour bounds are NULL for whole-day blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDate {
    pub listing_id: String,
    pub date: NaiveDate,
    pub start_hour: Option<i32>,
    pub end_hour: Option<i32>,
}

impl BlockedDate {
    pub fn is_whole_day(&self) -> bool {
        self.start_hour.is_none() && self.end_hour.is_none()
    }
}
