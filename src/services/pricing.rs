use serde::Serialize;

/// Platform fee charged to the renter, as a percentage of the fee base
/// (base price plus delivery). Applied identically at quote time and at
/// charge time; any drift between the two is a defect.
pub const RENTER_FEE_PERCENT: i64 = 10;

/// Base price for a day range. When a weekly rate exists and the range
/// spans at least one full week, full weeks bill at the weekly rate and
/// the remainder at the daily rate.
pub fn price_for_range(daily_rate_cents: i64, weekly_rate_cents: Option<i64>, days: i64) -> i64 {
    match weekly_rate_cents {
        Some(weekly) if days >= 7 => (days / 7) * weekly + (days % 7) * daily_rate_cents,
        _ => days * daily_rate_cents,
    }
}

pub fn price_for_hours(hourly_rate_cents: i64, hours: i64) -> i64 {
    hours * hourly_rate_cents
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub base_cents: i64,
    pub delivery_fee_cents: i64,
    pub renter_fee_cents: i64,
    pub customer_total_cents: i64,
}

pub fn apply_fees(base_cents: i64, delivery_fee_cents: i64) -> FeeBreakdown {
    let renter_fee_cents = (base_cents + delivery_fee_cents) * RENTER_FEE_PERCENT / 100;
    FeeBreakdown {
        base_cents,
        delivery_fee_cents,
        renter_fee_cents,
        customer_total_cents: base_cents + delivery_fee_cents + renter_fee_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_only() {
        assert_eq!(price_for_range(10_000, None, 3), 30_000);
    }

    #[test]
    fn test_weekly_rate_applies_to_full_weeks() {
        // 10 days = 1 week + 3 days
        assert_eq!(price_for_range(10_000, Some(60_000), 10), 60_000 + 30_000);
    }

    #[test]
    fn test_weekly_rate_ignored_under_a_week() {
        assert_eq!(price_for_range(10_000, Some(60_000), 6), 60_000);
    }

    #[test]
    fn test_exact_weeks() {
        assert_eq!(price_for_range(10_000, Some(60_000), 14), 120_000);
    }

    #[test]
    fn test_hourly() {
        assert_eq!(price_for_hours(2_500, 4), 10_000);
    }

    #[test]
    fn test_fees_no_delivery() {
        // $300 base, 10% fee → $30 fee, $330 total
        let fees = apply_fees(30_000, 0);
        assert_eq!(fees.renter_fee_cents, 3_000);
        assert_eq!(fees.customer_total_cents, 33_000);
    }

    #[test]
    fn test_delivery_included_in_fee_base() {
        let fees = apply_fees(30_000, 5_000);
        assert_eq!(fees.renter_fee_cents, 3_500);
        assert_eq!(fees.customer_total_cents, 38_500);
    }

    #[test]
    fn test_fee_determinism() {
        // Same inputs at quote time and charge time give the same figures.
        let quote = apply_fees(price_for_range(12_345, Some(70_000), 9), 1_500);
        let charge = apply_fees(price_for_range(12_345, Some(70_000), 9), 1_500);
        assert_eq!(quote, charge);
    }
}
