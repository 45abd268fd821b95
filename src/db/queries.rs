use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    BlockedDate, Booking, BookingStatus, DepositStatus, DisputeStatus, DocumentDeadline,
    DocumentRequirement, DocumentUpload, FulfillmentMethod, Listing, ListingCategory, ListingMode,
    PartyRole, PaymentStatus, UploadApproval,
};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_date(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

fn fmt_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FMT).unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Listings ──

const LISTING_COLS: &str = "id, host_id, title, category, mode, daily_rate_cents, \
    weekly_rate_cents, hourly_rate_cents, available_from, available_to, instant_book, \
    allows_pickup, allows_delivery, allows_on_site, delivery_fee_cents, deposit_cents, \
    buffer_days, min_notice_hours, min_duration_hours, created_at";

fn parse_listing_row(row: &rusqlite::Row) -> anyhow::Result<Listing> {
    let category: String = row.get(3)?;
    let mode: String = row.get(4)?;
    let available_from: Option<String> = row.get(8)?;
    let available_to: Option<String> = row.get(9)?;
    let created_at: String = row.get(19)?;

    Ok(Listing {
        id: row.get(0)?,
        host_id: row.get(1)?,
        title: row.get(2)?,
        category: ListingCategory::parse(&category),
        mode: ListingMode::parse(&mode),
        daily_rate_cents: row.get(5)?,
        weekly_rate_cents: row.get(6)?,
        hourly_rate_cents: row.get(7)?,
        available_from: available_from.as_deref().map(parse_date),
        available_to: available_to.as_deref().map(parse_date),
        instant_book: row.get::<_, i32>(10)? != 0,
        allows_pickup: row.get::<_, i32>(11)? != 0,
        allows_delivery: row.get::<_, i32>(12)? != 0,
        allows_on_site: row.get::<_, i32>(13)? != 0,
        delivery_fee_cents: row.get(14)?,
        deposit_cents: row.get(15)?,
        buffer_days: row.get(16)?,
        min_notice_hours: row.get(17)?,
        min_duration_hours: row.get(18)?,
        created_at: parse_datetime(&created_at),
    })
}

pub fn get_listing(conn: &Connection, id: &str) -> anyhow::Result<Option<Listing>> {
    let sql = format!("SELECT {LISTING_COLS} FROM listings WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_listing_row(row)));

    match result {
        Ok(listing) => Ok(Some(listing?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn insert_listing(conn: &Connection, listing: &Listing) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO listings (id, host_id, title, category, mode, daily_rate_cents,
            weekly_rate_cents, hourly_rate_cents, available_from, available_to, instant_book,
            allows_pickup, allows_delivery, allows_on_site, delivery_fee_cents, deposit_cents,
            buffer_days, min_notice_hours, min_duration_hours, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            listing.id,
            listing.host_id,
            listing.title,
            listing.category.as_str(),
            listing.mode.as_str(),
            listing.daily_rate_cents,
            listing.weekly_rate_cents,
            listing.hourly_rate_cents,
            listing.available_from.map(fmt_date),
            listing.available_to.map(fmt_date),
            listing.instant_book as i32,
            listing.allows_pickup as i32,
            listing.allows_delivery as i32,
            listing.allows_on_site as i32,
            listing.delivery_fee_cents,
            listing.deposit_cents,
            listing.buffer_days,
            listing.min_notice_hours,
            listing.min_duration_hours,
            fmt_datetime(listing.created_at),
        ],
    )?;
    Ok(())
}

// ── Blocked dates ──

pub fn get_blocked_dates(conn: &Connection, listing_id: &str) -> anyhow::Result<Vec<BlockedDate>> {
    let mut stmt = conn.prepare(
        "SELECT listing_id, date, start_hour, end_hour FROM blocked_dates WHERE listing_id = ?1",
    )?;

    let rows = stmt.query_map(params![listing_id], |row| {
        let date: String = row.get(1)?;
        Ok(BlockedDate {
            listing_id: row.get(0)?,
            date: parse_date(&date),
            start_hour: row.get(2)?,
            end_hour: row.get(3)?,
        })
    })?;

    let mut blocks = vec![];
    for row in rows {
        blocks.push(row?);
    }
    Ok(blocks)
}

pub fn insert_blocked_date(conn: &Connection, block: &BlockedDate) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO blocked_dates (listing_id, date, start_hour, end_hour) VALUES (?1, ?2, ?3, ?4)",
        params![
            block.listing_id,
            fmt_date(block.date),
            block.start_hour,
            block.end_hour
        ],
    )?;
    Ok(())
}

// ── Bookings ──

const BOOKING_COLS: &str = "id, listing_id, host_id, shopper_id, start_date, end_date, \
    start_hour, end_hour, total_price_cents, delivery_fee_cents, deposit_cents, status, \
    payment_status, is_instant_book, host_confirmed_at, shopper_confirmed_at, dispute_status, \
    dispute_opened_at, dispute_reason, deposit_status, deposit_deduction_cents, \
    deposit_refund_notes, fulfillment_method, delivery_address, message_to_host, host_response, \
    business_info, created_at, updated_at";

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let start_date: String = row.get(4)?;
    let end_date: String = row.get(5)?;
    let status: String = row.get(11)?;
    let payment_status: String = row.get(12)?;
    let host_confirmed_at: Option<String> = row.get(14)?;
    let shopper_confirmed_at: Option<String> = row.get(15)?;
    let dispute_status: Option<String> = row.get(16)?;
    let dispute_opened_at: Option<String> = row.get(17)?;
    let deposit_status: Option<String> = row.get(19)?;
    let fulfillment: String = row.get(22)?;
    let business_info: Option<String> = row.get(26)?;
    let created_at: String = row.get(27)?;
    let updated_at: String = row.get(28)?;

    Ok(Booking {
        id: row.get(0)?,
        listing_id: row.get(1)?,
        host_id: row.get(2)?,
        shopper_id: row.get(3)?,
        start_date: parse_date(&start_date),
        end_date: parse_date(&end_date),
        start_hour: row.get(6)?,
        end_hour: row.get(7)?,
        total_price_cents: row.get(8)?,
        delivery_fee_cents: row.get(9)?,
        deposit_cents: row.get(10)?,
        status: BookingStatus::parse(&status),
        payment_status: PaymentStatus::parse(&payment_status),
        is_instant_book: row.get::<_, i32>(13)? != 0,
        host_confirmed_at: host_confirmed_at.as_deref().map(parse_datetime),
        shopper_confirmed_at: shopper_confirmed_at.as_deref().map(parse_datetime),
        dispute_status: dispute_status.as_deref().map(DisputeStatus::parse),
        dispute_opened_at: dispute_opened_at.as_deref().map(parse_datetime),
        dispute_reason: row.get(18)?,
        deposit_status: deposit_status.as_deref().map(DepositStatus::parse),
        deposit_deduction_cents: row.get(20)?,
        deposit_refund_notes: row.get(21)?,
        fulfillment_method: FulfillmentMethod::parse(&fulfillment),
        delivery_address: row.get(23)?,
        message_to_host: row.get(24)?,
        host_response: row.get(25)?,
        business_info: business_info
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, listing_id, host_id, shopper_id, start_date, end_date,
            start_hour, end_hour, total_price_cents, delivery_fee_cents, deposit_cents, status,
            payment_status, is_instant_book, host_confirmed_at, shopper_confirmed_at,
            dispute_status, dispute_opened_at, dispute_reason, deposit_status,
            deposit_deduction_cents, deposit_refund_notes, fulfillment_method, delivery_address,
            message_to_host, host_response, business_info, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)",
        params![
            booking.id,
            booking.listing_id,
            booking.host_id,
            booking.shopper_id,
            fmt_date(booking.start_date),
            fmt_date(booking.end_date),
            booking.start_hour,
            booking.end_hour,
            booking.total_price_cents,
            booking.delivery_fee_cents,
            booking.deposit_cents,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.is_instant_book as i32,
            booking.host_confirmed_at.map(fmt_datetime),
            booking.shopper_confirmed_at.map(fmt_datetime),
            booking.dispute_status.map(|d| d.as_str()),
            booking.dispute_opened_at.map(fmt_datetime),
            booking.dispute_reason,
            booking.deposit_status.map(|d| d.as_str()),
            booking.deposit_deduction_cents,
            booking.deposit_refund_notes,
            booking.fulfillment_method.as_str(),
            booking.delivery_address,
            booking.message_to_host,
            booking.host_response,
            booking
                .business_info
                .as_ref()
                .map(|v| serde_json::to_string(v).unwrap_or_default()),
            fmt_datetime(booking.created_at),
            fmt_datetime(booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All bookings that could affect a listing's calendar.
pub fn get_bookings_for_listing(conn: &Connection, listing_id: &str) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLS} FROM bookings WHERE listing_id = ?1 ORDER BY start_date ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![listing_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_party(
    conn: &Connection,
    role: PartyRole,
    actor_id: &str,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let column = match role {
        PartyRole::Host => "host_id",
        PartyRole::Shopper => "shopper_id",
    };

    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            format!(
                "SELECT {BOOKING_COLS} FROM bookings WHERE {column} = ?1 AND status = ?2 \
                 ORDER BY start_date DESC LIMIT ?3"
            ),
            vec![
                Box::new(actor_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(status.to_string()),
                Box::new(limit),
            ],
        ),
        None => (
            format!(
                "SELECT {BOOKING_COLS} FROM bookings WHERE {column} = ?1 \
                 ORDER BY start_date DESC LIMIT ?2"
            ),
            vec![
                Box::new(actor_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// pending → approved. Returns false when the booking was not pending
/// anymore (already actioned from another session).
pub fn approve_booking(
    conn: &Connection,
    id: &str,
    message: Option<&str>,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'approved', host_response = COALESCE(?1, host_response),
            updated_at = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![message, fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

pub fn decline_booking(
    conn: &Connection,
    id: &str,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'declined', host_response = COALESCE(?1, host_response),
            updated_at = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![reason, fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// approved+paid → cancelled. The refund side effect belongs to the caller.
pub fn cancel_paid_booking(
    conn: &Connection,
    id: &str,
    reason: &str,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled', host_response = ?1,
            payment_status = 'refunded', updated_at = ?2
         WHERE id = ?3 AND status = 'approved' AND payment_status = 'paid'",
        params![reason, fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// Shopper withdrawing an unpaid request; no refund step.
pub fn cancel_unpaid_booking(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled', updated_at = ?1
         WHERE id = ?2 AND status = 'pending'",
        params![fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

pub fn set_payment_status(
    conn: &Connection,
    id: &str,
    status: PaymentStatus,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET payment_status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// Payment capture holds the deposit line item.
pub fn mark_deposit_charged(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET deposit_status = 'charged', updated_at = ?1
         WHERE id = ?2 AND deposit_cents IS NOT NULL AND deposit_cents > 0
           AND (deposit_status IS NULL OR deposit_status = 'pending')",
        params![fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// Instant-book rows skip manual approval: they flip to approved when the
/// checkout completes.
pub fn approve_instant_on_payment(
    conn: &Connection,
    id: &str,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'approved', updated_at = ?1
         WHERE id = ?2 AND is_instant_book = 1 AND status = 'pending'",
        params![fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// Append-only: the timestamp is only written while still NULL, so a repeat
/// confirm from the same party is a no-op.
pub fn set_confirmation(
    conn: &Connection,
    id: &str,
    role: PartyRole,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let sql = match role {
        PartyRole::Host => {
            "UPDATE bookings SET host_confirmed_at = ?1, updated_at = ?1
             WHERE id = ?2 AND host_confirmed_at IS NULL"
        }
        PartyRole::Shopper => {
            "UPDATE bookings SET shopper_confirmed_at = ?1, updated_at = ?1
             WHERE id = ?2 AND shopper_confirmed_at IS NULL"
        }
    };
    let count = conn.execute(sql, params![fmt_datetime(now), id])?;
    Ok(count > 0)
}

/// Guarded completion: only one caller can win this transition, which is
/// what keeps the fund release single-shot under concurrent confirms.
pub fn complete_booking(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'completed', updated_at = ?1
         WHERE id = ?2 AND status = 'approved' AND payment_status = 'paid'",
        params![fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

pub fn open_dispute(
    conn: &Connection,
    id: &str,
    reason: &str,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET dispute_status = 'pending', dispute_opened_at = ?1,
            dispute_reason = ?2, updated_at = ?1
         WHERE id = ?3 AND (dispute_status IS NULL OR dispute_status = 'closed')
           AND status != 'completed'",
        params![fmt_datetime(now), reason, id],
    )?;
    Ok(count > 0)
}

pub fn close_dispute(conn: &Connection, id: &str, now: NaiveDateTime) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET dispute_status = 'closed', updated_at = ?1
         WHERE id = ?2 AND dispute_status = 'pending'",
        params![fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// charged → refunded|forfeited, exactly once.
pub fn settle_deposit(
    conn: &Connection,
    id: &str,
    status: DepositStatus,
    deduction_cents: Option<i64>,
    notes: Option<&str>,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET deposit_status = ?1, deposit_deduction_cents = ?2,
            deposit_refund_notes = ?3, updated_at = ?4
         WHERE id = ?5 AND deposit_status = 'charged'",
        params![status.as_str(), deduction_cents, notes, fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

/// Rows the auto-close sweep should look at: paid, approved, undisputed and
/// past their end date. The exact grace-window check happens in the service
/// against the injected clock.
pub fn auto_close_candidates(conn: &Connection, today: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLS} FROM bookings
         WHERE status = 'approved' AND payment_status = 'paid'
           AND (dispute_status IS NULL OR dispute_status = 'closed')
           AND end_date < ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![fmt_date(today)], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

// ── Document requirements & uploads ──

pub fn get_requirements(conn: &Connection, listing_id: &str) -> anyhow::Result<Vec<DocumentRequirement>> {
    let mut stmt = conn.prepare(
        "SELECT id, listing_id, document_type, label, deadline
         FROM document_requirements WHERE listing_id = ?1",
    )?;

    let rows = stmt.query_map(params![listing_id], |row| {
        let deadline: String = row.get(4)?;
        Ok(DocumentRequirement {
            id: row.get(0)?,
            listing_id: row.get(1)?,
            document_type: row.get(2)?,
            label: row.get(3)?,
            deadline: DocumentDeadline::parse(&deadline),
        })
    })?;

    let mut requirements = vec![];
    for row in rows {
        requirements.push(row?);
    }
    Ok(requirements)
}

pub fn insert_requirement(conn: &Connection, req: &DocumentRequirement) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO document_requirements (id, listing_id, document_type, label, deadline)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            req.id,
            req.listing_id,
            req.document_type,
            req.label,
            req.deadline.as_str()
        ],
    )?;
    Ok(())
}

pub fn insert_upload(conn: &Connection, upload: &DocumentUpload) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO document_uploads (id, booking_id, document_type, file_name, content_type,
            size_bytes, approval_status, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            upload.id,
            upload.booking_id,
            upload.document_type,
            upload.file_name,
            upload.content_type,
            upload.size_bytes,
            upload.approval_status.as_str(),
            fmt_datetime(upload.uploaded_at),
        ],
    )?;
    Ok(())
}

pub fn get_uploads_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<Vec<DocumentUpload>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, document_type, file_name, content_type, size_bytes,
            approval_status, uploaded_at
         FROM document_uploads WHERE booking_id = ?1 ORDER BY uploaded_at ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        let approval: String = row.get(6)?;
        let uploaded_at: String = row.get(7)?;
        Ok(DocumentUpload {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            document_type: row.get(2)?,
            file_name: row.get(3)?,
            content_type: row.get(4)?,
            size_bytes: row.get(5)?,
            approval_status: UploadApproval::parse(&approval),
            uploaded_at: parse_datetime(&uploaded_at),
        })
    })?;

    let mut uploads = vec![];
    for row in rows {
        uploads.push(row?);
    }
    Ok(uploads)
}

pub fn set_upload_approval(
    conn: &Connection,
    upload_id: &str,
    status: UploadApproval,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE document_uploads SET approval_status = ?1 WHERE id = ?2",
        params![status.as_str(), upload_id],
    )?;
    Ok(count > 0)
}

// ── Wizard drafts ──

pub fn get_draft(
    conn: &Connection,
    shopper_id: &str,
    listing_id: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let result = conn.query_row(
        "SELECT payload FROM booking_drafts WHERE shopper_id = ?1 AND listing_id = ?2",
        params![shopper_id, listing_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(payload) => Ok(serde_json::from_str(&payload).ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_draft(
    conn: &Connection,
    shopper_id: &str,
    listing_id: &str,
    payload: &serde_json::Value,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO booking_drafts (shopper_id, listing_id, payload, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(shopper_id, listing_id) DO UPDATE SET
           payload = excluded.payload,
           updated_at = excluded.updated_at",
        params![shopper_id, listing_id, serde_json::to_string(payload)?, fmt_datetime(now)],
    )?;
    Ok(())
}

pub fn delete_draft(conn: &Connection, shopper_id: &str, listing_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM booking_drafts WHERE shopper_id = ?1 AND listing_id = ?2",
        params![shopper_id, listing_id],
    )?;
    Ok(())
}

// ── Host dashboard ──

#[derive(Debug, serde::Serialize)]
pub struct HostStats {
    pub pending_requests: i64,
    pub upcoming_rentals: i64,
    pub gross_earnings_cents: i64,
}

pub fn get_host_stats(conn: &Connection, host_id: &str, today: NaiveDate) -> anyhow::Result<HostStats> {
    let pending_requests: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM bookings WHERE host_id = ?1 AND status = 'pending'",
            params![host_id],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let upcoming_rentals: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM bookings
             WHERE host_id = ?1 AND status = 'approved' AND payment_status = 'paid'
               AND start_date > ?2",
            params![host_id, fmt_date(today)],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let gross_earnings_cents: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(total_price_cents), 0) FROM bookings
             WHERE host_id = ?1 AND status = 'completed'",
            params![host_id],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(HostStats {
        pending_requests,
        upcoming_rentals,
        gross_earnings_cents,
    })
}
