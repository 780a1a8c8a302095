use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingStatus, Items, NewBooking, Session, User};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored row that no longer decodes into its model.
#[derive(Debug, thiserror::Error)]
#[error("{table} row {id}: {reason}")]
pub struct InvalidRecord {
    pub table: &'static str,
    pub id: i64,
    pub reason: String,
}

fn now_str() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, customer_name, phone_number, pickup_location, dropoff_location, \
     moving_date, items, price, status, user_id, created_at, updated_at";

/// Inserts a booking in the Pending state and returns its id.
pub fn create_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<i64> {
    let now = now_str();
    let moving_date = booking.moving_date.format(DATE_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (customer_name, phone_number, pickup_location, dropoff_location, moving_date, items, price, status, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            booking.customer_name,
            booking.phone_number,
            booking.pickup_location,
            booking.dropoff_location,
            moving_date,
            booking.items.to_json(),
            booking.price,
            BookingStatus::Pending.as_str(),
            booking.user_id,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists bookings, newest first. An empty `statuses` slice means no filter.
pub fn get_all_bookings(
    conn: &Connection,
    statuses: &[BookingStatus],
) -> anyhow::Result<Vec<Booking>> {
    let sql = if statuses.is_empty() {
        format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id DESC")
    } else {
        let placeholders = (1..=statuses.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE status IN ({placeholders}) ORDER BY id DESC")
    };

    let params_vec: Vec<&dyn rusqlite::types::ToSql> = statuses
        .iter()
        .map(|s| s as &dyn rusqlite::types::ToSql)
        .collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_vec.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_user(conn: &Connection, user_id: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY moving_date ASC"
    ))?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// The raw stored status, or `None` when no booking has this id.
pub fn get_booking_status(conn: &Connection, id: i64) -> anyhow::Result<Option<String>> {
    let status = conn
        .query_row(
            "SELECT status FROM bookings WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(status)
}

/// Overwrites the status. Returns false when no booking has this id.
pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: i64 = row.get(0)?;
    let moving_date_str: String = row.get(5)?;
    let items_json: Option<String> = row.get(6)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    let invalid = |reason: String| InvalidRecord {
        table: "bookings",
        id,
        reason,
    };

    let moving_date = NaiveDate::parse_from_str(&moving_date_str, DATE_FORMAT)
        .map_err(|e| invalid(format!("moving_date {moving_date_str:?}: {e}")))?;
    let items = Items::from_json(items_json.as_deref())
        .map_err(|e| invalid(format!("items: {e}")))?;
    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| invalid(format!("unknown status {status_str:?}")))?;

    Ok(Booking {
        id,
        customer_name: row.get(1)?,
        phone_number: row.get(2)?,
        pickup_location: row.get(3)?,
        dropoff_location: row.get(4)?,
        moving_date,
        items,
        price: row.get(7)?,
        status,
        user_id: row.get(9)?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

impl rusqlite::types::ToSql for BookingStatus {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

// ── Users ──

pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![name, email, password_hash, now_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email, password, created_at FROM users WHERE email = ?1",
            params![email],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email, password, created_at FROM users WHERE id = ?1",
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at_str: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(&created_at_str),
    })
}

// ── Sessions ──

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            session.token,
            session.user_id,
            session.created_at.format(TIMESTAMP_FORMAT).to_string(),
            session.expires_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, token: &str) -> anyhow::Result<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                let created_at_str: String = row.get(2)?;
                let expires_at_str: String = row.get(3)?;
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: parse_timestamp(&created_at_str),
                    expires_at: NaiveDateTime::parse_from_str(&expires_at_str, TIMESTAMP_FORMAT)
                        .unwrap_or(NaiveDateTime::MIN),
                })
            },
        )
        .optional()?;
    Ok(session)
}

pub fn delete_session(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(count > 0)
}

pub fn expire_old_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![now_str()],
    )?;
    Ok(count)
}
