use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::extract::{require_admin, JsonBody, OptionalSession};
use crate::db::queries::{self, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Items, NewBooking, StatusAction};
use crate::services::listing::BookingFilter;
use crate::services::pricing;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: i64,
    customer_name: String,
    phone_number: String,
    pickup_location: String,
    dropoff_location: String,
    moving_date: String,
    items: Items,
    selected_items: Vec<&'static str>,
    price: f64,
    price_display: String,
    status: BookingStatus,
    actions: Vec<StatusAction>,
    user_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            customer_name: b.customer_name,
            phone_number: b.phone_number,
            pickup_location: b.pickup_location,
            dropoff_location: b.dropoff_location,
            moving_date: b.moving_date.format(DATE_FORMAT).to_string(),
            selected_items: b.items.selected_labels(),
            items: b.items,
            price: b.price,
            price_display: pricing::format_price(b.price),
            actions: b.status.actions(),
            status: b.status,
            user_id: b.user_id,
            created_at: b.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: b.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

// GET /api/getBookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub view: Option<String>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let filter = BookingFilter::from_query(query.status.as_deref(), query.view.as_deref())?;

    let bookings = {
        let conn = state.conn()?;
        queries::get_all_bookings(&conn, &filter.statuses())?
    };

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// POST /api/addBooking
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookingRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub moving_date: Option<String>,
    #[serde(default)]
    pub items: Items,
    pub price: Option<f64>,
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("missing required field: {field}")))
}

impl AddBookingRequest {
    fn into_new_booking(self, user_id: Option<i64>) -> Result<NewBooking, AppError> {
        let customer_name = required("fullName", self.full_name)?;
        let phone_number = required("phoneNumber", self.phone_number)?;
        let pickup_location = required("pickupLocation", self.pickup_location)?;
        let dropoff_location = required("dropoffLocation", self.dropoff_location)?;
        let moving_date_str = required("movingDate", self.moving_date)?;

        let moving_date = NaiveDate::parse_from_str(&moving_date_str, DATE_FORMAT).map_err(|_| {
            AppError::Validation(format!(
                "movingDate must be a date (YYYY-MM-DD), got {moving_date_str:?}"
            ))
        })?;

        let price = pricing::estimate(&self.items);
        if let Some(submitted) = self.price {
            if !pricing::matches_estimate(submitted, &self.items) {
                tracing::warn!(submitted, computed = price, "submitted price ignored");
            }
        }

        Ok(NewBooking {
            customer_name,
            phone_number,
            pickup_location,
            dropoff_location,
            moving_date,
            items: self.items,
            price: f64::from(price),
            user_id,
        })
    }
}

pub async fn add_booking(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    JsonBody(body): JsonBody<AddBookingRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = session.map(|s| s.user_id);
    let booking = body.into_new_booking(user_id)?;

    let stored = {
        let conn = state.conn()?;
        let id = queries::create_booking(&conn, &booking)?;
        queries::get_booking_by_id(&conn, id)?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("booking {id} missing after insert"))
            })?
    };

    tracing::info!(booking_id = stored.id, price = stored.price, user_id = ?user_id, "booking added");

    Ok(Json(serde_json::json!({
        "message": "Booking added successfully",
        "id": stored.id,
        "price": stored.price,
        "status": stored.status,
        "booking": BookingResponse::from(stored),
    })))
}

// POST /api/updateBookingStatus
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub id: Option<i64>,
    pub status: Option<String>,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&headers, &state.config)?;

    let (Some(id), Some(status_str)) = (body.id, body.status) else {
        return Err(AppError::Validation(
            "Invalid input. Missing id or status.".into(),
        ));
    };

    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| AppError::Validation(format!("Invalid status: {status_str}")))?;

    let (previous, updated) = {
        let conn = state.conn()?;
        let previous = queries::get_booking_status(&conn, id)?;
        let updated = queries::update_booking_status(&conn, id, status)?;
        (previous, updated)
    };

    if !updated {
        return Err(AppError::NotFound("Booking not found".into()));
    }

    // The overwrite is unconditional; only note moves no admin control offers.
    if let Some(previous) = previous.as_deref().and_then(BookingStatus::parse) {
        if previous != status && !previous.can_transition_to(status) {
            tracing::warn!(booking_id = id, from = %previous, to = %status, "status set outside the admin lifecycle");
        }
    }

    tracing::info!(booking_id = id, status = %status, "booking status updated");

    Ok(Json(serde_json::json!({
        "message": "Booking status updated successfully.",
        "id": id,
        "status": status,
    })))
}

// POST /api/estimatePrice
#[derive(Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub items: Items,
}

pub async fn estimate_price(JsonBody(body): JsonBody<EstimateRequest>) -> Json<serde_json::Value> {
    let price = pricing::estimate(&body.items);
    Json(serde_json::json!({
        "price": price,
        "display": pricing::format_price(f64::from(price)),
        "placeholder": pricing::PLACEHOLDER_ESTIMATE,
    }))
}
