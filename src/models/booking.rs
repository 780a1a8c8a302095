use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Items;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub phone_number: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub moving_date: NaiveDate,
    pub items: Items,
    pub price: f64,
    pub status: BookingStatus,
    pub user_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields of a booking that do not exist until it is stored.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_name: String,
    pub phone_number: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub moving_date: NaiveDate,
    pub items: Items,
    pub price: f64,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Assigned,
    Completed,
    Cancelled,
}

/// An admin control that moves a booking to another status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Assign,
    Cancel,
}

impl StatusAction {
    pub fn target(self) -> BookingStatus {
        match self {
            StatusAction::Assign => BookingStatus::Assigned,
            StatusAction::Cancel => BookingStatus::Cancelled,
        }
    }
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Assigned,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Assigned => "Assigned",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Case-insensitive; anything outside the four known statuses is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Pending and Assigned bookings are still ahead of the customer.
    pub fn is_upcoming(&self) -> bool {
        !self.is_terminal()
    }

    /// Admin controls offered for a booking in this status. Nothing leads to
    /// Completed.
    pub fn actions(&self) -> Vec<StatusAction> {
        let mut actions = Vec::new();
        if *self == BookingStatus::Pending {
            actions.push(StatusAction::Assign);
        }
        if !self.is_terminal() {
            actions.push(StatusAction::Cancel);
        }
        actions
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.actions().iter().any(|a| a.target() == next)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(BookingStatus::parse("Pending"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::parse("assigned"), Some(BookingStatus::Assigned));
        assert_eq!(BookingStatus::parse(" CANCELLED "), Some(BookingStatus::Cancelled));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(BookingStatus::parse("Shipped"), None);
        assert_eq!(BookingStatus::parse(""), None);
    }

    #[test]
    fn pending_can_be_assigned_or_cancelled() {
        let pending = BookingStatus::Pending;
        assert_eq!(pending.actions(), vec![StatusAction::Assign, StatusAction::Cancel]);
        assert!(pending.can_transition_to(BookingStatus::Assigned));
        assert!(pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn assigned_can_only_be_cancelled() {
        assert_eq!(BookingStatus::Assigned.actions(), vec![StatusAction::Cancel]);
        assert!(!BookingStatus::Assigned.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn terminal_states_have_no_actions() {
        assert!(BookingStatus::Completed.actions().is_empty());
        assert!(BookingStatus::Cancelled.actions().is_empty());
        assert!(!BookingStatus::Cancelled.is_upcoming());
    }

    #[test]
    fn serializes_as_canonical_name() {
        let json = serde_json::to_string(&BookingStatus::Assigned).unwrap();
        assert_eq!(json, "\"Assigned\"");
    }
}
