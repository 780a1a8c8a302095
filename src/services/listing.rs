use crate::errors::AppError;
use crate::models::BookingStatus;

/// Which bookings a list request wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    Status(BookingStatus),
    /// Still ahead: Pending or Assigned.
    Upcoming,
    /// Finished one way or another: Completed or Cancelled.
    Past,
}

impl BookingFilter {
    /// Combines the `status` and `view` query parameters. `status=all` and an
    /// absent parameter mean the same thing.
    pub fn from_query(status: Option<&str>, view: Option<&str>) -> Result<Self, AppError> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                BookingStatus::parse(s)
                    .ok_or_else(|| AppError::Validation(format!("unknown status: {s}")))?,
            ),
        };

        let view = match view.map(str::trim) {
            None | Some("") => None,
            Some(v) if v.eq_ignore_ascii_case("upcoming") => Some(BookingFilter::Upcoming),
            Some(v) if v.eq_ignore_ascii_case("past") => Some(BookingFilter::Past),
            Some(v) => return Err(AppError::Validation(format!("unknown view: {v}"))),
        };

        match (status, view) {
            (Some(s), Some(v)) if !v.matches(s) => Err(AppError::Validation(format!(
                "status {s} never appears in the {} view",
                if v == BookingFilter::Upcoming { "upcoming" } else { "past" }
            ))),
            (Some(s), _) => Ok(BookingFilter::Status(s)),
            (None, Some(v)) => Ok(v),
            (None, None) => Ok(BookingFilter::All),
        }
    }

    /// The statuses to select; empty means every booking.
    pub fn statuses(&self) -> Vec<BookingStatus> {
        match self {
            BookingFilter::All => vec![],
            BookingFilter::Status(s) => vec![*s],
            BookingFilter::Upcoming | BookingFilter::Past => BookingStatus::ALL
                .into_iter()
                .filter(|s| self.matches(*s))
                .collect(),
        }
    }

    pub fn matches(&self, status: BookingStatus) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Status(s) => *s == status,
            BookingFilter::Upcoming => status.is_upcoming(),
            BookingFilter::Past => !status.is_upcoming(),
        }
    }
}
