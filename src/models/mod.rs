pub mod booking;
pub mod items;
pub mod session;
pub mod user;

pub use booking::{Booking, BookingStatus, NewBooking, StatusAction};
pub use items::{Item, Items};
pub use session::Session;
pub use user::User;
