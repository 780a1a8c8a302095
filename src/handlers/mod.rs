pub mod auth;
pub mod bookings;
pub mod extract;
pub mod health;
