pub mod bookings;
pub mod quotes;
pub mod vehicles;
