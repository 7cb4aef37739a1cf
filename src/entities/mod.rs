mod booking;
mod contact;
mod draft;
mod quote;
mod route;
mod vehicle;

pub use booking::{
    Booking, BookingFilter, BookingId, BookingStats, BookingSummary, NewBooking, Status,
};
pub use contact::Contact;
pub use draft::{Schedule, TripDraft};
pub use quote::Quote;
pub use route::{RouteRequest, ServiceClass};
pub use vehicle::{
    compute_fare, round_money, Money, OperationalState, RawVehicleRow, VehicleOffering,
    VehicleSpec,
};
