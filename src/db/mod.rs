mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::entities::{
    Booking, BookingFilter, BookingId, NewBooking, ServiceClass, VehicleOffering,
};
use crate::error::Error;

pub use memory::{MemoryBookingStore, MemoryFleetCatalog};
pub use postgres::PgStore;

/// Durable booking records, keyed by the store-assigned id with a unique
/// index on `booking_ref`.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists a new `pending` booking and assigns its id. A clash on
    /// `booking_ref` fails with `DuplicateReference` and writes nothing.
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, Error>;

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, Error>;

    /// Newest first.
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, Error>;

    /// Writes `booking.status` and `booking.version` only if the stored
    /// version still equals `expected_version`. Returns `false` when the guard
    /// did not match (the record moved on or is gone).
    async fn update_booking_status(
        &self,
        booking: &Booking,
        expected_version: i32,
    ) -> Result<bool, Error>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_booking(&self, id: BookingId) -> Result<bool, Error>;

    async fn count_bookings(&self, trip_date: Option<NaiveDate>) -> Result<i64, Error>;
}

/// The fleet catalog. Rows that fail boundary validation are skipped by the
/// implementations, never returned.
#[async_trait]
pub trait FleetCatalog: Send + Sync {
    /// Active vehicles of one service class, in catalog order.
    async fn list_active_vehicles(&self, class: ServiceClass)
        -> Result<Vec<VehicleOffering>, Error>;

    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, Error>;

    async fn insert_vehicle(&self, vehicle: &VehicleOffering) -> Result<(), Error>;

    /// Returns `false` when no vehicle has that id.
    async fn update_vehicle(&self, vehicle: &VehicleOffering) -> Result<bool, Error>;

    async fn delete_vehicle(&self, id: Uuid) -> Result<bool, Error>;
}
