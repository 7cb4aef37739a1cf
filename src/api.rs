use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    Booking, BookingFilter, BookingId, BookingStats, BookingSummary, Contact, Quote,
    RouteRequest, Status, TripDraft, VehicleOffering, VehicleSpec,
};
use crate::error::Error;

#[async_trait]
pub trait QuoteAPI {
    /// One quote per active vehicle of the requested class, in catalog order.
    async fn get_quotes(&self, request: RouteRequest) -> Result<Vec<Quote>, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn create_booking(&self, draft: TripDraft, contact: Contact) -> Result<Booking, Error>;
    async fn find_booking(&self, id: BookingId) -> Result<Booking, Error>;
    async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<BookingSummary>, Error>;
    async fn delete_booking(&self, id: BookingId) -> Result<(), Error>;
    async fn booking_stats(&self, today: NaiveDate) -> Result<BookingStats, Error>;
}

#[async_trait]
pub trait LifecycleAPI {
    async fn transition_booking(&self, id: BookingId, target: Status) -> Result<Booking, Error>;
    async fn reinstate_booking(&self, id: BookingId) -> Result<Booking, Error>;
}

#[async_trait]
pub trait FleetAPI {
    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, Error>;
    async fn create_vehicle(&self, spec: VehicleSpec) -> Result<VehicleOffering, Error>;
    async fn update_vehicle(&self, id: Uuid, spec: VehicleSpec) -> Result<VehicleOffering, Error>;
    async fn delete_vehicle(&self, id: Uuid) -> Result<(), Error>;
}

pub trait API: QuoteAPI + BookingAPI + LifecycleAPI + FleetAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
