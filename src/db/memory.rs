use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BookingStore, FleetCatalog};
use crate::entities::{
    Booking, BookingFilter, BookingId, NewBooking, ServiceClass, VehicleOffering,
};
use crate::error::{duplicate_reference_error, Error};

#[derive(Debug, Default)]
struct Bookings {
    next_id: BookingId,
    rows: BTreeMap<BookingId, Booking>,
    refs: HashSet<String>,
}

/// In-process booking store. Each call holds the lock for its whole duration,
/// which gives the same conditional-write guarantees as the Postgres store.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    state: Mutex<Bookings>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, Error> {
        let mut state = self.state.lock().await;

        if state.refs.contains(&booking.booking_ref) {
            return Err(duplicate_reference_error());
        }

        state.next_id += 1;
        let booking = booking.into_booking(state.next_id);

        state.refs.insert(booking.booking_ref.clone());
        state.rows.insert(booking.booking_id, booking.clone());

        Ok(booking)
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, Error> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, Error> {
        let state = self.state.lock().await;

        let mut bookings: Vec<Booking> = state
            .rows
            .values()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect();

        bookings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.booking_id.cmp(&a.booking_id))
        });

        Ok(bookings)
    }

    async fn update_booking_status(
        &self,
        booking: &Booking,
        expected_version: i32,
    ) -> Result<bool, Error> {
        let mut state = self.state.lock().await;

        match state.rows.get_mut(&booking.booking_id) {
            Some(stored) if stored.version == expected_version => {
                stored.status = booking.status;
                stored.version = booking.version;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_booking(&self, id: BookingId) -> Result<bool, Error> {
        let mut state = self.state.lock().await;

        match state.rows.remove(&id) {
            Some(booking) => {
                state.refs.remove(&booking.booking_ref);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_bookings(&self, trip_date: Option<NaiveDate>) -> Result<i64, Error> {
        let state = self.state.lock().await;

        let count = state
            .rows
            .values()
            .filter(|booking| trip_date.map_or(true, |date| booking.trip_date == date))
            .count();

        Ok(count as i64)
    }
}

/// In-process fleet catalog that keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryFleetCatalog {
    vehicles: Mutex<Vec<VehicleOffering>>,
}

impl MemoryFleetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: Vec<VehicleOffering>) -> Self {
        Self {
            vehicles: Mutex::new(vehicles),
        }
    }
}

#[async_trait]
impl FleetCatalog for MemoryFleetCatalog {
    async fn list_active_vehicles(
        &self,
        class: ServiceClass,
    ) -> Result<Vec<VehicleOffering>, Error> {
        let vehicles = self.vehicles.lock().await;

        Ok(vehicles
            .iter()
            .filter(|vehicle| vehicle.is_active() && vehicle.service_class == class)
            .cloned()
            .collect())
    }

    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, Error> {
        Ok(self.vehicles.lock().await.clone())
    }

    async fn insert_vehicle(&self, vehicle: &VehicleOffering) -> Result<(), Error> {
        self.vehicles.lock().await.push(vehicle.clone());
        Ok(())
    }

    async fn update_vehicle(&self, vehicle: &VehicleOffering) -> Result<bool, Error> {
        let mut vehicles = self.vehicles.lock().await;

        match vehicles.iter_mut().find(|stored| stored.id == vehicle.id) {
            Some(stored) => {
                *stored = vehicle.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<bool, Error> {
        let mut vehicles = self.vehicles.lock().await;
        let before = vehicles.len();

        vehicles.retain(|vehicle| vehicle.id != id);

        Ok(vehicles.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Contact, Schedule, Status, TripDraft};
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    fn new_booking(reference: &str, day: u32) -> NewBooking {
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        let draft = TripDraft {
            pickup: "Airport".into(),
            drop: "Downtown".into(),
            service_class: ServiceClass::OneWay,
            date: schedule.date,
            time: schedule.time,
            vehicle_id: Uuid::new_v4(),
            vehicle_display_name: "Sedan".into(),
            fare: Decimal::from(450),
            seal: String::new(),
        };
        let contact = Contact::new("Asha", "9876543210", None);

        NewBooking::new(&draft, &contact, reference.into())
    }

    #[tokio::test]
    async fn duplicate_references_are_refused() {
        let store = MemoryBookingStore::new();

        store.insert_booking(new_booking("TXN1-A", 1)).await.unwrap();
        let err = store.insert_booking(new_booking("TXN1-A", 1)).await.unwrap_err();

        assert!(err.is_duplicate_reference());
        assert_eq!(store.count_bookings(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn status_writes_are_guarded_by_version() {
        let store = MemoryBookingStore::new();
        let booking = store.insert_booking(new_booking("TXN1-A", 1)).await.unwrap();

        let mut confirmed = booking.clone();
        confirmed.transition(Status::Confirmed).unwrap();
        assert!(store.update_booking_status(&confirmed, 0).await.unwrap());

        let mut cancelled = booking.clone();
        cancelled.transition(Status::Cancelled).unwrap();
        assert!(!store.update_booking_status(&cancelled, 0).await.unwrap());

        let stored = store.find_booking(booking.booking_id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Confirmed);
    }

    #[tokio::test]
    async fn listing_filters_and_counts_by_trip_date() {
        let store = MemoryBookingStore::new();
        store.insert_booking(new_booking("TXN1-A", 1)).await.unwrap();
        store.insert_booking(new_booking("TXN1-B", 2)).await.unwrap();
        store.insert_booking(new_booking("TXN1-C", 2)).await.unwrap();

        let filter = BookingFilter {
            trip_date: NaiveDate::from_ymd_opt(2026, 3, 2),
            ..Default::default()
        };
        let listed = store.list_bookings(&filter).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed[0].booking_id > listed[1].booking_id);
        assert_eq!(store.count_bookings(filter.trip_date).await.unwrap(), 2);
        assert_eq!(store.count_bookings(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn deleting_twice_reports_nothing_to_delete() {
        let store = MemoryBookingStore::new();
        let booking = store.insert_booking(new_booking("TXN1-A", 1)).await.unwrap();

        assert!(store.delete_booking(booking.booking_id).await.unwrap());
        assert!(!store.delete_booking(booking.booking_id).await.unwrap());
    }
}
