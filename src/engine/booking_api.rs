use super::helpers::store_call;
use super::Engine;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use crate::{
    api::BookingAPI,
    entities::{
        Booking, BookingFilter, BookingId, BookingStats, BookingSummary, Contact, NewBooking,
        TripDraft,
    },
    error::{invalid_draft_error, not_found_error, persistence_error, Error},
};

impl Engine {
    async fn insert_with_fresh_reference(
        &self,
        draft: &TripDraft,
        contact: &Contact,
    ) -> Result<Booking, Error> {
        let booking = NewBooking::new(draft, contact, self.references.generate());

        store_call(self.timeouts.store, self.store.insert_booking(booking)).await
    }
}

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self, contact))]
    async fn create_booking(&self, draft: TripDraft, contact: Contact) -> Result<Booking, Error> {
        draft.validate()?;

        if !self.sealer.verify(&draft) {
            tracing::warn!(vehicle_id = %draft.vehicle_id, "draft does not match any issued quote");
            return Err(invalid_draft_error("trip draft does not match the quoted terms"));
        }

        // the draft may have sat in a tab since it was selected
        draft.schedule().validate(Local::now().naive_local())?;

        let contact = contact.normalized();
        contact.validate()?;

        let booking = match self.insert_with_fresh_reference(&draft, &contact).await {
            Err(err) if err.is_duplicate_reference() => {
                tracing::warn!("booking reference collided, retrying once with a new one");

                self.insert_with_fresh_reference(&draft, &contact)
                    .await
                    .map_err(|err| {
                        if err.is_duplicate_reference() {
                            persistence_error("booking reference collided twice")
                        } else {
                            err
                        }
                    })?
            }
            result => result?,
        };

        tracing::info!(
            booking_id = booking.booking_id,
            booking_ref = %booking.booking_ref,
            "created pending booking"
        );

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, id: BookingId) -> Result<Booking, Error> {
        store_call(self.timeouts.store, self.store.find_booking(id))
            .await?
            .ok_or_else(not_found_error)
    }

    #[tracing::instrument(skip(self))]
    async fn list_bookings(&self, filter: BookingFilter) -> Result<Vec<BookingSummary>, Error> {
        let bookings = store_call(self.timeouts.store, self.store.list_bookings(&filter)).await?;

        Ok(bookings
            .iter()
            .map(|booking| booking.summary(filter.include_contact))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_booking(&self, id: BookingId) -> Result<(), Error> {
        if !store_call(self.timeouts.store, self.store.delete_booking(id)).await? {
            return Err(not_found_error());
        }

        tracing::info!("deleted booking");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn booking_stats(&self, today: NaiveDate) -> Result<BookingStats, Error> {
        let (total, today) = futures::try_join!(
            store_call(self.timeouts.store, self.store.count_bookings(None)),
            store_call(self.timeouts.store, self.store.count_bookings(Some(today))),
        )?;

        Ok(BookingStats { total, today })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::NaiveTime;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::db::{MemoryBookingStore, MemoryFleetCatalog};
    use crate::entities::{ServiceClass, Status};
    use crate::reference::ReferenceGenerator;
    use crate::seal::QuoteSealer;

    /// Hands out the same reference `repeats` times before switching to
    /// unique ones.
    struct StuckReference {
        repeats: usize,
        calls: AtomicUsize,
    }

    impl ReferenceGenerator for StuckReference {
        fn generate(&self) -> String {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.repeats {
                "TXN0-STUCK".into()
            } else {
                format!("TXN0-FRESH{}", call)
            }
        }
    }

    fn sealer() -> QuoteSealer {
        QuoteSealer::from_secret("booking-api")
    }

    fn draft(fare: i64) -> TripDraft {
        let mut draft = TripDraft {
            pickup: "Airport".into(),
            drop: "Downtown".into(),
            service_class: ServiceClass::OneWay,
            date: NaiveDate::from_ymd_opt(2099, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            vehicle_id: Uuid::new_v4(),
            vehicle_display_name: "Sedan".into(),
            fare: Decimal::from(fare),
            seal: String::new(),
        };
        draft.seal = sealer().seal_draft(&draft);
        draft
    }

    fn contact() -> Contact {
        Contact::new("Asha Rao", "9876543210", Some("asha@mail.example".into()))
    }

    fn engine_with(references: StuckReference) -> Engine {
        Engine::new(
            Arc::new(MemoryFleetCatalog::new()),
            Arc::new(MemoryBookingStore::new()),
        )
        .with_references(Arc::new(references))
        .with_sealer(sealer())
    }

    #[tokio::test]
    async fn created_bookings_read_back_as_pending() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });

        let created = engine.create_booking(draft(450), contact()).await.unwrap();
        let found = engine.find_booking(created.booking_id).await.unwrap();

        assert_eq!(found.status, Status::Pending);
        assert_eq!(found.estimated_fare, Decimal::from(450));
        assert_eq!(found.booking_ref, created.booking_ref);
    }

    #[tokio::test]
    async fn duplicate_reference_is_retried_once() {
        let engine = engine_with(StuckReference {
            repeats: 1,
            calls: AtomicUsize::new(0),
        });

        // the first booking takes the stuck reference
        engine.create_booking(draft(450), contact()).await.unwrap();

        let engine = Engine {
            references: Arc::new(StuckReference {
                repeats: 1,
                calls: AtomicUsize::new(0),
            }),
            ..engine
        };
        let second = engine.create_booking(draft(300), contact()).await.unwrap();

        assert_eq!(second.booking_ref, "TXN0-FRESH1");
    }

    #[tokio::test]
    async fn second_collision_surfaces_as_persistence_error() {
        let engine = engine_with(StuckReference {
            repeats: usize::MAX,
            calls: AtomicUsize::new(0),
        });

        engine.create_booking(draft(450), contact()).await.unwrap();
        let err = engine.create_booking(draft(450), contact()).await.unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::PersistenceError);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn invalid_drafts_and_contacts_are_rejected_before_storage() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });

        let mut no_vehicle = draft(450);
        no_vehicle.vehicle_id = Uuid::nil();
        let err = engine.create_booking(no_vehicle, contact()).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidDraft);

        let err = engine
            .create_booking(draft(450), Contact::new("Asha", "123", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidRequest);

        let stats = engine
            .booking_stats(NaiveDate::from_ymd_opt(2099, 3, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(stats.total, 0);
    }

    #[tokio::test]
    async fn edited_fares_and_vehicles_are_refused() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });

        let mut cheaper = draft(380);
        cheaper.fare = Decimal::new(1, 2);
        let err = engine.create_booking(cheaper, contact()).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidDraft);

        let mut unknown_vehicle = draft(380);
        unknown_vehicle.vehicle_id = Uuid::new_v4();
        let err = engine
            .create_booking(unknown_vehicle, contact())
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidDraft);

        let mut unsealed = draft(380);
        unsealed.seal.clear();
        assert!(engine.create_booking(unsealed, contact()).await.is_err());

        let foreign = Engine::new(
            Arc::new(MemoryFleetCatalog::new()),
            Arc::new(MemoryBookingStore::new()),
        );
        let err = foreign.create_booking(draft(380), contact()).await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidDraft);

        let stats = engine
            .booking_stats(NaiveDate::from_ymd_opt(2099, 3, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(stats.total, 0);
    }

    #[tokio::test]
    async fn drafts_for_past_trips_are_refused() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });

        let mut stale = draft(450);
        stale.date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let err = engine.create_booking(stale, contact()).await.unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn delete_is_irreversible_and_reports_missing_records() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });
        let booking = engine.create_booking(draft(450), contact()).await.unwrap();

        engine.delete_booking(booking.booking_id).await.unwrap();

        assert!(engine.find_booking(booking.booking_id).await.unwrap_err().is_not_found());
        assert!(engine.delete_booking(booking.booking_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn stats_count_total_and_today() {
        let engine = engine_with(StuckReference {
            repeats: 0,
            calls: AtomicUsize::new(0),
        });
        engine.create_booking(draft(450), contact()).await.unwrap();

        let mut tomorrow = draft(300);
        tomorrow.date = NaiveDate::from_ymd_opt(2099, 3, 2).unwrap();
        engine.create_booking(tomorrow, contact()).await.unwrap();

        let stats = engine
            .booking_stats(NaiveDate::from_ymd_opt(2099, 3, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(stats, BookingStats { total: 2, today: 1 });
    }
}
