use super::helpers::commit_status;
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{BookingAPI, LifecycleAPI},
    entities::{Booking, BookingId, Status},
    error::Error,
};

#[async_trait]
impl LifecycleAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn transition_booking(&self, id: BookingId, target: Status) -> Result<Booking, Error> {
        let mut booking = self.find_booking(id).await?;
        let read_version = booking.version;

        let previous = booking.transition(target)?;
        commit_status(self.store.as_ref(), self.timeouts.store, &booking, read_version).await?;

        self.hook.on_transition(&booking, previous, booking.status);

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn reinstate_booking(&self, id: BookingId) -> Result<Booking, Error> {
        let mut booking = self.find_booking(id).await?;
        let read_version = booking.version;

        let previous = booking.reinstate()?;
        commit_status(self.store.as_ref(), self.timeouts.store, &booking, read_version).await?;

        self.hook.on_transition(&booking, previous, booking.status);

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::db::{MemoryBookingStore, MemoryFleetCatalog};
    use crate::entities::{Contact, ServiceClass, TripDraft};
    use crate::notify::{ChannelHook, TransitionEvent};

    async fn engine_with_booking() -> (Engine, Booking, async_channel::Receiver<TransitionEvent>) {
        let (hook, events) = ChannelHook::new();
        let engine = Engine::new(
            Arc::new(MemoryFleetCatalog::new()),
            Arc::new(MemoryBookingStore::new()),
        )
        .with_hook(Arc::new(hook));

        let mut draft = TripDraft {
            pickup: "Airport".into(),
            drop: "Downtown".into(),
            service_class: ServiceClass::OneWay,
            date: NaiveDate::from_ymd_opt(2099, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            vehicle_id: Uuid::new_v4(),
            vehicle_display_name: "Sedan".into(),
            fare: Decimal::from(450),
            seal: String::new(),
        };
        draft.seal = engine.sealer.seal_draft(&draft);
        let booking = engine
            .create_booking(draft, Contact::new("Asha Rao", "9876543210", None))
            .await
            .unwrap();

        (engine, booking, events)
    }

    #[tokio::test]
    async fn confirm_then_cancel_notifies_each_step() {
        let (engine, booking, events) = engine_with_booking().await;

        let confirmed = engine
            .transition_booking(booking.booking_id, Status::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, Status::Confirmed);

        let cancelled = engine
            .transition_booking(booking.booking_id, Status::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, Status::Cancelled);

        let first = events.try_recv().unwrap();
        assert_eq!((first.previous, first.new), (Status::Pending, Status::Confirmed));
        let second = events.try_recv().unwrap();
        assert_eq!((second.previous, second.new), (Status::Confirmed, Status::Cancelled));
        assert!(events.try_recv().is_err());

        let stored = engine.find_booking(booking.booking_id).await.unwrap();
        assert_eq!(stored.status, Status::Cancelled);
        assert_eq!(stored.estimated_fare, Decimal::from(450));
    }

    #[tokio::test]
    async fn rejected_transitions_leave_the_booking_alone() {
        let (engine, booking, events) = engine_with_booking().await;

        let err = engine
            .transition_booking(booking.booking_id, Status::Pending)
            .await
            .unwrap_err();
        assert!(err.is_invalid_transition());

        engine
            .transition_booking(booking.booking_id, Status::Cancelled)
            .await
            .unwrap();
        let err = engine
            .transition_booking(booking.booking_id, Status::Confirmed)
            .await
            .unwrap_err();
        assert!(err.is_invalid_transition());

        let stored = engine.find_booking(booking.booking_id).await.unwrap();
        assert_eq!(stored.status, Status::Cancelled);
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (engine, _, events) = engine_with_booking().await;

        let err = engine
            .transition_booking(9_999, Status::Confirmed)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn reinstate_only_applies_to_cancelled_bookings() {
        let (engine, booking, _events) = engine_with_booking().await;

        let err = engine.reinstate_booking(booking.booking_id).await.unwrap_err();
        assert!(err.is_invalid_transition());

        engine
            .transition_booking(booking.booking_id, Status::Cancelled)
            .await
            .unwrap();
        let reinstated = engine.reinstate_booking(booking.booking_id).await.unwrap();

        assert_eq!(reinstated.status, Status::Pending);
        assert_eq!(reinstated.version, 2);
    }
}
