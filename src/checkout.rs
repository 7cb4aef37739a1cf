use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    api::DynAPI,
    entities::{Booking, Contact, Quote, RouteRequest, Schedule, TripDraft},
    error::{invalid_draft_error, Error},
};

/// Outcome of [`DraftStore::claim`].
#[derive(Clone, Debug, PartialEq)]
pub enum Claim {
    Empty,
    /// Another confirmation already holds the draft.
    Busy,
    Claimed { ticket: u64, draft: TripDraft },
}

/// Holds the one trip a client is in the middle of booking.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Replaces whatever was saved before, claimed or not.
    async fn save(&self, draft: TripDraft);
    async fn load(&self) -> Option<TripDraft>;
    /// Hands the draft to a single confirmation. The draft stays readable
    /// until the claim is settled.
    async fn claim(&self) -> Claim;
    /// Ends a claim: a booked draft is removed, otherwise it becomes
    /// claimable again. Stale tickets are ignored.
    async fn settle(&self, ticket: u64, booked: bool);
}

#[derive(Debug, Default)]
struct Slot {
    draft: Option<TripDraft>,
    ticket: u64,
    claimed: bool,
}

/// Single-slot draft holder scoped to one client tab. Not durable.
#[derive(Debug, Default)]
pub struct TabDraftStore {
    slot: Mutex<Slot>,
}

impl TabDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for TabDraftStore {
    async fn save(&self, draft: TripDraft) {
        let mut slot = self.slot.lock().await;
        slot.draft = Some(draft);
        slot.ticket += 1;
        slot.claimed = false;
    }

    async fn load(&self) -> Option<TripDraft> {
        self.slot.lock().await.draft.clone()
    }

    async fn claim(&self) -> Claim {
        let mut slot = self.slot.lock().await;
        if slot.claimed {
            return Claim::Busy;
        }

        match slot.draft.clone() {
            Some(draft) => {
                slot.claimed = true;
                Claim::Claimed {
                    ticket: slot.ticket,
                    draft,
                }
            }
            None => Claim::Empty,
        }
    }

    async fn settle(&self, ticket: u64, booked: bool) {
        let mut slot = self.slot.lock().await;
        if slot.ticket != ticket {
            return;
        }

        if booked {
            slot.draft = None;
        }
        slot.claimed = false;
    }
}

/// The rider's path from a chosen quote to a pending booking.
pub struct Checkout {
    api: DynAPI,
    drafts: Arc<dyn DraftStore>,
}

impl Checkout {
    pub fn new(api: DynAPI, drafts: Arc<dyn DraftStore>) -> Self {
        Self { api, drafts }
    }

    pub async fn select(
        &self,
        request: &RouteRequest,
        schedule: Schedule,
        quote: &Quote,
    ) -> Result<TripDraft, Error> {
        self.select_at(request, schedule, quote, Local::now().naive_local())
            .await
    }

    #[tracing::instrument(skip(self, quote), fields(vehicle_id = %quote.vehicle_id))]
    pub async fn select_at(
        &self,
        request: &RouteRequest,
        schedule: Schedule,
        quote: &Quote,
        now: NaiveDateTime,
    ) -> Result<TripDraft, Error> {
        let draft = TripDraft::from_quote(request, schedule, quote, now)?;
        self.drafts.save(draft.clone()).await;

        Ok(draft)
    }

    pub async fn draft(&self) -> Option<TripDraft> {
        self.drafts.load().await
    }

    /// Books the saved draft. `Ok(None)` means there is nothing to confirm
    /// and the rider belongs back on the quote step. The draft survives any
    /// failure so the rider can retry, and is booked at most once.
    #[tracing::instrument(skip_all)]
    pub async fn confirm(&self, contact: Contact) -> Result<Option<Booking>, Error> {
        let (ticket, draft) = match self.drafts.claim().await {
            Claim::Claimed { ticket, draft } => (ticket, draft),
            Claim::Empty => {
                tracing::info!("no trip draft to confirm");
                return Ok(None);
            }
            Claim::Busy => {
                tracing::warn!("trip draft is already being confirmed");
                return Err(invalid_draft_error("this trip is already being booked"));
            }
        };

        let result = self.api.create_booking(draft, contact).await;
        self.drafts.settle(ticket, result.is_ok()).await;

        result.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::db::{MemoryBookingStore, MemoryFleetCatalog};
    use crate::engine::Engine;
    use crate::entities::{ServiceClass, Status};
    use crate::seal::QuoteSealer;

    fn sealer() -> QuoteSealer {
        QuoteSealer::from_secret("checkout")
    }

    fn checkout() -> Checkout {
        let engine = Engine::new(
            Arc::new(MemoryFleetCatalog::new()),
            Arc::new(MemoryBookingStore::new()),
        )
        .with_sealer(sealer());

        Checkout::new(Arc::new(engine), Arc::new(TabDraftStore::new()))
    }

    fn quote(class: ServiceClass) -> Quote {
        let mut quote = Quote {
            vehicle_id: Uuid::new_v4(),
            vehicle_name: "Sedan".into(),
            service_class: class,
            distance: Decimal::from(40),
            fare: Decimal::from(450),
            seal: String::new(),
        };
        let request = RouteRequest::new("Airport", "Downtown", class);
        quote.seal = sealer().seal_quote(&request, &quote);
        quote
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2099, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::new(
            NaiveDate::from_ymd_opt(2099, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn last_selection_wins() {
        use tokio_test::block_on;

        let drafts = TabDraftStore::new();
        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::OneWay);

        let draft = |quote: Quote| TripDraft::from_quote(&request, schedule(), &quote, now());
        let first = draft(quote(ServiceClass::OneWay)).unwrap();
        let second = draft(quote(ServiceClass::OneWay)).unwrap();

        block_on(drafts.save(first));
        block_on(drafts.save(second.clone()));
        assert_eq!(block_on(drafts.load()), Some(second.clone()));

        let ticket = match block_on(drafts.claim()) {
            Claim::Claimed { ticket, draft } => {
                assert_eq!(draft, second);
                ticket
            }
            other => panic!("expected a claim, got {:?}", other),
        };
        assert_eq!(block_on(drafts.claim()), Claim::Busy);

        block_on(drafts.settle(ticket, true));
        assert_eq!(block_on(drafts.load()), None);
        assert_eq!(block_on(drafts.claim()), Claim::Empty);
    }

    #[test]
    fn reselecting_during_a_confirmation_keeps_the_new_draft() {
        use tokio_test::block_on;

        let drafts = TabDraftStore::new();
        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::OneWay);
        let draft = |quote: Quote| TripDraft::from_quote(&request, schedule(), &quote, now());
        let replacement = draft(quote(ServiceClass::OneWay)).unwrap();

        block_on(drafts.save(draft(quote(ServiceClass::OneWay)).unwrap()));
        let ticket = match block_on(drafts.claim()) {
            Claim::Claimed { ticket, .. } => ticket,
            other => panic!("expected a claim, got {:?}", other),
        };

        block_on(drafts.save(replacement.clone()));
        block_on(drafts.settle(ticket, true));

        assert_eq!(block_on(drafts.load()), Some(replacement));
    }

    #[tokio::test]
    async fn confirm_without_a_draft_is_not_an_error() {
        let booking = checkout()
            .confirm(Contact::new("Asha Rao", "9876543210", None))
            .await
            .unwrap();

        assert!(booking.is_none());
    }

    #[tokio::test]
    async fn confirm_books_the_frozen_fare_and_clears_the_draft() {
        let checkout = checkout();
        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::OneWay);

        checkout
            .select_at(&request, schedule(), &quote(ServiceClass::OneWay), now())
            .await
            .unwrap();
        let booking = checkout
            .confirm(Contact::new("Asha Rao", "9876543210", None))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(booking.status, Status::Pending);
        assert_eq!(booking.estimated_fare, Decimal::from(450));
        assert!(checkout.draft().await.is_none());
    }

    #[tokio::test]
    async fn invalid_contact_keeps_the_draft() {
        let checkout = checkout();
        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::OneWay);

        checkout
            .select_at(&request, schedule(), &quote(ServiceClass::OneWay), now())
            .await
            .unwrap();
        let err = checkout
            .confirm(Contact::new("A", "12", None))
            .await
            .unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::InvalidRequest);
        assert!(checkout.draft().await.is_some());
    }

    #[tokio::test]
    async fn past_schedules_and_mismatched_quotes_are_not_saved() {
        let checkout = checkout();
        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::OneWay);
        let yesterday = Schedule::new(
            NaiveDate::from_ymd_opt(2099, 2, 28).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );

        assert!(checkout
            .select_at(&request, yesterday, &quote(ServiceClass::OneWay), now())
            .await
            .is_err());
        assert!(checkout
            .select_at(&request, schedule(), &quote(ServiceClass::RoundTrip), now())
            .await
            .is_err());
        assert!(checkout.draft().await.is_none());
    }
}
