mod booking_api;
mod fleet_api;
mod helpers;
mod lifecycle_api;
mod quote_api;

use std::sync::Arc;
use std::time::Duration;

use crate::{
    api::API,
    config::Config,
    db::{BookingStore, FleetCatalog, PgStore},
    error::Error,
    external::{DistanceEstimator, PlaceholderEstimator},
    notify::{LogHook, TransitionHook},
    reference::{ReferenceGenerator, TimestampReference},
    seal::QuoteSealer,
};

/// Upper bounds on single catalog and store calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub catalog: Duration,
    pub store: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            catalog: Duration::from_secs(3),
            store: Duration::from_secs(5),
        }
    }
}

/// The quote-to-booking core. Collaborators sit behind traits so the same
/// engine runs against Postgres in production and in-memory stores in tests.
pub struct Engine {
    catalog: Arc<dyn FleetCatalog>,
    store: Arc<dyn BookingStore>,
    estimator: Arc<dyn DistanceEstimator>,
    references: Arc<dyn ReferenceGenerator>,
    hook: Arc<dyn TransitionHook>,
    sealer: QuoteSealer,
    timeouts: Timeouts,
}

impl Engine {
    pub fn new(catalog: Arc<dyn FleetCatalog>, store: Arc<dyn BookingStore>) -> Self {
        Self {
            catalog,
            store,
            estimator: Arc::new(PlaceholderEstimator),
            references: Arc::new(TimestampReference),
            hook: Arc::new(LogHook),
            sealer: QuoteSealer::random(),
            timeouts: Timeouts::default(),
        }
    }

    #[tracing::instrument(name = "Engine::connect", skip_all)]
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let store = Arc::new(
            PgStore::connect(&config.database_url, config.database_max_connections).await?,
        );

        let sealer = match &config.quote_secret {
            Some(secret) => QuoteSealer::from_secret(secret),
            None => {
                tracing::warn!("QUOTE_SECRET not set, open drafts will not survive a restart");
                QuoteSealer::random()
            }
        };

        Ok(Self::new(store.clone(), store)
            .with_sealer(sealer)
            .with_timeouts(config.timeouts()))
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn DistanceEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_references(mut self, references: Arc<dyn ReferenceGenerator>) -> Self {
        self.references = references;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn TransitionHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn with_sealer(mut self, sealer: QuoteSealer) -> Self {
        self.sealer = sealer;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

impl API for Engine {}
