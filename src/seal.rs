use std::fmt;

use uuid::Uuid;

use crate::entities::{Money, Quote, RouteRequest, ServiceClass, TripDraft};

const KEY_CONTEXT: &str = "caballus-booking quote seal v1";

/// Signs the terms of every issued quote so a draft handed back by a client
/// can be checked against what was actually quoted. The seal covers the
/// vehicle, the route, the service class and the fare; the schedule is the
/// rider's to choose and stays outside it.
#[derive(Clone)]
pub struct QuoteSealer {
    key: [u8; blake3::KEY_LEN],
}

impl QuoteSealer {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
        }
    }

    /// A throwaway key. Drafts sealed under it do not survive a restart.
    pub fn random() -> Self {
        Self {
            key: rand::random(),
        }
    }

    pub fn seal_quote(&self, request: &RouteRequest, quote: &Quote) -> String {
        self.digest(
            quote.vehicle_id,
            request.pickup.trim(),
            request.drop.trim(),
            quote.service_class,
            quote.fare,
        )
        .to_hex()
        .to_string()
    }

    pub fn seal_draft(&self, draft: &TripDraft) -> String {
        self.draft_digest(draft).to_hex().to_string()
    }

    pub fn verify(&self, draft: &TripDraft) -> bool {
        match blake3::Hash::from_hex(draft.seal.as_str()) {
            // Hash equality is constant time
            Ok(seal) => seal == self.draft_digest(draft),
            Err(_) => false,
        }
    }

    fn draft_digest(&self, draft: &TripDraft) -> blake3::Hash {
        self.digest(
            draft.vehicle_id,
            draft.pickup.trim(),
            draft.drop.trim(),
            draft.service_class,
            draft.fare,
        )
    }

    fn digest(
        &self,
        vehicle_id: Uuid,
        pickup: &str,
        drop: &str,
        class: ServiceClass,
        fare: Money,
    ) -> blake3::Hash {
        let fare = fare.normalize().to_string();

        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(vehicle_id.as_bytes());
        for field in [pickup, drop, class.name(), fare.as_str()] {
            // length prefixes keep "ab"+"c" and "a"+"bc" apart
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }

        hasher.finalize()
    }
}

impl fmt::Debug for QuoteSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteSealer").finish_non_exhaustive()
    }
}
