use chrono::Utc;
use rand::distributions::{Distribution, Uniform};

const PREFIX: &str = "TXN";
const SUFFIX_LEN: usize = 8;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Mints external booking references without consulting the store. The store
/// still holds a unique index on the reference as a backstop.
pub trait ReferenceGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `TXN<unix millis>-<8 random base36 chars>`, e.g. `TXN1760870400123-7KQ2ZD0M`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampReference;

impl ReferenceGenerator for TimestampReference {
    fn generate(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let picker = Uniform::from(0..ALPHABET.len());
        let mut rng = rand::thread_rng();

        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[picker.sample(&mut rng)] as char)
            .collect();

        format!("{}{}-{}", PREFIX, millis, suffix)
    }
}
