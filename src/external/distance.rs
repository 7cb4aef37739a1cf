use rust_decimal::Decimal;

/// Shortest and longest trip the placeholder estimator will report.
pub const MIN_DISTANCE: u64 = 20;
pub const MAX_DISTANCE: u64 = 100;

/// Maps a pickup/drop pair to a trip distance. Implementations must be pure:
/// the quote shown to the rider and the fare frozen into the booking rely on
/// identical inputs producing identical distances.
pub trait DistanceEstimator: Send + Sync {
    fn estimate(&self, pickup: &str, drop: &str) -> Decimal;
}

/// Stand-in for a routing provider. Hashes the normalized pair with BLAKE3
/// and folds the digest into `MIN_DISTANCE..=MAX_DISTANCE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderEstimator;

impl DistanceEstimator for PlaceholderEstimator {
    fn estimate(&self, pickup: &str, drop: &str) -> Decimal {
        Decimal::from(placeholder_distance(pickup, drop))
    }
}

pub fn placeholder_distance(pickup: &str, drop: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(normalize(pickup).as_bytes());
    hasher.update(&[0x1f]);
    hasher.update(normalize(drop).as_bytes());

    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);

    MIN_DISTANCE + u64::from_le_bytes(prefix) % (MAX_DISTANCE - MIN_DISTANCE + 1)
}

fn normalize(location: &str) -> String {
    location.trim().to_lowercase()
}
