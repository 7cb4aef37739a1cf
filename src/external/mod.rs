mod distance;

pub use distance::{
    placeholder_distance, DistanceEstimator, PlaceholderEstimator, MAX_DISTANCE, MIN_DISTANCE,
};
