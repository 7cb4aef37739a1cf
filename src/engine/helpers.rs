use std::future::Future;
use std::time::Duration;

use crate::{
    db::BookingStore,
    entities::Booking,
    error::{
        catalog_unavailable_error, invalid_transition_error, not_found_error, persistence_error,
        Error,
    },
};

/// Bounds a catalog call; infrastructure failures and timeouts both surface
/// as `CatalogUnavailable`.
pub async fn catalog_call<T, F>(limit: Duration, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if err.is_retryable() || err.code() < 100 => {
            tracing::warn!("vehicle catalog call failed: {}", err);
            Err(catalog_unavailable_error(err.message))
        }
        Ok(Err(err)) => Err(err),
        Err(elapsed) => {
            tracing::warn!(?limit, "vehicle catalog call timed out");
            Err(catalog_unavailable_error(elapsed))
        }
    }
}

/// Bounds a booking store call; a timeout surfaces as `PersistenceError`.
/// Store errors, `DuplicateReference` included, pass through untouched.
pub async fn store_call<T, F>(limit: Duration, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(elapsed) => {
            tracing::warn!(?limit, "booking store call timed out");
            Err(persistence_error(elapsed))
        }
    }
}

/// Persists a status change made on `booking`, guarded by the version it was
/// read at. A lost race is reported as `NotFound` if the booking was deleted
/// and `InvalidTransition` otherwise. A write that timed out but landed
/// counts as committed.
#[tracing::instrument(skip(store, booking), fields(booking_id = booking.booking_id))]
pub async fn commit_status(
    store: &dyn BookingStore,
    limit: Duration,
    booking: &Booking,
    expected_version: i32,
) -> Result<(), Error> {
    let written =
        match tokio::time::timeout(limit, store.update_booking_status(booking, expected_version))
            .await
        {
            Ok(result) => result?,
            Err(elapsed) => {
                tracing::warn!(?limit, "status write timed out, checking whether it landed");

                match store_call(limit, store.find_booking(booking.booking_id)).await? {
                    Some(current)
                        if current.version == booking.version
                            && current.status == booking.status =>
                    {
                        tracing::info!("status write landed before the timeout");
                        true
                    }
                    _ => return Err(persistence_error(elapsed)),
                }
            }
        };

    if written {
        return Ok(());
    }

    tracing::info!("booking changed since it was read, rejecting the write");

    match store_call(limit, store.find_booking(booking.booking_id)).await? {
        None => Err(not_found_error()),
        Some(current) => Err(invalid_transition_error(format!(
            "booking was modified concurrently and is now {}",
            current.status
        ))),
    }
}
