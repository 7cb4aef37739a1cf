use axum::extract::{Extension, Json, Path, Query};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::auth::{Authorizor, User};
use crate::entities::{
    Booking, BookingFilter, BookingId, BookingStats, BookingSummary, Contact, Status, TripDraft,
};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    pub draft: TripDraft,
    pub contact: Contact,
}

#[derive(Serialize, Deserialize)]
pub struct TransitionParams {
    pub status: Status,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Booking>, Error> {
    gate.authorize(&user, "book")?;

    let booking = api.create_booking(params.draft, params.contact).await?;

    Ok(booking.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<BookingSummary>>, Error> {
    gate.authorize(&user, "list_bookings")?;

    let bookings = api.list_bookings(filter).await?;

    Ok(bookings.into())
}

pub async fn stats(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
) -> Result<Json<BookingStats>, Error> {
    gate.authorize(&user, "list_bookings")?;

    let stats = api.booking_stats(Local::now().date_naive()).await?;

    Ok(stats.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, Error> {
    gate.authorize(&user, "read_booking")?;

    let booking = api.find_booking(id).await?;

    Ok(booking.into())
}

pub async fn transition(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<BookingId>,
    Json(params): Json<TransitionParams>,
) -> Result<Json<Booking>, Error> {
    gate.authorize(&user, "transition_booking")?;

    let booking = api.transition_booking(id, params.status).await?;

    Ok(booking.into())
}

pub async fn reinstate(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, Error> {
    gate.authorize(&user, "reinstate_booking")?;

    let booking = api.reinstate_booking(id).await?;

    Ok(booking.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<BookingId>,
) -> Result<Json<()>, Error> {
    gate.authorize(&user, "delete_booking")?;

    api.delete_booking(id).await?;

    Ok(().into())
}
