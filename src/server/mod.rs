mod handlers;

use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequest, RequestParts},
    routing::{get, patch, post, put},
    Router,
};

use crate::server::handlers::{bookings, quotes, vehicles};
use crate::{
    auth::{Authorizor, User},
    error::{configuration_error, Error},
};

pub use crate::api::DynAPI;

/// Set by the authentication proxy in front of this service.
pub const ROLES_HEADER: &str = "x-caballus-roles";

#[async_trait]
impl<B: Send> FromRequest<B> for User {
    type Rejection = Infallible;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let roles = req
            .headers()
            .get(ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        Ok(User::from_header(roles))
    }
}

pub fn router(api: DynAPI, gate: Authorizor) -> Router {
    Router::new()
        .route("/quotes", post(quotes::create))
        .route("/bookings", post(bookings::create).get(bookings::list))
        .route(
            "/bookings/:id",
            get(bookings::find).delete(bookings::delete),
        )
        .route("/bookings/:id/status", patch(bookings::transition))
        .route("/bookings/:id/reinstate", patch(bookings::reinstate))
        .route("/stats", get(bookings::stats))
        .route("/vehicles", get(vehicles::list).post(vehicles::create))
        .route(
            "/vehicles/:id",
            put(vehicles::update).delete(vehicles::delete),
        )
        .layer(Extension(api))
        .layer(Extension(gate))
}

pub async fn serve(api: DynAPI, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api, Authorizor::new()?);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(configuration_error)
}
