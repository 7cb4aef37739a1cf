use axum::extract::{Extension, Json};

use crate::auth::{Authorizor, User};
use crate::entities::{Quote, RouteRequest};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Json(request): Json<RouteRequest>,
) -> Result<Json<Vec<Quote>>, Error> {
    gate.authorize(&user, "quote")?;

    let quotes = api.get_quotes(request).await?;

    Ok(quotes.into())
}
