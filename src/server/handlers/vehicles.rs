use axum::extract::{Extension, Json, Path};
use uuid::Uuid;

use crate::auth::{Authorizor, User};
use crate::entities::{VehicleOffering, VehicleSpec};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
) -> Result<Json<Vec<VehicleOffering>>, Error> {
    gate.authorize(&user, "manage_vehicles")?;

    let vehicles = api.list_vehicles().await?;

    Ok(vehicles.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Json(spec): Json<VehicleSpec>,
) -> Result<Json<VehicleOffering>, Error> {
    gate.authorize(&user, "manage_vehicles")?;

    let vehicle = api.create_vehicle(spec).await?;

    Ok(vehicle.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<Uuid>,
    Json(spec): Json<VehicleSpec>,
) -> Result<Json<VehicleOffering>, Error> {
    gate.authorize(&user, "manage_vehicles")?;

    let vehicle = api.update_vehicle(id, spec).await?;

    Ok(vehicle.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Extension(gate): Extension<Authorizor>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, Error> {
    gate.authorize(&user, "manage_vehicles")?;

    api.delete_vehicle(id).await?;

    Ok(().into())
}
