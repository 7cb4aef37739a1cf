use super::helpers::catalog_call;
use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::FleetAPI,
    entities::{VehicleOffering, VehicleSpec},
    error::{vehicle_not_found_error, Error},
};

#[async_trait]
impl FleetAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, Error> {
        catalog_call(self.timeouts.catalog, self.catalog.list_vehicles()).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_vehicle(&self, spec: VehicleSpec) -> Result<VehicleOffering, Error> {
        spec.validate()?;

        let vehicle = VehicleOffering::new(spec);
        catalog_call(self.timeouts.catalog, self.catalog.insert_vehicle(&vehicle)).await?;

        tracing::info!(vehicle_id = %vehicle.id, "added vehicle to the catalog");

        Ok(vehicle)
    }

    /// Rate changes apply to future quotes only. Bookings already hold their
    /// fare.
    #[tracing::instrument(skip(self))]
    async fn update_vehicle(&self, id: Uuid, spec: VehicleSpec) -> Result<VehicleOffering, Error> {
        spec.validate()?;

        let vehicle = VehicleOffering::with_id(id, spec);
        if !catalog_call(self.timeouts.catalog, self.catalog.update_vehicle(&vehicle)).await? {
            return Err(vehicle_not_found_error());
        }

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_vehicle(&self, id: Uuid) -> Result<(), Error> {
        if !catalog_call(self.timeouts.catalog, self.catalog.delete_vehicle(id)).await? {
            return Err(vehicle_not_found_error());
        }

        Ok(())
    }
}
