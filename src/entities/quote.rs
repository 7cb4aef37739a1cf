use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Money, ServiceClass, VehicleOffering};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub service_class: ServiceClass,
    pub distance: Decimal,
    pub fare: Money,
    /// Set by the quote service; carried into the draft.
    pub seal: String,
}

impl Quote {
    pub fn new(vehicle: &VehicleOffering, distance: Decimal) -> Self {
        Self {
            vehicle_id: vehicle.id,
            vehicle_name: vehicle.display_name.clone(),
            service_class: vehicle.service_class,
            distance,
            fare: vehicle.compute_fare(distance),
            seal: String::new(),
        }
    }
}
