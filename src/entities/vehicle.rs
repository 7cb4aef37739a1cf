use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::ServiceClass;
use crate::error::{invalid_request_error, Error};

pub type Money = Decimal;

/// Minor-unit digits kept on every fare.
const MONEY_SCALE: u32 = 2;

pub fn round_money(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalState {
    Active,
    Inactive,
}

impl OperationalState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleOffering {
    pub id: Uuid,
    pub display_name: String,
    pub service_class: ServiceClass,
    pub rate_per_distance_unit: Money,
    pub base_fare: Money,
    pub operational_state: OperationalState,
}

impl VehicleOffering {
    pub fn new(spec: VehicleSpec) -> Self {
        Self::with_id(Uuid::new_v4(), spec)
    }

    pub fn with_id(id: Uuid, spec: VehicleSpec) -> Self {
        Self {
            id,
            display_name: spec.display_name,
            service_class: spec.service_class,
            rate_per_distance_unit: spec.rate_per_distance_unit,
            base_fare: spec.base_fare,
            operational_state: spec.operational_state,
        }
    }

    pub fn is_active(&self) -> bool {
        self.operational_state == OperationalState::Active
    }

    /// `distance * rate + base`, rounded half-up to the minor unit.
    pub fn compute_fare(&self, distance: Decimal) -> Money {
        compute_fare(distance, self)
    }
}

pub fn compute_fare(distance: Decimal, vehicle: &VehicleOffering) -> Money {
    round_money(distance * vehicle.rate_per_distance_unit + vehicle.base_fare)
}

/// Operator-supplied catalog entry, before it is given an id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub display_name: String,
    pub service_class: ServiceClass,
    pub rate_per_distance_unit: Money,
    pub base_fare: Money,
    pub operational_state: OperationalState,
}

impl VehicleSpec {
    pub fn validate(&self) -> Result<(), Error> {
        if self.display_name.trim().is_empty() {
            return Err(invalid_request_error("vehicle name is required"));
        }

        if self.rate_per_distance_unit <= Decimal::ZERO {
            return Err(invalid_request_error("rate must be a positive number"));
        }

        if self.base_fare <= Decimal::ZERO {
            return Err(invalid_request_error("base fare must be a positive number"));
        }

        Ok(())
    }
}

/// A catalog row as it comes off the wire or out of storage. Numeric columns
/// may be missing; such rows never reach the quote service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawVehicleRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub rate_per_km: Option<Decimal>,
    pub base_fare: Option<Decimal>,
    pub status: Option<String>,
}

impl TryFrom<RawVehicleRow> for VehicleOffering {
    type Error = String;

    fn try_from(row: RawVehicleRow) -> Result<Self, Self::Error> {
        let display_name = row
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or("missing name")?;

        let service_class: ServiceClass = row
            .service_type
            .as_deref()
            .ok_or("missing service_type")?
            .parse()
            .map_err(|_| "unrecognized service_type")?;

        let rate_per_distance_unit = row.rate_per_km.ok_or("missing rate_per_km")?;
        let base_fare = row.base_fare.ok_or("missing base_fare")?;

        if rate_per_distance_unit.is_sign_negative() || base_fare.is_sign_negative() {
            return Err("negative rate or base fare".into());
        }

        let operational_state = row
            .status
            .as_deref()
            .and_then(OperationalState::parse)
            .ok_or("missing or unrecognized status")?;

        Ok(Self {
            id: row.id,
            display_name,
            service_class,
            rate_per_distance_unit,
            base_fare,
            operational_state,
        })
    }
}
