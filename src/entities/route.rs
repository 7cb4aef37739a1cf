use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{invalid_request_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceClass {
    #[serde(rename = "One-Way")]
    OneWay,
    #[serde(rename = "Round-Trip")]
    RoundTrip,
}

impl ServiceClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OneWay => "One-Way",
            Self::RoundTrip => "Round-Trip",
        }
    }
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "One-Way" => Ok(Self::OneWay),
            "Round-Trip" => Ok(Self::RoundTrip),
            other => Err(invalid_request_error(format!(
                "unrecognized service class: {}",
                other
            ))),
        }
    }
}

/// A rider's pickup/drop pair for one service class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub pickup: String,
    pub drop: String,
    pub service_class: ServiceClass,
}

impl RouteRequest {
    pub fn new(pickup: impl Into<String>, drop: impl Into<String>, class: ServiceClass) -> Self {
        Self {
            pickup: pickup.into(),
            drop: drop.into(),
            service_class: class,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.pickup.trim().is_empty() {
            return Err(invalid_request_error("pickup location is required"));
        }

        if self.drop.trim().is_empty() {
            return Err(invalid_request_error("drop location is required"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_locations_are_rejected() {
        let request = RouteRequest::new("  ", "Downtown", ServiceClass::OneWay);
        assert_eq!(request.validate().unwrap_err().code(), 100);

        let request = RouteRequest::new("Airport", "", ServiceClass::OneWay);
        assert!(request.validate().is_err());

        let request = RouteRequest::new("Airport", "Downtown", ServiceClass::RoundTrip);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn service_class_uses_catalog_names() {
        let json = serde_json::to_string(&ServiceClass::RoundTrip).unwrap();
        assert_eq!(json, "\"Round-Trip\"");

        let class: ServiceClass = "One-Way".parse().unwrap();
        assert_eq!(class, ServiceClass::OneWay);
        assert!("one way".parse::<ServiceClass>().is_err());
    }
}
