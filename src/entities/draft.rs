use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Money, Quote, RouteRequest, ServiceClass};
use crate::error::{invalid_draft_error, invalid_request_error, Error};

/// Schedules this far in the past are still accepted, to absorb the time a
/// rider spends on the form.
const SCHEDULE_GRACE_MINUTES: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Schedule {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn validate(&self, now: NaiveDateTime) -> Result<(), Error> {
        if self.starts_at() < now - Duration::minutes(SCHEDULE_GRACE_MINUTES) {
            return Err(invalid_request_error("cannot select a past date or time"));
        }

        Ok(())
    }
}

/// The rider's selected quote, carried from the quote step to the
/// confirmation step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripDraft {
    pub pickup: String,
    pub drop: String,
    pub service_class: ServiceClass,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub vehicle_id: Uuid,
    pub vehicle_display_name: String,
    pub fare: Money,
    /// Issued with the quote. A draft whose seal does not match its terms
    /// is refused at booking time.
    pub seal: String,
}

impl TripDraft {
    pub fn from_quote(
        request: &RouteRequest,
        schedule: Schedule,
        quote: &Quote,
        now: NaiveDateTime,
    ) -> Result<Self, Error> {
        request.validate()?;
        schedule.validate(now)?;

        if quote.service_class != request.service_class {
            return Err(invalid_request_error(
                "quote does not match the requested service class",
            ));
        }

        Ok(Self {
            pickup: request.pickup.trim().to_string(),
            drop: request.drop.trim().to_string(),
            service_class: request.service_class,
            date: schedule.date,
            time: schedule.time,
            vehicle_id: quote.vehicle_id,
            vehicle_display_name: quote.vehicle_name.clone(),
            fare: quote.fare,
            seal: quote.seal.clone(),
        })
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.date, self.time)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.vehicle_id.is_nil() {
            return Err(invalid_draft_error("vehicle is required"));
        }

        if self.vehicle_display_name.trim().is_empty() {
            return Err(invalid_draft_error("vehicle name is required"));
        }

        if self.pickup.trim().is_empty() {
            return Err(invalid_draft_error("pickup location is required"));
        }

        if self.drop.trim().is_empty() {
            return Err(invalid_draft_error("drop location is required"));
        }

        if self.fare < Decimal::ZERO {
            return Err(invalid_draft_error("fare cannot be negative"));
        }

        Ok(())
    }
}
