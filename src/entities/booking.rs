use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Contact, Money, TripDraft};
use crate::error::{invalid_request_error, invalid_transition_error, Error};

pub type BookingId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Confirmed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Checks the `pending -> confirmed -> cancelled` edges. Returning to
    /// `pending` is never a transition; see [`Booking::reinstate`].
    pub fn check_transition(&self, target: Status) -> Result<(), Error> {
        match (self, target) {
            (current, target) if *current == target => Err(invalid_transition_error(format!(
                "booking is already {}",
                target
            ))),
            (Self::Pending, Self::Confirmed)
            | (Self::Pending, Self::Cancelled)
            | (Self::Confirmed, Self::Cancelled) => Ok(()),
            (current, target) => Err(invalid_transition_error(format!(
                "cannot move a {} booking to {}",
                current, target
            ))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(invalid_request_error(format!("unknown status: {}", other))),
        }
    }
}

/// A booking before the store has assigned its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub booking_ref: String,
    pub pickup_location: String,
    pub drop_location: String,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_mobile: String,
    pub customer_email: Option<String>,
    pub estimated_fare: Money,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    /// Freezes the draft's fare into the booking; it is never re-derived.
    pub fn new(draft: &TripDraft, contact: &Contact, booking_ref: String) -> Self {
        Self {
            booking_ref,
            pickup_location: draft.pickup.trim().to_string(),
            drop_location: draft.drop.trim().to_string(),
            trip_date: draft.date,
            trip_time: draft.time,
            vehicle_id: draft.vehicle_id,
            customer_name: contact.name.clone(),
            customer_mobile: contact.mobile.clone(),
            customer_email: contact.email.clone(),
            estimated_fare: draft.fare,
            created_at: Utc::now(),
        }
    }

    pub fn into_booking(self, booking_id: BookingId) -> Booking {
        Booking {
            booking_id,
            booking_ref: self.booking_ref,
            pickup_location: self.pickup_location,
            drop_location: self.drop_location,
            trip_date: self.trip_date,
            trip_time: self.trip_time,
            vehicle_id: self.vehicle_id,
            customer_name: self.customer_name,
            customer_mobile: self.customer_mobile,
            customer_email: self.customer_email,
            estimated_fare: self.estimated_fare,
            status: Status::Pending,
            version: 0,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booking_ref: String,
    pub pickup_location: String,
    pub drop_location: String,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub vehicle_id: Uuid,
    pub customer_name: String,
    pub customer_mobile: String,
    pub customer_email: Option<String>,
    pub estimated_fare: Money,
    pub status: Status,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Applies a lifecycle transition, returning the previous status.
    #[tracing::instrument(skip(self), fields(booking_id = self.booking_id))]
    pub fn transition(&mut self, target: Status) -> Result<Status, Error> {
        self.status.check_transition(target)?;

        let previous = self.status;
        self.status = target;
        self.version += 1;

        Ok(previous)
    }

    /// Un-cancels a booking. Deliberately not a [`Status::check_transition`]
    /// edge: callers must be separately authorized for it.
    #[tracing::instrument(skip(self), fields(booking_id = self.booking_id))]
    pub fn reinstate(&mut self) -> Result<Status, Error> {
        match self.status {
            Status::Cancelled => {
                self.status = Status::Pending;
                self.version += 1;
                Ok(Status::Cancelled)
            }
            current => Err(invalid_transition_error(format!(
                "only cancelled bookings can be reinstated, this one is {}",
                current
            ))),
        }
    }

    pub fn contact(&self) -> Contact {
        Contact {
            name: self.customer_name.clone(),
            mobile: self.customer_mobile.clone(),
            email: self.customer_email.clone(),
        }
    }

    pub fn summary(&self, include_contact: bool) -> BookingSummary {
        BookingSummary {
            booking_id: self.booking_id,
            booking_ref: self.booking_ref.clone(),
            customer_name: self.customer_name.clone(),
            trip_date: self.trip_date,
            trip_time: self.trip_time,
            vehicle_id: self.vehicle_id,
            estimated_fare: self.estimated_fare,
            status: self.status,
            created_at: self.created_at,
            contact: include_contact.then(|| self.contact()),
        }
    }
}

/// Operator list row. Mobile and email stay out unless asked for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking_id: BookingId,
    pub booking_ref: String,
    pub customer_name: String,
    pub trip_date: NaiveDate,
    pub trip_time: NaiveTime,
    pub vehicle_id: Uuid,
    pub estimated_fare: Money,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    pub status: Option<Status>,
    pub trip_date: Option<NaiveDate>,
    #[serde(default)]
    pub include_contact: bool,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.map_or(true, |status| booking.status == status)
            && self.trip_date.map_or(true, |date| booking.trip_date == date)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStats {
    pub total: i64,
    pub today: i64,
}
