use async_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::entities::{Booking, Status};

/// Called once per successful lifecycle transition, after the new status is
/// persisted. Rider/driver notification lives behind this.
pub trait TransitionHook: Send + Sync {
    fn on_transition(&self, booking: &Booking, previous: Status, new: Status);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub booking: Booking,
    pub previous: Status,
    pub new: Status,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogHook;

impl TransitionHook for LogHook {
    fn on_transition(&self, booking: &Booking, previous: Status, new: Status) {
        tracing::info!(
            booking_id = booking.booking_id,
            booking_ref = %booking.booking_ref,
            %previous,
            %new,
            "booking status changed"
        );
    }
}

/// Forwards transitions to an async consumer.
#[derive(Clone, Debug)]
pub struct ChannelHook {
    sender: Sender<TransitionEvent>,
}

impl ChannelHook {
    pub fn new() -> (Self, Receiver<TransitionEvent>) {
        let (sender, receiver) = async_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl TransitionHook for ChannelHook {
    fn on_transition(&self, booking: &Booking, previous: Status, new: Status) {
        let event = TransitionEvent {
            booking: booking.clone(),
            previous,
            new,
        };

        if let Err(err) = self.sender.try_send(event) {
            tracing::warn!(
                booking_id = booking.booking_id,
                "dropping transition event, consumer is gone: {}",
                err
            );
        }
    }
}
