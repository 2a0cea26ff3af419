use std::fmt;

use super::message::Message;
use super::subscriber::SubscriberId;

/// Registry and broadcast activity mirrored to observer sinks.
///
/// Every accepted registration, deregistration, and broadcast produces one
/// `BusEvent`. Sinks are observability only: a sink that errors or is absent
/// never affects delivery to subscribers.
#[derive(Clone, Debug)]
pub enum BusEvent {
    SubscriberAdded { id: SubscriberId },
    SubscriberRemoved { id: SubscriberId },
    Broadcast(Message),
}

impl BusEvent {
    pub fn subscriber_id(&self) -> Option<SubscriberId> {
        match self {
            BusEvent::SubscriberAdded { id } | BusEvent::SubscriberRemoved { id } => Some(*id),
            BusEvent::Broadcast(_) => None,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            BusEvent::Broadcast(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for BusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusEvent::SubscriberAdded { id } => write!(f, "client added ({id})"),
            BusEvent::SubscriberRemoved { id } => write!(f, "client removed ({id})"),
            BusEvent::Broadcast(message) => write!(f, "{message}"),
        }
    }
}
