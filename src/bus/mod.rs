//! Broadcast bus: one coordination loop owning the subscriber registry, fed
//! by a single command channel, fanning every published message out to all
//! currently registered subscribers and mirroring activity to observer sinks.

pub mod core;
pub mod error;
pub mod event;
pub mod message;
pub mod sink;
pub mod subscriber;

pub use self::core::{Bus, BusHandle};
pub use error::BusError;
pub use event::BusEvent;
pub use message::Message;
pub use sink::{ChannelSink, EventSink, MemorySink, WriterSink};
pub use subscriber::{SubscriberId, Subscription};
