//! # linebus: line-oriented broadcast bus
//!
//! linebus accepts discrete text events (one per line) from standard input or
//! HTTP POST and fans each one out, in arrival order, to every currently
//! connected streaming client over a long-lived Server-Sent-Events style
//! response.
//!
//! ## Core Concepts
//!
//! - **Bus**: the single broadcast authority. One spawned coordination loop
//!   owns the subscriber registry and drains one command channel, so every
//!   registration, deregistration, and broadcast is serialized and ordering
//!   falls out of queue order.
//! - **Subscription**: a per-connection delivery handle. Each subscriber gets
//!   its own unbounded channel, so a stalled client never delays the loop or
//!   its peers. Dropping the handle deregisters it.
//! - **Sinks**: optional observers ([`EventSink`]) mirroring registry changes
//!   and broadcast echoes to stdout, a log file, memory, or a channel. Sinks
//!   are observability only and never affect delivery.
//! - **Adapters**: the HTTP surface ([`server::router`]) and the stdin
//!   watcher ([`ingest::watch_stdin`]) are thin callers that push lines into
//!   the bus or relay its fan-out onto the wire.
//!
//! ## Quick Start
//!
//! ```no_run
//! use linebus::{Bus, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Bus::new();
//!     bus.listen();
//!     let handle = bus.handle();
//!
//!     // Direct use of the bus:
//!     let mut subscriber = handle.subscribe().await?;
//!     handle.publish("hello")?;
//!     assert_eq!(subscriber.recv().await.unwrap().as_bytes(), b"hello");
//!
//!     // Or serve it over HTTP: GET /_ streams, POST /_ publishes.
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8675").await?;
//!     axum::serve(listener, server::router(handle).into_make_service()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! For messages M1 published before M2, every subscriber receiving both sees
//! M1 first. A subscriber registered before a publish is dequeued receives
//! it exactly once; one registered after never does. Delivery is best-effort
//! per connection: there is no replay for late joiners, no acknowledgment,
//! and no drain on shutdown.

pub mod bus;
pub mod config;
pub mod ingest;
pub mod server;

pub use bus::{
    Bus, BusError, BusEvent, BusHandle, ChannelSink, EventSink, MemorySink, Message, SubscriberId,
    Subscription, WriterSink,
};
pub use config::{Config, LogTarget};
