use std::io::{self, Result as IoResult, Stdout, Write};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::event::BusEvent;

/// Abstraction over an output target that consumes bus activity.
///
/// Sinks observe the coordination loop; they must never be load-bearing.
/// A failing sink is logged and skipped, and delivery to subscribers
/// continues regardless.
pub trait EventSink: Send + Sync {
    /// Handle one bus event. The sink decides how to format it.
    fn handle(&mut self, event: &BusEvent) -> IoResult<()>;
}

/// Writer-backed sink producing human-readable status lines.
///
/// Registration changes get the configured prefix
/// (`"[linebus] client added (<id>)"`); broadcasts are echoed verbatim, one
/// line per message. Works over any [`Write`] target, typically stdout or an
/// append-mode log file.
pub struct WriterSink<W: Write> {
    writer: W,
    prefix: String,
}

impl WriterSink<Stdout> {
    pub fn stdout(prefix: impl Into<String>) -> Self {
        Self {
            writer: io::stdout(),
            prefix: prefix.into(),
        }
    }
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, prefix: impl Into<String>) -> Self {
        Self {
            writer,
            prefix: prefix.into(),
        }
    }
}

impl<W: Write + Send + Sync> EventSink for WriterSink<W> {
    fn handle(&mut self, event: &BusEvent) -> IoResult<()> {
        match event {
            BusEvent::Broadcast(message) => writeln!(self.writer, "{message}")?,
            status => writeln!(self.writer, "{} {status}", self.prefix)?,
        }
        self.writer.flush()
    }
}

/// Accumulates observed events in memory, in processing order.
///
/// Clones share one buffer, so a test can keep a clone for assertions while
/// the bus owns the registered sink.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<BusEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything observed so far.
    pub fn snapshot(&self) -> Vec<BusEvent> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &BusEvent) -> IoResult<()> {
        self.entries.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Forwards each observed event into a tokio channel so an async task can
/// tail bus activity.
///
/// Note this observes the whole bus, unlike a [`Subscription`], which is a
/// delivery endpoint for broadcasts only. Streaming clients get
/// subscriptions; embedders wiring their own metrics or audit trail get a
/// `ChannelSink`. Reports `BrokenPipe` once the receiving side is gone, at
/// which point the loop logs and drops further events for this sink.
///
/// [`Subscription`]: super::subscriber::Subscription
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<BusEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn handle(&mut self, event: &BusEvent) -> IoResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }
}
