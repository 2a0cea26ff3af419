use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task;
use uuid::Uuid;

use super::error::BusError;
use super::event::BusEvent;
use super::message::Message;
use super::sink::EventSink;
use super::subscriber::{SubscriberId, Subscription};

/// Operations submitted to the coordination loop. One flume channel carries
/// all three, so their relative submission order is the broadcast order.
pub(crate) enum Command {
    Subscribe(oneshot::Sender<(SubscriberId, mpsc::UnboundedReceiver<Message>)>),
    Unsubscribe(SubscriberId),
    Publish(Message),
}

/// The broadcast authority: owns the subscriber registry and fans every
/// published message out to all currently registered subscribers.
///
/// All registry mutation happens on one spawned coordination task that drains
/// a single command channel. Because at most one command is processed at a
/// time, a broadcast sees exactly the subscribers registered when it was
/// dequeued: a subscriber added later never receives it, and races between
/// publish and (de)registration resolve by queue order.
///
/// Delivery uses unbounded per-subscriber channels and non-blocking sends, so
/// a stalled client buffers in its own channel and cannot delay the loop or
/// any other subscriber. A send to a disconnected subscriber removes it from
/// the registry.
///
/// The bus is constructed explicitly and passed by handle; there is no global
/// instance, so tests can run independent buses side by side.
pub struct Bus {
    sinks: Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    command_tx: flume::Sender<Command>,
    command_rx: Mutex<Option<flume::Receiver<Command>>>,
    listener: Mutex<Option<ListenerState>>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Create a bus with no observer sinks.
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Create a bus with a single observer sink.
    pub fn with_sink<T>(sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        Self::with_sinks(vec![Box::new(sink)])
    }

    /// Create a bus with multiple observer sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        let (command_tx, command_rx) = flume::unbounded();
        Self {
            sinks: Arc::new(Mutex::new(sinks)),
            command_tx,
            command_rx: Mutex::new(Some(command_rx)),
            listener: Mutex::new(None),
        }
    }

    /// Add an observer sink after construction. It sees all bus activity
    /// processed from that point on, including while the loop is running.
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().unwrap().push(Box::new(sink));
    }

    /// Get a clone-able handle for publishing and subscribing.
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            commands: self.command_tx.clone(),
        }
    }

    /// Spawn the coordination task that owns the registry and serializes all
    /// registration, deregistration, and broadcast commands.
    /// Idempotent: calling multiple times has no effect.
    pub fn listen(&self) {
        let mut guard = self.listener.lock().expect("listener poisoned");
        if guard.is_some() {
            return; // Already listening
        }
        let Some(receiver) = self.command_rx.lock().expect("receiver poisoned").take() else {
            return; // Stopped is terminal
        };

        let sinks = self.sinks.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = task::spawn(async move {
            // Sole owner of the registry for the lifetime of the loop.
            let mut registry: FxHashMap<SubscriberId, mpsc::UnboundedSender<Message>> =
                FxHashMap::default();
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    recv = receiver.recv_async() => match recv {
                        // Every sender dropped; nothing left to coordinate.
                        Err(_) => break,
                        Ok(command) => apply(&mut registry, &sinks, command),
                    }
                }
            }
        });

        *guard = Some(ListenerState {
            shutdown_tx,
            handle,
        });
    }

    /// Stop the coordination task. Terminal: afterwards every publish and
    /// subscribe fails with [`BusError::Closed`] and all open subscription
    /// streams end.
    ///
    /// Best-effort by design: commands still queued when the loop stops are
    /// dropped, so messages in flight at shutdown may never be delivered.
    pub async fn shutdown(&self) {
        let state = {
            let mut guard = self.listener.lock().expect("listener poisoned");
            guard.take()
        };
        if let Some(state) = state {
            let _ = state.shutdown_tx.send(());
            let _ = state.handle.await;
        }
    }
}

impl Drop for Bus {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.listener.lock() {
            if let Some(state) = guard.take() {
                let _ = state.shutdown_tx.send(());
                state.handle.abort();
            }
        }
    }
}

struct ListenerState {
    shutdown_tx: oneshot::Sender<()>,
    handle: task::JoinHandle<()>,
}

/// Clone-able front door to the bus: the only way external callers touch the
/// registry.
#[derive(Clone)]
pub struct BusHandle {
    commands: flume::Sender<Command>,
}

impl BusHandle {
    /// Enqueue a message for broadcast to every currently registered
    /// subscriber. Non-blocking; fails only once the bus has shut down.
    pub fn publish(&self, message: impl Into<Message>) -> Result<(), BusError> {
        self.commands
            .send(Command::Publish(message.into()))
            .map_err(|_| BusError::Closed)
    }

    /// Register a new subscriber and return its delivery handle. The handle
    /// is eligible for every message published after this call returns.
    /// Safe to call concurrently from many tasks.
    pub async fn subscribe(&self) -> Result<Subscription, BusError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Subscribe(reply_tx))
            .map_err(|_| BusError::Closed)?;
        let (id, receiver) = reply_rx.await.map_err(|_| BusError::Closed)?;
        Ok(Subscription::new(id, receiver, self.commands.clone()))
    }
}

fn apply(
    registry: &mut FxHashMap<SubscriberId, mpsc::UnboundedSender<Message>>,
    sinks: &Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    command: Command,
) {
    match command {
        Command::Subscribe(reply) => {
            let id = Uuid::new_v4();
            let (tx, rx) = mpsc::unbounded_channel();
            // A caller that vanished before the reply never gets registered.
            if reply.send((id, rx)).is_ok() {
                registry.insert(id, tx);
                notify(sinks, &BusEvent::SubscriberAdded { id });
            }
        }
        Command::Unsubscribe(id) => {
            if registry.remove(&id).is_some() {
                notify(sinks, &BusEvent::SubscriberRemoved { id });
            }
        }
        Command::Publish(message) => {
            let mut disconnected = Vec::new();
            for (id, tx) in registry.iter() {
                if tx.send(message.clone()).is_err() {
                    disconnected.push(*id);
                }
            }
            // The broadcast echo accompanies the broadcast itself; removals
            // discovered during the sweep are mirrored after it. Observers
            // then see the same order whether a handle vanished before or
            // after this publish was dequeued.
            notify(sinks, &BusEvent::Broadcast(message));
            for id in disconnected {
                registry.remove(&id);
                notify(sinks, &BusEvent::SubscriberRemoved { id });
            }
        }
    }
}

fn notify(sinks: &Arc<Mutex<Vec<Box<dyn EventSink>>>>, event: &BusEvent) {
    let mut guard = sinks.lock().unwrap();
    for sink in guard.iter_mut() {
        if let Err(e) = sink.handle(event) {
            tracing::warn!(error = %e, "bus sink error");
        }
    }
}
