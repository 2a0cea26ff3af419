use std::time::Duration;

use futures_util::stream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

use super::core::Command;
use super::message::Message;

/// Identifier for one registered subscriber. Fresh per registration, so a
/// handle can never collide with (or double-register as) another.
pub type SubscriberId = Uuid;

/// A per-connection delivery handle returned by [`BusHandle::subscribe`].
///
/// Messages arrive in publish order on an unbounded private channel, so a
/// slow consumer buffers here instead of stalling the coordination loop or
/// other subscribers. Dropping the handle deregisters it; deregistration is
/// idempotent, so an explicit [`unsubscribe`](Subscription::unsubscribe)
/// followed by the drop is harmless.
///
/// [`BusHandle::subscribe`]: super::core::BusHandle::subscribe
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<Message>,
    commands: flume::Sender<Command>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        receiver: mpsc::UnboundedReceiver<Message>,
        commands: flume::Sender<Command>,
    ) -> Self {
        Self {
            id,
            receiver,
            commands,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next broadcast, awaiting if necessary.
    ///
    /// Returns `None` once this handle has been deregistered or the bus has
    /// shut down.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Receive a pending broadcast without awaiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `duration` for the next broadcast.
    pub async fn next_timeout(&mut self, duration: Duration) -> Option<Message> {
        timeout(duration, self.recv()).await.ok().flatten()
    }

    /// Deregister this handle now instead of waiting for drop.
    pub fn unsubscribe(self) {}

    /// Convert into an async stream of messages. The stream ends when the
    /// subscriber is deregistered or the bus shuts down; dropping the stream
    /// deregisters the subscriber.
    pub fn into_stream(self) -> impl futures_util::Stream<Item = Message> {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .recv()
                .await
                .map(|message| (message, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Safe no-op if the loop already removed us or has stopped.
        let _ = self.commands.send(Command::Unsubscribe(self.id));
    }
}
