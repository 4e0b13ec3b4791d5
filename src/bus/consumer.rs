use std::sync::Arc;

use tokio::{select, sync::mpsc::Receiver};
use tokio_util::sync::CancellationToken;

use super::{BusMessage, RawMessage};

/// Receiving end of an address, created by [`EventBus::consumer`](super::EventBus::consumer).
///
/// Dropping the consumer unregisters it: senders get
/// [`Error::NoConsumer`](crate::Error::NoConsumer) and the address can be
/// registered again.
#[derive(Debug)]
pub struct Consumer<T> {
    address: Arc<str>,
    receiver: Receiver<RawMessage<T>>,
    cancel_token: CancellationToken,
}

impl<T> Consumer<T> {
    pub(crate) fn new(
        address: Arc<str>,
        receiver: Receiver<RawMessage<T>>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            address,
            receiver,
            cancel_token,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the bus is shut down or the consumer is closed and
    /// drained. After shutdown the mailbox is closed and its queued messages
    /// are dropped, so their receipts fail with
    /// [`Error::AckDropped`](crate::Error::AckDropped).
    pub async fn recv(&mut self) -> Option<BusMessage<T>> {
        select! {
            biased;
            _ = self.cancel_token.cancelled() => {
                self.discard_queued();
                None
            }
            raw = self.receiver.recv() => raw.map(BusMessage::from),
        }
    }

    fn discard_queued(&mut self) {
        self.receiver.close();
        let mut dropped = 0usize;
        while self.receiver.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(address = %self.address, dropped, "discarded queued messages on shutdown");
        }
    }

    /// Stop accepting new messages. Messages already queued can still be received.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Number of messages waiting in the mailbox.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}
