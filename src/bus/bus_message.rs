use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use futures_util::{FutureExt, future};
use tokio::sync::oneshot;

use super::{Address, Delivery, Headers, RawMessage, ReplyAddress};
use crate::{AckFuture, Error, Message, Metadata};

/// A message received from the bus, exposed through the [`Message`] contract.
///
/// The transport context is attached as metadata, so code that only knows
/// about [`Message`] can still read it:
///
/// - [`Address`]: the address the message was sent to
/// - [`ReplyAddress`]: only present when the sender set one
/// - [`Headers`]: the sender's headers
/// - [`Delivery`]: id and timestamp assigned by the bus
///
/// `ack()` resolves the sender's [`Receipt`](super::Receipt). Only the first
/// call does so; later calls, and calls on messages sent without a receipt,
/// resolve to `Ok(())` immediately.
pub struct BusMessage<T> {
    raw: RawMessage<T>,
    acker: Mutex<Option<oneshot::Sender<()>>>,
    metadata: Metadata,
}

impl<T> BusMessage<T> {
    pub fn address(&self) -> &str {
        self.raw.address()
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.raw.reply_address()
    }

    /// First value of the header `key`.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.raw.headers.get(key)
    }

    /// All values of the header `key`.
    pub fn headers(&self, key: &str) -> Vec<&str> {
        self.raw.headers.get_all(key)
    }

    pub fn all_headers(&self) -> &Headers {
        &self.raw.headers
    }

    pub fn delivery(&self) -> &Delivery {
        &self.raw.delivery
    }

    /// Give back the underlying bus message.
    ///
    /// If the message was not acknowledged yet, the acknowledgement travels
    /// with the returned value and is sent when it is wrapped and acked again.
    pub fn into_inner(self) -> RawMessage<T> {
        let BusMessage { mut raw, acker, .. } = self;
        raw.acker = acker.into_inner().unwrap_or_else(PoisonError::into_inner);
        raw
    }
}

impl<T> From<RawMessage<T>> for BusMessage<T> {
    fn from(mut raw: RawMessage<T>) -> Self {
        let mut metadata = Metadata::empty().with(Address::new(raw.address.clone()));
        if let Some(reply_address) = &raw.reply_address {
            metadata = metadata.with(ReplyAddress::new(reply_address.clone()));
        }
        let metadata = metadata
            .with(raw.headers.clone())
            .with(raw.delivery);

        let acker = Mutex::new(raw.acker.take());
        Self {
            raw,
            acker,
            metadata,
        }
    }
}

impl<T: Send + Sync> Message for BusMessage<T> {
    type Payload = T;

    fn payload(&self) -> &T {
        &self.raw.body
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn ack(&self) -> AckFuture {
        let acker = self
            .acker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let result = match acker {
            None => Ok(()),
            Some(acker) => acker.send(()).map_err(|_| {
                tracing::warn!(
                    address = %self.raw.address,
                    id = %self.raw.delivery.id(),
                    "acknowledgement not delivered, receipt was dropped"
                );
                Error::AckFailed(format!("receipt for '{}' was dropped", self.raw.address).into())
            }),
        };
        future::ready(result).boxed()
    }
}

impl<T: fmt::Debug> fmt::Debug for BusMessage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusMessage")
            .field("raw", &self.raw)
            .field("metadata", &self.metadata)
            .finish()
    }
}
