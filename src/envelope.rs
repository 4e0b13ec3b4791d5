use std::{any::Any, fmt, future::Future, sync::Arc};

use futures_util::{FutureExt, future};

use crate::{AckFuture, Message, Metadata, Result};

/// Acknowledgement action attached to an [`Envelope`].
pub type Acker = Arc<dyn Fn() -> AckFuture + Send + Sync>;

/// Generic message: payload plus metadata plus an optional acknowledgement.
///
/// Envelopes are built once and not modified afterwards. The builder methods
/// consume the envelope and return a new one; the metadata is updated with
/// [`Metadata::with`], so the original [`Metadata`] instance is left as is
/// for anyone else holding it.
///
/// # Examples
///
/// ```rust
/// use courier::{Envelope, Message};
///
/// #[derive(Debug, PartialEq)]
/// struct TraceId(u64);
///
/// let envelope = Envelope::new("order-created").add_metadata(TraceId(7));
/// assert_eq!(envelope.metadata_of::<TraceId>(), Some(&TraceId(7)));
/// ```
///
/// Forwarding a received message with a new payload keeps its metadata and
/// acknowledges the original message when the new one is acknowledged:
///
/// ```rust,ignore
/// let received = consumer.recv().await.unwrap();
/// let forwarded = Envelope::forward(received).with_payload(summary);
/// ```
#[derive(Clone)]
pub struct Envelope<T> {
    payload: T,
    metadata: Metadata,
    ack: Option<Acker>,
}

impl<T> Envelope<T> {
    /// Envelope with empty metadata and no acknowledgement.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            metadata: Metadata::empty(),
            ack: None,
        }
    }

    /// Wrap another message, keeping its payload and metadata. Acknowledging
    /// the envelope acknowledges `message`.
    pub fn forward<M>(message: M) -> Self
    where
        M: Message<Payload = T> + 'static,
        T: Clone,
    {
        let payload = message.payload().clone();
        let metadata = message.metadata().clone();
        let origin = Arc::new(message);
        let ack: Acker = Arc::new(move || origin.ack());
        Self {
            payload,
            metadata,
            ack: Some(ack),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a metadata value, replacing the value of the same kind.
    pub fn add_metadata<M: Any + Send + Sync>(mut self, value: M) -> Self {
        self.metadata = self.metadata.with(value);
        self
    }

    /// Set the acknowledgement action. It is called on every [`Message::ack`].
    pub fn with_ack<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let ack: Acker = Arc::new(move || f().boxed());
        self.ack = Some(ack);
        self
    }

    /// Replace the payload, keeping metadata and acknowledgement.
    pub fn with_payload<P>(self, payload: P) -> Envelope<P> {
        Envelope {
            payload,
            metadata: self.metadata,
            ack: self.ack,
        }
    }

    pub fn has_ack(&self) -> bool {
        self.ack.is_some()
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn into_parts(self) -> (T, Metadata) {
        (self.payload, self.metadata)
    }
}

impl<T: Send + Sync> Message for Envelope<T> {
    type Payload = T;

    fn payload(&self) -> &T {
        &self.payload
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn ack(&self) -> AckFuture {
        match &self.ack {
            Some(ack) => ack(),
            None => future::ready(Ok(())).boxed(),
        }
    }
}

impl<T> From<T> for Envelope<T> {
    fn from(payload: T) -> Self {
        Envelope::new(payload)
    }
}

impl<T: fmt::Debug> fmt::Debug for Envelope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("payload", &self.payload)
            .field("metadata", &self.metadata)
            .field("ack", &self.ack.is_some())
            .finish()
    }
}
