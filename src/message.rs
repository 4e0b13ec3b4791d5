use std::any::Any;

use futures_util::future::BoxFuture;

use crate::{Metadata, Result};

/// Future returned by [`Message::ack`].
pub type AckFuture = BoxFuture<'static, Result<()>>;

/// Contract shared by every message flowing through the system.
///
/// A message carries a payload, a [`Metadata`] instance and an acknowledgement
/// action. Transport adapters (such as [`BusMessage`](crate::bus::BusMessage))
/// implement it on top of their native message type; [`Envelope`](crate::Envelope)
/// is the generic implementation used to build or forward messages.
///
/// Business logic should only rely on this trait, reading transport context
/// from the metadata by kind, so that it does not depend on the transport the
/// message came from.
pub trait Message: Send + Sync {
    type Payload;

    /// The message payload. Never performs I/O.
    fn payload(&self) -> &Self::Payload;

    fn metadata(&self) -> &Metadata;

    /// Acknowledge the message to its origin.
    ///
    /// Never blocks or panics: failures are reported by the returned future.
    /// When no acknowledgement is wired the future resolves to `Ok(())`
    /// immediately.
    fn ack(&self) -> AckFuture;

    /// Metadata value of type `M`, if attached.
    fn metadata_of<M: Any>(&self) -> Option<&M>
    where
        Self: Sized,
    {
        self.metadata().get::<M>()
    }
}
