use std::{borrow::Cow, sync::Arc};

use tokio::sync::mpsc::error::{SendError, TrySendError};

use crate::bus::RawMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    #[error("Acknowledgement failed: {0}")]
    AckFailed(Arc<str>),

    #[error("Message was dropped before it was acknowledged.")]
    AckDropped,

    #[error("No consumer is registered at address '{0}'.")]
    NoConsumer(Arc<str>),

    #[error("Consumer at address '{0}' already exists.")]
    ConsumerAlreadyExists(Arc<str>),

    #[error("The message channel has reached its capacity.")]
    ChannelIsFull,

    #[error("Event bus has been shut down.")]
    BusClosed,
}

impl Error {
    /// Whether the error was caused by an argument rejected synchronously,
    /// such as two metadata values of the same kind.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

impl<T> From<SendError<RawMessage<T>>> for Error {
    fn from(e: SendError<RawMessage<T>>) -> Self {
        Error::NoConsumer(e.0.address.clone())
    }
}

impl<T> From<TrySendError<RawMessage<T>>> for Error {
    fn from(e: TrySendError<RawMessage<T>>) -> Self {
        match e {
            TrySendError::Full(_) => Error::ChannelIsFull,
            TrySendError::Closed(message) => Error::NoConsumer(message.address.clone()),
        }
    }
}
