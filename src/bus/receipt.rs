use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use crate::{Error, Result};

/// Resolves once the consumer acknowledged a message sent with
/// [`EventBus::request`](super::EventBus::request).
///
/// Fails with [`Error::AckDropped`] if the message is dropped without being
/// acknowledged (consumer dropped it, the bus shut down, or the message was
/// discarded under [`OverflowPolicy::Drop`](crate::OverflowPolicy::Drop)).
///
/// Dropping the receipt is fine: the consumer's `ack()` then reports
/// [`Error::AckFailed`].
#[derive(Debug)]
#[must_use = "a receipt does nothing unless awaited"]
pub struct Receipt {
    receiver: oneshot::Receiver<()>,
}

impl Receipt {
    pub(crate) fn new(receiver: oneshot::Receiver<()>) -> Self {
        Self { receiver }
    }
}

impl Future for Receipt {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|acked| acked.map_err(|_| Error::AckDropped))
    }
}
