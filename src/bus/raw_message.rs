use std::{fmt, sync::Arc};

use tokio::sync::oneshot;

use super::{Delivery, DeliveryOptions, Headers};

/// Message as it travels through the bus, before it is wrapped into a
/// [`BusMessage`](super::BusMessage).
pub struct RawMessage<T> {
    pub(crate) address: Arc<str>,
    pub(crate) reply_address: Option<Arc<str>>,
    pub(crate) headers: Headers,
    pub(crate) body: T,
    pub(crate) delivery: Delivery,
    pub(crate) acker: Option<oneshot::Sender<()>>,
}

impl<T> RawMessage<T> {
    pub(crate) fn new(
        address: Arc<str>,
        body: T,
        options: DeliveryOptions,
        acker: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            address,
            reply_address: options.reply_address,
            headers: options.headers,
            body,
            delivery: Delivery::new(),
            acker,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.reply_address.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Whether the sender waits for an acknowledgement.
    pub fn expects_ack(&self) -> bool {
        self.acker.as_ref().is_some_and(|acker| !acker.is_closed())
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

impl<T: fmt::Debug> fmt::Debug for RawMessage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMessage")
            .field("address", &self.address)
            .field("reply_address", &self.reply_address)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("delivery", &self.delivery)
            .field("expects_ack", &self.expects_ack())
            .finish()
    }
}
