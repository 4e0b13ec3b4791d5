//! In-process, address based event bus.
//!
//! The bus is a reference transport for the [`Message`](crate::Message)
//! contract. Senders address messages to a string address; the single
//! [`Consumer`] registered for that address receives them as [`BusMessage`]s
//! carrying the transport context as [`Metadata`](crate::Metadata).
//!
//! - [`EventBus::send`] / [`EventBus::send_with`]: fire and forget.
//! - [`EventBus::request`]: returns a [`Receipt`] resolved by the consumer's `ack()`.
//!
//! # Example
//!
//! ```rust
//! use courier::{Message, bus::{Address, DeliveryOptions, EventBus}};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> courier::Result<()> {
//! let bus = EventBus::<String>::default();
//! let mut orders = bus.consumer("orders")?;
//!
//! let receipt = bus
//!     .request("orders", "order-1".into(), DeliveryOptions::new().header("tenant", "acme"))
//!     .await?;
//!
//! let message = orders.recv().await.unwrap();
//! assert_eq!(message.payload(), "order-1");
//! assert_eq!(message.metadata_of::<Address>().map(|a| a.as_str()), Some("orders"));
//! assert_eq!(message.header("Tenant"), Some("acme"));
//!
//! message.ack().await?;
//! receipt.await?;
//! # Ok(())
//! # }
//! ```

mod bus_message;
mod consumer;
mod delivery;
mod headers;
mod raw_message;
mod receipt;

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tokio::{
    select,
    sync::{
        mpsc::{Sender, channel, error::TrySendError},
        oneshot,
    },
};
use tokio_util::sync::CancellationToken;

use crate::{Config, Error, OverflowPolicy, Result};

pub use bus_message::BusMessage;
pub use consumer::Consumer;
pub use delivery::{Address, Delivery, DeliveryOptions, ReplyAddress};
pub use headers::Headers;
pub use raw_message::RawMessage;
pub use receipt::Receipt;

/// Routes messages of type `T` from senders to the consumer of their address.
///
/// The bus is cheap to clone; clones share the consumer registry.
pub struct EventBus<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: Config,
    consumers: RwLock<HashMap<Arc<str>, Sender<RawMessage<T>>>>,
    cancel_token: CancellationToken,
}

impl<T: Send + 'static> EventBus<T> {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                consumers: RwLock::new(HashMap::new()),
                cancel_token: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Register the consumer of `address`.
    ///
    /// Fails with [`Error::ConsumerAlreadyExists`] while another consumer of
    /// the address is alive, and with [`Error::InvalidArgument`] when the
    /// configured channel size is zero.
    pub fn consumer(&self, address: &str) -> Result<Consumer<T>> {
        let config = &self.inner.config;
        if config.channel_size == 0 {
            return Err(Error::InvalidArgument(
                "channel size must be greater than zero".into(),
            ));
        }

        let mut consumers = self
            .inner
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // shutdown clears the registry under this lock
        if self.is_closed() {
            return Err(Error::BusClosed);
        }

        if consumers
            .get(address)
            .is_some_and(|mailbox| !mailbox.is_closed())
        {
            return Err(Error::ConsumerAlreadyExists(address.into()));
        }

        let address: Arc<str> = Arc::from(address);
        let (tx, rx) = channel(config.channel_size);
        consumers.insert(address.clone(), tx);
        tracing::debug!(
            %address,
            capacity = config.channel_size,
            policy = %config.overflow_policy,
            "consumer registered"
        );

        Ok(Consumer::new(address, rx, self.inner.cancel_token.clone()))
    }

    /// Whether a live consumer is registered for `address`.
    pub fn has_consumer(&self, address: &str) -> bool {
        self.mailbox(address).is_ok()
    }

    /// Send a message without headers and without waiting for an acknowledgement.
    pub async fn send(&self, address: &str, body: T) -> Result<()> {
        self.send_with(address, body, DeliveryOptions::default())
            .await
    }

    /// Send a message without waiting for an acknowledgement.
    pub async fn send_with(&self, address: &str, body: T, options: DeliveryOptions) -> Result<()> {
        self.dispatch(RawMessage::new(address.into(), body, options, None))
            .await
    }

    /// Send a message whose consumer is expected to acknowledge it.
    ///
    /// Returns once the message is queued. Await the returned [`Receipt`] to
    /// wait for the acknowledgement.
    pub async fn request(
        &self,
        address: &str,
        body: T,
        options: DeliveryOptions,
    ) -> Result<Receipt> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(RawMessage::new(address.into(), body, options, Some(tx)))
            .await?;
        Ok(Receipt::new(rx))
    }

    /// Close the bus.
    ///
    /// Consumers stop receiving and further sends fail with
    /// [`Error::BusClosed`]. Queued messages are dropped by the consumer's next
    /// [`Consumer::recv`] (or when it is dropped), failing their receipts
    /// with [`Error::AckDropped`].
    pub fn shutdown(&self) {
        self.inner.cancel_token.cancel();
        self.inner
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("event bus shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel_token.is_cancelled()
    }

    async fn dispatch(&self, message: RawMessage<T>) -> Result<()> {
        if self.is_closed() {
            return Err(Error::BusClosed);
        }

        let mailbox = self.mailbox(&message.address)?;
        tracing::trace!(
            address = %message.address,
            id = %message.delivery.id(),
            "routing message"
        );

        match self.inner.config.overflow_policy {
            OverflowPolicy::Block => {
                select! {
                    _ = self.inner.cancel_token.cancelled() => Err(Error::BusClosed),
                    sent = mailbox.send(message) => sent.map_err(Error::from),
                }
            }
            OverflowPolicy::Fail => mailbox.try_send(message).map_err(Error::from),
            OverflowPolicy::Drop => match mailbox.try_send(message) {
                Err(TrySendError::Full(dropped)) => {
                    tracing::warn!(
                        address = %dropped.address,
                        id = %dropped.delivery.id(),
                        "consumer mailbox is full, message dropped"
                    );
                    Ok(())
                }
                other => other.map_err(Error::from),
            },
        }
    }

    fn mailbox(&self, address: &str) -> Result<Sender<RawMessage<T>>> {
        self.inner
            .consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .filter(|mailbox| !mailbox.is_closed())
            .cloned()
            .ok_or_else(|| Error::NoConsumer(address.into()))
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[tokio::test]
    async fn test_consumer_already_exists() {
        let bus = EventBus::<u32>::default();
        let _consumer = bus.consumer("a").unwrap();
        assert!(matches!(
            bus.consumer("a"),
            Err(Error::ConsumerAlreadyExists(address)) if &*address == "a"
        ));
    }

    #[tokio::test]
    async fn test_zero_channel_size_is_rejected() {
        let bus = EventBus::<u32>::new(Config::default().with_channel_size(0));
        let err = bus.consumer("a").unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!bus.has_consumer("a"));
    }

    #[tokio::test]
    async fn test_consumer_after_shutdown_is_rejected() {
        let bus = EventBus::<u32>::default();
        bus.shutdown();
        assert!(matches!(bus.consumer("a"), Err(Error::BusClosed)));
        assert!(!bus.has_consumer("a"));
    }

    #[tokio::test]
    async fn test_dropped_consumer_can_be_replaced() {
        let bus = EventBus::<u32>::default();
        drop(bus.consumer("a").unwrap());

        assert!(!bus.has_consumer("a"));
        assert!(matches!(bus.send("a", 1).await, Err(Error::NoConsumer(_))));

        let mut consumer = bus.consumer("a").unwrap();
        bus.send("a", 2).await.unwrap();
        assert_eq!(*consumer.recv().await.unwrap().payload(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let bus = EventBus::<u32>::default();
        let other = bus.clone();
        let mut consumer = bus.consumer("a").unwrap();

        other.send("a", 7).await.unwrap();
        assert_eq!(consumer.pending(), 1);
        assert_eq!(*consumer.recv().await.unwrap().payload(), 7);
    }

    #[tokio::test]
    async fn test_fail_policy_reports_full_mailbox() {
        let config = Config::default()
            .with_channel_size(1)
            .with_overflow_policy(OverflowPolicy::Fail);
        let bus = EventBus::<u32>::new(config);
        assert_eq!(bus.config().overflow_policy, OverflowPolicy::Fail);

        let _consumer = bus.consumer("a").unwrap();
        bus.send("a", 1).await.unwrap();
        assert!(matches!(bus.send("a", 2).await, Err(Error::ChannelIsFull)));
    }

    #[tokio::test]
    async fn test_shutdown_unblocks_waiting_sender() {
        let bus = EventBus::<u32>::new(Config::default().with_channel_size(1));
        assert_eq!(bus.config().overflow_policy, OverflowPolicy::Block);

        let _consumer = bus.consumer("a").unwrap();
        bus.send("a", 1).await.unwrap();

        let sender = bus.clone();
        let blocked = tokio::spawn(async move { sender.send("a", 2).await });
        tokio::task::yield_now().await;

        bus.shutdown();
        assert!(matches!(blocked.await.unwrap(), Err(Error::BusClosed)));
    }
}
