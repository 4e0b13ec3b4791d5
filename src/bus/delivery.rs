use std::{fmt, ops::Deref, sync::Arc, time::SystemTime};

use uuid::Uuid;

use super::Headers;
use crate::MessageId;

/// Address a message was sent to. Attached as metadata to received messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(Arc<str>);

/// Address the sender asked replies to go to. Only attached when set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyAddress(Arc<str>);

macro_rules! address_type {
    ($ty:ident) => {
        impl $ty {
            pub fn new(address: impl Into<Arc<str>>) -> Self {
                Self(address.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $ty {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

address_type!(Address);
address_type!(ReplyAddress);

/// Per-delivery information assigned by the bus when a message is sent.
///
/// - `id`: unique identifier of the delivery.
/// - `timestamp`: send time in nanoseconds since Unix epoch (truncated to `u64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    id: MessageId,
    timestamp: u64,
}

impl Delivery {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4().as_u128(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
        }
    }

    /// Unique identifier for this delivery.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Timestamp in nanoseconds since Unix epoch (u64 truncation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Sender-side options of a single send or request.
///
/// ```rust
/// use courier::bus::DeliveryOptions;
///
/// let options = DeliveryOptions::new()
///     .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
///     .reply_to("orders.replies");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    pub(crate) headers: Headers,
    pub(crate) reply_address: Option<Arc<str>>,
}

impl DeliveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header value.
    pub fn header(mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.headers.add(key, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn reply_to(mut self, address: impl Into<Arc<str>>) -> Self {
        self.reply_address = Some(address.into());
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.reply_address.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliveries_are_unique() {
        let a = Delivery::new();
        let b = Delivery::new();
        assert_ne!(a.id(), b.id());
        assert!(b.timestamp() >= a.timestamp());
    }

    #[test]
    fn test_address_derefs_to_str() {
        let address = Address::new("orders");
        assert_eq!(&*address, "orders");
        assert_eq!(address.to_string(), "orders");
        assert!(address.starts_with("ord"));
    }

    #[test]
    fn test_options_builder() {
        let options = DeliveryOptions::new()
            .header("a", "1")
            .header("a", "2")
            .reply_to("replies");
        assert_eq!(options.headers().get_all("a"), vec!["1", "2"]);
        assert_eq!(options.reply_address(), Some("replies"));
    }
}
