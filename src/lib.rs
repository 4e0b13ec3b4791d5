//! Courier - typed message metadata
//!
//! A small toolkit for attaching context to messages without coupling the
//! producers and consumers of that context:
//!
//! - [`Metadata`]: immutable bag holding at most one value per type, with
//!   copy-on-write `with` / `without` updates.
//! - [`Message`]: contract every message implements (payload, metadata, ack),
//!   and [`Envelope`], its generic implementation.
//! - [`bus`]: an in-process event bus, used as the reference transport
//!   adapter for the [`Message`] contract.
//!
//! ```rust
//! use courier::{Envelope, Message, metadata};
//!
//! #[derive(Debug, PartialEq)]
//! struct Tenant(&'static str);
//!
//! #[derive(Debug, PartialEq)]
//! struct TraceId(u128);
//!
//! let envelope = Envelope::new("order-created")
//!     .with_metadata(metadata![Tenant("acme")]?)
//!     .add_metadata(TraceId(42));
//!
//! assert_eq!(envelope.metadata_of::<Tenant>(), Some(&Tenant("acme")));
//! assert_eq!(envelope.metadata().len(), 2);
//! # Ok::<(), courier::Error>(())
//! ```
//!
//! See `demos/trace_context.rs` for a complete flow over the bus.

mod config;
mod entry;
mod envelope;
mod error;
mod kind;
mod message;
mod metadata;
mod overflow_policy;

pub mod bus;

pub use config::Config;
pub use entry::Entry;
pub use envelope::{Acker, Envelope};
pub use error::Error;
pub use kind::Kind;
pub use message::{AckFuture, Message};
pub use metadata::Metadata;
pub use overflow_policy::OverflowPolicy;

pub type Result<T = ()> = std::result::Result<T, Error>;
pub type MessageId = u128;
