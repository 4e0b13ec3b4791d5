use crate::OverflowPolicy;

/// Configuration of an [`EventBus`](crate::bus::EventBus).
///
/// Use the builder methods to customize, or [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use courier::{Config, OverflowPolicy};
///
/// let config = Config::default()
///     .with_channel_size(256)                        // Deeper consumer mailboxes
///     .with_overflow_policy(OverflowPolicy::Drop);   // Shed load instead of waiting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Size of each consumer's mailbox.
    /// Determines how many messages can be queued before the overflow policy applies.
    /// Default: 128
    pub channel_size: usize,

    /// What a sender does when a consumer's mailbox is full.
    /// Default: [`OverflowPolicy::Block`]
    pub overflow_policy: OverflowPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channel_size: 128,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl Config {
    /// Set the mailbox size of consumers registered from now on.
    ///
    /// A size of zero is rejected when a consumer is registered, with
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument).
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Set the policy applied when a consumer's mailbox is full.
    ///
    /// Trade-offs:
    /// - `Block`: no message is lost, a slow consumer slows its senders down
    /// - `Fail`: senders learn about the overload and decide themselves
    /// - `Drop`: senders never wait, messages are lost under load
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }
}
