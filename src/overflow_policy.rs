use std::fmt;

/// Behaviour of a send when the target consumer's mailbox is full.
///
/// The policy is bus wide and only applies to a full mailbox; sends to a
/// missing or closed consumer fail with
/// [`Error::NoConsumer`](crate::Error::NoConsumer) under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverflowPolicy {
    /// Return [`Error::ChannelIsFull`](crate::Error::ChannelIsFull).
    Fail,
    /// Discard the message with a `warn!` and report success. A receipt of
    /// a discarded request fails with [`Error::AckDropped`](crate::Error::AckDropped).
    Drop,
    /// Wait until the mailbox has room or the bus shuts down.
    #[default]
    Block,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverflowPolicy::Fail => "fail",
            OverflowPolicy::Drop => "drop",
            OverflowPolicy::Block => "block",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_waits_for_room() {
        assert_eq!(OverflowPolicy::default(), OverflowPolicy::Block);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(OverflowPolicy::Fail.to_string(), "fail");
        assert_eq!(OverflowPolicy::Drop.to_string(), "drop");
        assert_eq!(OverflowPolicy::Block.to_string(), "block");
    }
}
