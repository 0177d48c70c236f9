//! Cross-view intent handoff
//!
//! One view publishes an intent on a topic; the next view mounted for that
//! topic consumes it exactly once. The channel lives in the workspace, so
//! it survives view replacement but not a restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

/// Topic carrying a chat query requested from another view
pub const PENDING_CHAT_QUERY: &str = "pending-chat-query";

/// Single-slot channel for one topic
///
/// Publishing overwrites any value not yet consumed.
#[derive(Debug)]
pub struct IntentChannel {
    topic: &'static str,
    slot: Mutex<Option<String>>,
}

impl IntentChannel {
    pub fn new(topic: &'static str) -> Self {
        Self {
            topic,
            slot: Mutex::new(None),
        }
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    pub fn publish(&self, value: impl Into<String>) {
        let value = value.into();
        debug!("Publishing intent on {}: {}", self.topic, value);
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(value);
        if let Some(previous) = previous {
            debug!("Dropped unconsumed intent on {}: {}", self.topic, previous);
        }
    }

    /// Remove and return the pending value
    pub fn take(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Consumer side, created once per view mount
///
/// Consumes at most one value per mount even if invoked repeatedly.
#[derive(Debug)]
pub struct IntentConsumer {
    channel: Arc<IntentChannel>,
    consumed: AtomicBool,
}

impl IntentConsumer {
    pub fn new(channel: Arc<IntentChannel>) -> Self {
        Self {
            channel,
            consumed: AtomicBool::new(false),
        }
    }

    /// Take the pending value, if any, the first time this is called
    /// after mount.
    ///
    /// The value is removed from the channel before it is returned.
    pub fn consume(&self) -> Option<String> {
        if self.consumed.load(Ordering::Acquire) {
            return None;
        }
        let value = self.channel.take()?;
        if self.consumed.swap(true, Ordering::AcqRel) {
            return None;
        }
        debug!("Consumed intent on {}", self.channel.topic());
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_overwrites() {
        let channel = IntentChannel::new(PENDING_CHAT_QUERY);
        channel.publish("first");
        channel.publish("second");
        assert_eq!(channel.take().as_deref(), Some("second"));
        assert_eq!(channel.take(), None);
    }

    #[test]
    fn test_consumed_once_per_mount() {
        let channel = Arc::new(IntentChannel::new(PENDING_CHAT_QUERY));
        channel.publish("Draft a reply to this email");

        let consumer = IntentConsumer::new(channel.clone());
        assert_eq!(consumer.consume().as_deref(), Some("Draft a reply to this email"));
        assert!(!channel.is_pending());

        // Re-entrant invocation within the same mount does nothing, even
        // when a new value arrived meanwhile
        channel.publish("Summarize this email");
        assert_eq!(consumer.consume(), None);
        assert!(channel.is_pending());
    }

    #[test]
    fn test_at_most_once_across_mounts() {
        let channel = Arc::new(IntentChannel::new(PENDING_CHAT_QUERY));
        channel.publish("Draft a reply to this email");

        let first = IntentConsumer::new(channel.clone());
        let second = IntentConsumer::new(channel.clone());
        let taken: Vec<_> = [first.consume(), second.consume()].into_iter().flatten().collect();

        assert_eq!(taken, vec!["Draft a reply to this email".to_string()]);
    }

    #[test]
    fn test_nothing_pending() {
        let consumer = IntentConsumer::new(Arc::new(IntentChannel::new(PENDING_CHAT_QUERY)));
        assert_eq!(consumer.consume(), None);
        // an empty mount does not burn the flag
        assert!(!consumer.consumed.load(Ordering::Acquire));
    }
}
