//! Typed signals in, timeline events out, and the bus that carries them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender, TryIter};

use crate::emotion::EmotionEntry;

/// Inbound signals from the emotion-detection side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Signal {
    EmotionObserved { emotion: String, intensity: f64 },
    TimelineViewRequested,
}

/// Every timeline state change produces an Event.
/// Views poll for events through a [`Subscription`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    EntryAppended {
        entry: EmotionEntry,
        total_entries: usize,
        at: DateTime<Utc>,
    },
    /// Oldest entries dropped by the retention policy.
    EntriesEvicted {
        count: usize,
        at: DateTime<Utc>,
    },
    PatternsUpdated {
        pattern_count: usize,
        at: DateTime<Utc>,
    },
    SyncDispatched {
        entry_count: usize,
        at: DateTime<Utc>,
    },
    SyncSkipped {
        reason: String,
        at: DateTime<Utc>,
    },
    ViewRequested {
        at: DateTime<Utc>,
    },
}

/// Typed publish/subscribe over std channels.
///
/// Subscribers poll their [`Subscription`]; publishing never blocks.
/// Subscriptions that have been dropped are pruned on the next publish.
#[derive(Debug)]
pub struct EventBus<T: Clone> {
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> EventBus<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn publish(&mut self, message: T) {
        self.subscribers
            .retain(|tx| tx.send(message.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of an [`EventBus`].
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Pending messages, without blocking.
    pub fn drain(&self) -> TryIter<'_, T> {
        self.rx.try_iter()
    }

    pub fn try_next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_each_message() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(Signal::TimelineViewRequested);
        assert_eq!(a.drain().count(), 1);
        assert_eq!(b.try_next(), Some(Signal::TimelineViewRequested));
        assert_eq!(b.try_next(), None);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus: EventBus<Signal> = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        bus.publish(Signal::TimelineViewRequested);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.drain().count(), 1);
    }

    #[test]
    fn signals_use_type_tag() {
        let signal: Signal =
            serde_json::from_str(r#"{"type":"EmotionObserved","emotion":"happy","intensity":0.8}"#)
                .unwrap();
        assert_eq!(
            signal,
            Signal::EmotionObserved {
                emotion: "happy".into(),
                intensity: 0.8
            }
        );
    }
}
