//! In-process, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! | Topic | Traffic |
//! |---|---|
//! | [`Topic::Signals`] | Inbound vehicle signals (position, heartbeat, medium, …) |
//! | [`Topic::PlanCommands`] | Outbound execute-plan requests |
//! | [`Topic::Status`] | Supervisor idle/active reports |

use tidewatch_types::{Event, SafetyError};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes of the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Inbound signals consumed by the supervisor.
    Signals,
    /// Execute-plan requests produced by the supervisor.
    PlanCommands,
    /// Supervisor status reports.
    Status,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    signals: broadcast::Sender<Event>,
    plan_commands: broadcast::Sender<Event>,
    status: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (signals, _) = broadcast::channel(capacity);
        let (plan_commands, _) = broadcast::channel(capacity);
        let (status, _) = broadcast::channel(capacity);
        Self {
            signals,
            plan_commands,
            status,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`SafetyError::Channel`] when nobody is subscribed to the topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, SafetyError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| SafetyError::Channel(format!("No subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Signals => &self.signals,
            Topic::PlanCommands => &self.plan_commands,
            Topic::Status => &self.status,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The caller decides whether to
    ///   continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`recv`][Self::recv].
    pub fn try_recv(&mut self) -> Result<Event, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_types::{EventPayload, Medium, Signal};

    fn make_event(source: &str) -> Event {
        Event::new(
            source,
            EventPayload::Signal(Signal::Medium {
                medium: Medium::WaterSurface,
            }),
        )
    }

    #[test]
    fn publish_without_subscribers_returns_error() {
        let bus = EventBus::default();
        let result = bus.publish_to(Topic::PlanCommands, make_event("test"));
        assert!(matches!(result, Err(SafetyError::Channel(_))));
    }

    #[tokio::test]
    async fn topic_multiple_subscribers_receive_same_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut subscriber1 = bus.subscribe_to(Topic::Signals);
        let mut subscriber2 = bus.subscribe_to(Topic::Signals);
        assert_eq!(bus.subscriber_count(Topic::Signals), 2);

        let event = make_event("tidewatch-cli::stdin");
        assert_eq!(bus.publish_to(Topic::Signals, event.clone())?, 2);

        assert_eq!(subscriber1.recv().await?.id, event.id);
        assert_eq!(subscriber2.recv().await?.id, event.id);
        Ok(())
    }

    /// A subscriber on `Status` must not receive events published to
    /// `Signals` because they are routed through separate channels.
    #[tokio::test]
    async fn topic_subscriber_does_not_receive_other_topic_events() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut status_sub = bus.subscribe_to(Topic::Status);
        let _signals_sub = bus.subscribe_to(Topic::Signals);

        bus.publish_to(Topic::Signals, make_event("nav"))?;

        let result =
            tokio::time::timeout(std::time::Duration::from_millis(50), status_sub.recv()).await;
        assert!(result.is_err(), "Status subscriber must not receive a Signals event");
        assert_eq!(status_sub.topic(), Topic::Status);
        Ok(())
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::Signals);
        let first = make_event("a");
        let second = make_event("b");
        bus.publish_to(Topic::Signals, first.clone()).unwrap();
        bus.publish_to(Topic::Signals, second.clone()).unwrap();

        assert_eq!(rx.try_recv().unwrap().id, first.id);
        assert_eq!(rx.try_recv().unwrap().id, second.id);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    /// Flooding a low-capacity channel while a subscriber sleeps must produce
    /// a `Lagged` error rather than panicking or blocking.
    #[tokio::test]
    async fn topic_channel_lag_on_slow_subscriber() {
        let bus = EventBus::new(16);
        let mut slow_sub = bus.subscribe_to(Topic::Signals);

        for _ in 0..1_000 {
            let _ = bus.publish_to(Topic::Signals, make_event("flood"));
        }

        let result = slow_sub.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
    }
}
