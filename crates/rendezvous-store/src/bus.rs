//! Topic-keyed notification fan-out.
//!
//! The [`NotificationBus`] keeps one [`tokio::sync::broadcast`] channel per
//! [`Topic`]. Publishing never blocks: the payload is handed to the channel
//! and every live receiver gets its own copy (multicast, not competing
//! consumers). Each [`Subscription`] applies its own `user_id` filter as it
//! receives, so one subscriber's filter never affects another's deliveries.
//!
//! A subscriber sees only payloads published after it subscribed. If it
//! falls more than the channel capacity behind, the oldest undelivered
//! payloads are skipped for that subscriber alone and a warning is logged.
//! Dropping a [`Subscription`] unregisters it.

use std::sync::Arc;

use futures::Stream;
use rendezvous_types::{Notification, Topic, UserId};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

/// Default per-topic channel capacity.
///
/// A subscriber that falls behind by more than this many payloads on a
/// topic skips ahead to the newest.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// One broadcast sender per topic.
#[derive(Debug)]
struct Channels {
    user_created: broadcast::Sender<Notification>,
    event_created: broadcast::Sender<Notification>,
    participant_added: broadcast::Sender<Notification>,
}

impl Channels {
    const fn sender(&self, topic: Topic) -> &broadcast::Sender<Notification> {
        match topic {
            Topic::UserCreated => &self.user_created,
            Topic::EventCreated => &self.event_created,
            Topic::ParticipantAdded => &self.participant_added,
        }
    }
}

/// Publish/subscribe hub for creation notifications.
///
/// Cheap to clone; clones share the same channels.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    channels: Arc<Channels>,
}

impl NotificationBus {
    /// Create a bus whose per-topic channels hold up to `capacity` payloads.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (user_created, _) = broadcast::channel(capacity);
        let (event_created, _) = broadcast::channel(capacity);
        let (participant_added, _) = broadcast::channel(capacity);
        Self {
            channels: Arc::new(Channels {
                user_created,
                event_created,
                participant_added,
            }),
        }
    }

    /// Publish a notification on its topic.
    ///
    /// Fire-and-forget: returns the number of subscribers the payload was
    /// queued for (before filtering), which is 0 when nobody is listening.
    pub fn publish(&self, notification: Notification) -> usize {
        let topic = notification.topic();
        // send returns Err only when there are zero receivers.
        let receivers = self
            .channels
            .sender(topic)
            .send(notification)
            .unwrap_or(0);
        debug!(%topic, receivers, "notification published");
        receivers
    }

    /// Register for every payload published on `topic` from now on.
    ///
    /// With `filter` set, only payloads whose subject user equals it are
    /// delivered; see [`Notification::matches`].
    pub fn subscribe(&self, topic: Topic, filter: Option<UserId>) -> Subscription {
        let receiver = self.channels.sender(topic).subscribe();
        debug!(%topic, filter = ?filter, "subscriber registered");
        Subscription {
            topic,
            filter,
            receiver,
            skipped: 0,
        }
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels.sender(topic).receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// A live registration on one topic with an optional filter.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    filter: Option<UserId>,
    receiver: broadcast::Receiver<Notification>,
    skipped: u64,
}

impl Subscription {
    /// The topic this subscription listens on.
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// The `user_id` filter, if any.
    pub const fn filter(&self) -> Option<&UserId> {
        self.filter.as_ref()
    }

    /// Total payloads lost because this subscriber lagged.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Wait for the next payload that passes this subscription's filter.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn next(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => {
                    if notification.matches(self.filter.as_ref()) {
                        return Some(notification);
                    }
                }
                Err(RecvError::Lagged(count)) => self.record_lag(count),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Return the next already-queued payload that passes the filter
    /// without waiting.
    pub fn try_next(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => {
                    if notification.matches(self.filter.as_ref()) {
                        return Some(notification);
                    }
                }
                Err(TryRecvError::Lagged(count)) => self.record_lag(count),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turn this subscription into a stream of matching payloads.
    pub fn into_stream(self) -> impl Stream<Item = Notification> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|notification| (notification, subscription))
        })
    }

    fn record_lag(&mut self, count: u64) {
        self.skipped = self.skipped.saturating_add(count);
        warn!(topic = %self.topic, skipped = count, "subscriber lagged, skipping ahead");
    }
}
