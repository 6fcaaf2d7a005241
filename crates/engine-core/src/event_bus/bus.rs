use model::events::Event;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

type Senders = HashMap<u64, Box<dyn Any + Send + Sync>>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    event_type_id: TypeId,
    subscriber_id: u64,
}

/// Typed fan-out of events to bounded per-subscriber channels.
///
/// Publishing never waits on subscribers: a full channel drops the event for
/// that subscriber only.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<TypeId, Senders>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe<E>(&self, capacity: usize) -> (Subscription, mpsc::Receiver<Arc<E>>)
    where
        E: Event,
    {
        let (tx, rx) = mpsc::channel::<Arc<E>>(capacity.max(1));
        let event_type_id = TypeId::of::<E>();
        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers
            .write()
            .await
            .entry(event_type_id)
            .or_default()
            .insert(subscriber_id, Box::new(tx));

        debug!(
            event_type = std::any::type_name::<E>(),
            subscriber_id, "Subscribed to event"
        );

        (
            Subscription {
                event_type_id,
                subscriber_id,
            },
            rx,
        )
    }

    /// Returns the number of subscribers the event was delivered to.
    pub async fn publish<E>(&self, event: E) -> usize
    where
        E: Event,
    {
        let event = Arc::new(event);
        let subscribers = self.subscribers.read().await;
        let Some(senders) = subscribers.get(&TypeId::of::<E>()) else {
            debug!(
                event_type = event.event_type(),
                "No subscribers for event"
            );
            return 0;
        };

        let mut delivered = 0;
        for (subscriber_id, sender) in senders {
            let Some(sender) = sender.downcast_ref::<mpsc::Sender<Arc<E>>>() else {
                warn!(subscriber_id, "Subscriber registered with mismatched sender type");
                continue;
            };

            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    event_type = event.event_type(),
                    subscriber_id,
                    error = %e,
                    "Dropped event for subscriber"
                ),
            }
        }
        delivered
    }

    pub async fn unsubscribe(&self, subscription: Subscription) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(senders) = subscribers.get_mut(&subscription.event_type_id) {
            senders.remove(&subscription.subscriber_id);
            if senders.is_empty() {
                subscribers.remove(&subscription.event_type_id);
            }
        }
    }

    pub async fn subscriber_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.subscribers
            .read()
            .await
            .get(&TypeId::of::<E>())
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping(u32);

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let (_a, mut rx_a) = bus.subscribe::<Ping>(4).await;
        let (_b, mut rx_b) = bus.subscribe::<Ping>(4).await;

        assert_eq!(bus.publish(Ping(7)).await, 2);
        assert_eq!(rx_a.recv().await.unwrap().0, 7);
        assert_eq!(rx_b.recv().await.unwrap().0, 7);
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let bus = EventBus::new();
        let (_sub, mut rx) = bus.subscribe::<Ping>(1).await;

        assert_eq!(bus.publish(Ping(1)).await, 1);
        assert_eq!(bus.publish(Ping(2)).await, 0);
        assert_eq!(rx.recv().await.unwrap().0, 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_subscriber() {
        let bus = EventBus::new();
        let (sub, _rx) = bus.subscribe::<Ping>(1).await;
        assert_eq!(bus.subscriber_count::<Ping>().await, 1);

        bus.unsubscribe(sub).await;
        assert_eq!(bus.subscriber_count::<Ping>().await, 0);
        assert_eq!(bus.publish(Ping(3)).await, 0);
    }
}
