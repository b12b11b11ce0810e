//! In-process publish/subscribe for "contact added" notifications.
//!
//! Backed by a `tokio::sync::broadcast` channel. Subscribers only see events
//! published after they subscribed; nothing is replayed. A subscriber that
//! falls more than the channel capacity behind skips the overrun events.

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::models::Person;

/// Publisher handle for `personAdded` events. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Person>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per slow subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration rejects that value.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a newly added contact to every live subscriber.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn publish_person_added(&self, person: Person) -> usize {
        // A send error only means there is currently nobody listening.
        let delivered = self.sender.send(person).unwrap_or(0);
        debug!(subscribers = delivered, "Published personAdded");
        delivered
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream of contacts added from now on.
    pub fn person_added(&self) -> impl Stream<Item = Person> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(person) => yield person,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "personAdded subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;
    use phonebook_core::{City, PersonId, PersonName, Street};

    use super::*;

    fn person(id: i32, name: &str) -> Person {
        Person {
            id: PersonId::new(id),
            name: PersonName::parse(name).unwrap(),
            phone: None,
            street: Street::parse("Main Street").unwrap(),
            city: City::parse("Springfield").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_publish_order() {
        let bus = EventBus::new(8);
        let stream = bus.person_added();
        futures::pin_mut!(stream);

        bus.publish_person_added(person(1, "Arto Hellas"));
        bus.publish_person_added(person(2, "Venla Ruuska"));

        assert_eq!(stream.next().await.unwrap().id, PersonId::new(1));
        assert_eq!(stream.next().await.unwrap().id, PersonId::new(2));
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let bus = EventBus::new(8);
        bus.publish_person_added(person(1, "Arto Hellas"));

        let stream = bus.person_added();
        futures::pin_mut!(stream);
        bus.publish_person_added(person(2, "Venla Ruuska"));

        assert_eq!(stream.next().await.unwrap().id, PersonId::new(2));
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_each_event() {
        let bus = EventBus::new(8);
        let first = bus.person_added();
        let second = bus.person_added();
        futures::pin_mut!(first);
        futures::pin_mut!(second);

        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.publish_person_added(person(1, "Arto Hellas")), 2);

        assert_eq!(first.next().await.unwrap().id, PersonId::new(1));
        assert_eq!(second.next().await.unwrap().id, PersonId::new(1));
    }

    #[test]
    fn test_publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish_person_added(person(1, "Arto Hellas")), 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_overrun_events() {
        let bus = EventBus::new(2);
        let stream = bus.person_added();
        futures::pin_mut!(stream);

        for id in 1..=4 {
            bus.publish_person_added(person(id, &format!("Person {id}")));
        }

        assert_eq!(stream.next().await.unwrap().id, PersonId::new(3));
        assert_eq!(stream.next().await.unwrap().id, PersonId::new(4));
    }
}
