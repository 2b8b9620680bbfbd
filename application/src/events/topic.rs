use super::log::{Emission, EventLog};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

type Handler<T> = Arc<dyn Fn(&T, &mut EventLog) + Send + Sync>;

/// A typed publish/subscribe channel
pub struct Topic<T> {
    name: &'static str,
    subscribers: RwLock<Vec<(String, Handler<T>)>>,
}

impl<T> Topic<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a subscriber; it stays registered for the lifetime of the topic
    pub fn subscribe<F>(&self, subscriber: impl Into<String>, handler: F)
    where
        F: Fn(&T, &mut EventLog) + Send + Sync + 'static,
    {
        let subscriber = subscriber.into();
        debug!("Topic {}: subscribed {}", self.name, subscriber);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscriber, Arc::new(handler)));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every subscriber, in subscription order
    ///
    /// The subscriber list is snapshotted first, so a handler may publish
    /// or subscribe without deadlocking. Subscribers added during delivery
    /// only see later events.
    pub fn publish(&self, event: &T) -> Emission {
        let snapshot: Vec<(String, Handler<T>)> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        debug!(
            "Topic {}: delivering to {} subscriber(s)",
            self.name,
            snapshot.len()
        );

        let logs = snapshot
            .into_iter()
            .map(|(subscriber, handler)| {
                let mut log = EventLog::new(subscriber);
                handler(event, &mut log);
                for entry in log.entries() {
                    debug!(
                        "Topic {} [{}]: {}: {}",
                        self.name,
                        log.subscriber(),
                        entry.short,
                        entry.long
                    );
                }
                log
            })
            .collect();

        Emission {
            topic: self.name,
            logs,
        }
    }
}
