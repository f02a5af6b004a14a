//! Ordered observer list with synchronous delivery.

use crossbeam_channel::{bounded, Sender, TrySendError};
use tracing::debug;

use super::types::{EventFilter, InventoryEvent, ObserverId, SubscriptionConfig, SubscriptionHandle};

type Callback = Box<dyn FnMut(&InventoryEvent) + Send>;

enum Sink {
    Callback(Callback),
    Channel(Sender<InventoryEvent>),
}

struct Observer {
    id: ObserverId,
    filter: EventFilter,
    sink: Sink,
}

impl Observer {
    /// Deliver an event. Returns false if the observer should be dropped.
    fn deliver(&mut self, event: &InventoryEvent) -> bool {
        match &mut self.sink {
            Sink::Callback(callback) => {
                callback(event);
                true
            }
            Sink::Channel(sender) => match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
            },
        }
    }
}

/// Observers of one inventory, notified in registration order.
pub struct ObserverList {
    observers: Vec<Observer>,
    next_id: u64,
}

impl ObserverList {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a callback.
    pub fn add<F>(&mut self, filter: EventFilter, callback: F) -> ObserverId
    where
        F: FnMut(&InventoryEvent) + Send + 'static,
    {
        self.push(filter, Sink::Callback(Box::new(callback)))
    }

    /// Register a bounded channel subscription.
    pub fn subscribe(&mut self, config: SubscriptionConfig) -> SubscriptionHandle {
        let (sender, receiver) = bounded(config.buffer_size.max(1));
        let id = self.push(config.filter, Sink::Channel(sender));
        SubscriptionHandle { id, receiver }
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver an event to every matching observer, in order.
    ///
    /// Channel subscribers that cannot take the event are dropped.
    pub fn notify(&mut self, event: &InventoryEvent) {
        let mut dropped = Vec::new();

        for observer in self.observers.iter_mut() {
            if observer.filter.matches(event) && !observer.deliver(event) {
                dropped.push(observer.id);
            }
        }

        if !dropped.is_empty() {
            debug!(count = dropped.len(), "dropping slow or disconnected subscribers");
            self.observers.retain(|observer| !dropped.contains(&observer.id));
        }
    }

    fn push(&mut self, filter: EventFilter, sink: Sink) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push(Observer { id, filter, sink });
        id
    }
}

impl Default for ObserverList {
    fn default() -> Self {
        Self::new()
    }
}
