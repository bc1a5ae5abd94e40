//! Change notifications
//!
//! Observers register for a [`Scope`] and receive one [`Change`] per
//! mutating call that touched at least one row they can see. Queries return
//! snapshots; an observer re-queries when told its data changed.
//!
//! Delivery rules:
//! - a collection-scope change reaches every observer
//! - an item-scope change reaches collection observers and the observers of
//!   that item
//!
//! Senders are unbounded tokio channels, which can be fed from synchronous
//! code without a runtime. Dropped subscriptions are pruned on the next
//! delivery.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::contract::ResourceKey;
use crate::models::ListingId;

/// Granularity of a notification or subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Collection,
    Item(ListingId),
}

impl Scope {
    /// Whether an observer of `self` should hear about a change at `changed`
    pub fn observes(&self, changed: &Scope) -> bool {
        match (self, changed) {
            (_, Scope::Collection) => true,
            (Scope::Collection, Scope::Item(_)) => true,
            (Scope::Item(mine), Scope::Item(theirs)) => mine == theirs,
        }
    }
}

impl From<ResourceKey> for Scope {
    fn from(key: ResourceKey) -> Self {
        match key {
            ResourceKey::Collection => Scope::Collection,
            ResourceKey::Item(id) => Scope::Item(id),
        }
    }
}

impl From<&ResourceKey> for Scope {
    fn from(key: &ResourceKey) -> Self {
        Scope::from(*key)
    }
}

/// What happened to the data behind a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// A delivered notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// Scope the mutation was reported at
    pub scope: Scope,
    pub kind: ChangeKind,
    /// Rows affected by the mutation
    pub rows: usize,
}

struct Observer {
    scope: Scope,
    tx: UnboundedSender<Change>,
}

/// Registry of observers shared between a store and its subscriptions
#[derive(Clone, Default)]
pub struct NotificationHub {
    observers: Arc<Mutex<Vec<Observer>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for `scope`
    pub fn subscribe(&self, scope: Scope) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(Observer { scope, tx });
        Subscription { scope, rx }
    }

    /// Deliver `change` to every observer whose scope covers it
    ///
    /// Returns the number of observers reached.
    pub fn notify(&self, change: Change) -> usize {
        let mut observers = self.lock();
        observers.retain(|o| !o.tx.is_closed());

        let mut delivered = 0;
        for observer in observers.iter() {
            if observer.scope.observes(&change.scope) && observer.tx.send(change).is_ok() {
                delivered += 1;
            }
        }

        trace!(?change, delivered, "Delivered change notification");
        delivered
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        let mut observers = self.lock();
        observers.retain(|o| !o.tx.is_closed());
        observers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Observer>> {
        // A panic while holding the lock cannot leave the list half-updated
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("observers", &self.lock().len())
            .finish()
    }
}

/// Receiving end of a registration; dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    scope: Scope,
    rx: UnboundedReceiver<Change>,
}

impl Subscription {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Next pending change, if any, without waiting
    pub fn try_next(&mut self) -> Option<Change> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take every pending change
    pub fn drain(&mut self) -> Vec<Change> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next change; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<Change> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(scope: Scope) -> Change {
        Change {
            scope,
            kind: ChangeKind::Updated,
            rows: 1,
        }
    }

    #[test]
    fn test_scope_coverage() {
        let one = Scope::Item(ListingId(1));
        let two = Scope::Item(ListingId(2));

        assert!(Scope::Collection.observes(&Scope::Collection));
        assert!(Scope::Collection.observes(&one));
        assert!(one.observes(&Scope::Collection));
        assert!(one.observes(&one));
        assert!(!one.observes(&two));
    }

    #[test]
    fn test_item_change_reaches_collection_and_item() {
        let hub = NotificationHub::new();
        let mut all = hub.subscribe(Scope::Collection);
        let mut one = hub.subscribe(Scope::Item(ListingId(1)));
        let mut two = hub.subscribe(Scope::Item(ListingId(2)));

        assert_eq!(hub.notify(change(Scope::Item(ListingId(1)))), 2);

        assert_eq!(all.drain().len(), 1);
        assert_eq!(one.drain().len(), 1);
        assert!(two.drain().is_empty());
    }

    #[test]
    fn test_collection_change_reaches_everyone() {
        let hub = NotificationHub::new();
        let mut all = hub.subscribe(Scope::Collection);
        let mut one = hub.subscribe(Scope::Item(ListingId(1)));

        hub.notify(change(Scope::Collection));

        assert_eq!(all.try_next().map(|c| c.scope), Some(Scope::Collection));
        assert!(all.try_next().is_none());
        assert_eq!(one.drain().len(), 1);
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe(Scope::Collection);
        let _kept = hub.subscribe(Scope::Collection);
        assert_eq!(hub.observer_count(), 2);

        drop(sub);

        assert_eq!(hub.notify(change(Scope::Collection)), 1);
        assert_eq!(hub.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_async_recv() {
        let hub = NotificationHub::new();
        let mut sub = hub.subscribe(Scope::Collection);

        hub.notify(change(Scope::Collection));

        let received = sub.recv().await.unwrap();
        assert_eq!(received.kind, ChangeKind::Updated);
    }

    #[tokio::test]
    async fn test_recv_ends_when_hub_dropped() {
        let hub = NotificationHub::new();
        let mut sub = hub.subscribe(Scope::Collection);
        drop(hub);

        assert!(sub.recv().await.is_none());
    }
}
