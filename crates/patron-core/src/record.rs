#![forbid(unsafe_code)]

//! Collection records and the live collection-stream capability.
//!
//! Collections are named sets of schemaless JSON documents whose full
//! current contents are observable as a push-based stream: every emission
//! carries the complete snapshot, replacing the previous one. The only
//! implicit schema contract in this system is that records in the
//! "donations" collection carry a numeric `amount` field.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::mpsc;

/// A single collection document.
pub type Record = serde_json::Value;

/// Capability for subscribing to live collection snapshots.
///
/// Every emission on the returned channel is the full current contents of
/// the collection. Independent concurrent subscriptions to the same name
/// each receive every emission.
pub trait CollectionSource {
    /// Open a live snapshot stream for the named collection.
    fn subscribe(&self, collection: &str) -> mpsc::Receiver<Vec<Record>>;
}

/// Per-collection fan-out state.
#[derive(Default)]
struct CollectionState {
    subscribers: Vec<mpsc::Sender<Vec<Record>>>,
    latest: Option<Vec<Record>>,
}

/// In-memory collection source.
///
/// Stands in for the remote document store and doubles as the test source.
/// [`publish`](MemoryCollections::publish) delivers a clone of the snapshot
/// to every live subscriber of that collection and retains it, so a late
/// subscriber immediately receives the current snapshot on subscribe. This
/// removes any ordering race between screen activation and the first
/// publish.
#[derive(Default)]
pub struct MemoryCollections {
    collections: Mutex<HashMap<String, CollectionState>>,
}

impl MemoryCollections {
    /// Create an empty source with no collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the named collection's contents and notify all subscribers.
    pub fn publish(&self, collection: &str, snapshot: Vec<Record>) {
        let mut collections = self
            .collections
            .lock()
            .expect("collection map lock poisoned");
        let state = collections.entry(collection.to_string()).or_default();
        // Dropped receivers are pruned here rather than on subscribe.
        state
            .subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
        tracing::debug!(
            collection,
            records = snapshot.len(),
            subscribers = state.subscribers.len(),
            "published collection snapshot"
        );
        state.latest = Some(snapshot);
    }

    /// Number of live subscribers for a collection (diagnostics and tests).
    #[must_use]
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .expect("collection map lock poisoned")
            .get(collection)
            .map_or(0, |state| state.subscribers.len())
    }
}

impl CollectionSource for MemoryCollections {
    fn subscribe(&self, collection: &str) -> mpsc::Receiver<Vec<Record>> {
        let (sender, receiver) = mpsc::channel();
        let mut collections = self
            .collections
            .lock()
            .expect("collection map lock poisoned");
        let state = collections.entry(collection.to_string()).or_default();
        if let Some(latest) = &state.latest {
            // Replay the retained snapshot so the subscriber starts current.
            let _ = sender.send(latest.clone());
        }
        state.subscribers.push(sender);
        tracing::debug!(collection, "opened collection subscription");
        receiver
    }
}
