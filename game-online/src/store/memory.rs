use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use super::{
    RoomStore, StoreError, Subscription, SubscriptionId, TransactOutcome, Transaction, parse_path,
};

struct Subscriber {
    path: Vec<String>,
    sender: mpsc::UnboundedSender<Option<Value>>,
}

/// In-process store: one JSON tree behind a lock, with push subscriptions.
///
/// Subscribers are notified while the write lock is still held, so every
/// subscriber sees changes in the order they were applied.
pub struct MemoryRoomStore {
    root: RwLock<Value>,
    subscribers: DashMap<SubscriptionId, Subscriber>,
    available: AtomicBool,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            subscribers: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing the connection: every call fails with
    /// [`StoreError::Unavailable`] until it is switched back on.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    /// Run `mutate` under the write lock and notify subscribers whose path
    /// overlaps one of `touched`, if the value they watch changed.
    async fn mutate<T>(
        &self,
        touched: &[Vec<String>],
        mutate: impl FnOnce(&mut Value) -> T,
    ) -> T {
        let mut root = self.root.write().await;

        let watchers: Vec<(SubscriptionId, Vec<String>, Option<Value>)> = self
            .subscribers
            .iter()
            .filter(|entry| touched.iter().any(|path| overlaps(&entry.path, path)))
            .map(|entry| (*entry.key(), entry.path.clone(), get(&*root, &entry.path).cloned()))
            .collect();

        let result = mutate(&mut *root);

        let mut dead = Vec::new();
        for (id, path, before) in watchers {
            let after = get(&*root, &path).cloned();
            if after == before {
                continue;
            }
            if let Some(subscriber) = self.subscribers.get(&id) {
                if subscriber.sender.send(after).is_err() {
                    dead.push(id);
                }
            }
        }
        for id in dead {
            debug!("Dropping closed subscription {}", id);
            self.subscribers.remove(&id);
        }

        result
    }
}

impl Default for MemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.ensure_available()?;
        let segments = parse_path(path)?;
        self.mutate(std::slice::from_ref(&segments), |root| set(root, &segments, value))
            .await;
        Ok(())
    }

    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError> {
        self.ensure_available()?;
        let base = parse_path(path)?;

        let mut entries = Vec::with_capacity(patch.len());
        for (key, value) in patch {
            let mut segments = base.clone();
            segments.extend(parse_path(&key)?);
            entries.push((segments, value));
        }

        let touched: Vec<Vec<String>> = entries.iter().map(|(s, _)| s.clone()).collect();
        self.mutate(&touched, |root| {
            for (segments, value) in entries {
                set(root, &segments, value);
            }
        })
        .await;
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.ensure_available()?;
        let segments = parse_path(path)?;
        let root = self.root.read().await;
        Ok(get(&*root, &segments).cloned())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let segments = parse_path(path)?;
        self.mutate(std::slice::from_ref(&segments), |root| remove(root, &segments))
            .await;
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        self.ensure_available()?;
        let segments = parse_path(path)?;
        let (sender, updates) = mpsc::unbounded_channel();
        let id = SubscriptionId::new();

        // Holding the read lock keeps writers out until the subscriber is
        // registered, so no change falls between the snapshot and the feed.
        let root = self.root.read().await;
        let _ = sender.send(get(&*root, &segments).cloned());
        self.subscribers.insert(
            id,
            Subscriber {
                path: segments,
                sender,
            },
        );
        drop(root);

        debug!("Subscription {} opened on {}", id, path);
        Ok(Subscription {
            id,
            path: path.to_string(),
            updates,
        })
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscribers.remove(&id).is_some() {
            debug!("Subscription {} closed", id);
        }
    }

    async fn transact(&self, path: &str, transaction: Transaction) -> Result<bool, StoreError> {
        self.ensure_available()?;
        let segments = parse_path(path)?;
        let committed = self
            .mutate(std::slice::from_ref(&segments), |root| {
                match transaction(get(root, &segments).cloned()) {
                    TransactOutcome::Commit(value) => {
                        set(root, &segments, value);
                        true
                    }
                    TransactOutcome::Abort => false,
                }
            })
            .await;
        if !committed {
            warn!("Transaction on {} aborted", path);
        }
        Ok(committed)
    }
}

/// One path is a prefix of the other.
fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

fn get<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Drop nulls, empty objects and empty arrays, which the tree never holds.
fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(normalize).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        other => Some(other),
    }
}

fn set(root: &mut Value, segments: &[String], value: Value) {
    match normalize(value) {
        Some(value) => put(root, segments, value),
        None => remove(root, segments),
    }
}

fn put(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        put(child, rest, value);
    }
}

/// Remove the value at `segments`, pruning parents left empty.
fn remove(root: &mut Value, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Value::Object(map) = root else {
        return;
    };

    if rest.is_empty() {
        map.remove(first);
        return;
    }
    if let Some(child) = map.get_mut(first) {
        remove(child, rest);
        if child.as_object().is_some_and(|m| m.is_empty()) {
            map.remove(first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let store = MemoryRoomStore::new();
        store
            .write("rooms/ABC", json!({"id": "ABC", "players": {}, "winner": null}))
            .await
            .unwrap();

        // Nulls and empty maps are never stored.
        assert_eq!(store.read("rooms/ABC").await.unwrap(), Some(json!({"id": "ABC"})));
        assert_eq!(store.read("rooms/ABC/players").await.unwrap(), None);

        store.delete("rooms/ABC").await.unwrap();
        assert_eq!(store.read("rooms/ABC").await.unwrap(), None);
        assert_eq!(store.read("rooms").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_path_update() {
        let store = MemoryRoomStore::new();
        store
            .write("rooms/ABC", json!({"status": "waiting", "players": {"a": {"vote": "b"}}}))
            .await
            .unwrap();

        store
            .update(
                "rooms/ABC",
                patch(json!({"status": "voting", "players/a/vote": null, "players/b/name": "Bo"})),
            )
            .await
            .unwrap();

        assert_eq!(
            store.read("rooms/ABC").await.unwrap(),
            Some(json!({"status": "voting", "players": {"b": {"name": "Bo"}}}))
        );
    }

    #[tokio::test]
    async fn test_subscription_gets_snapshot_then_changes() {
        let store = MemoryRoomStore::new();
        store.write("rooms/ABC/status", json!("waiting")).await.unwrap();

        let mut sub = store.subscribe("rooms/ABC").await.unwrap();
        assert_eq!(sub.updates.recv().await.unwrap(), Some(json!({"status": "waiting"})));

        store.write("rooms/ABC/status", json!("playing")).await.unwrap();
        assert_eq!(sub.updates.recv().await.unwrap(), Some(json!({"status": "playing"})));

        // Unrelated paths and no-op writes do not notify.
        store.write("rooms/XYZ/status", json!("waiting")).await.unwrap();
        store.write("rooms/ABC/status", json!("playing")).await.unwrap();
        store.delete("rooms/ABC").await.unwrap();
        assert_eq!(sub.updates.recv().await.unwrap(), None);

        store.unsubscribe(sub.id).await;
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_transaction_commit_and_abort() {
        let store = MemoryRoomStore::new();
        store.write("counter", json!(1)).await.unwrap();

        let committed = store
            .transact(
                "counter",
                Box::new(|current| {
                    let n = current.and_then(|v| v.as_i64()).unwrap_or(0);
                    TransactOutcome::Commit(json!(n + 1))
                }),
            )
            .await
            .unwrap();
        assert!(committed);
        assert_eq!(store.read("counter").await.unwrap(), Some(json!(2)));

        let committed = store
            .transact("counter", Box::new(|_| TransactOutcome::Abort))
            .await
            .unwrap();
        assert!(!committed);
        assert_eq!(store.read("counter").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryRoomStore::new();
        store.set_available(false);
        assert!(matches!(
            store.read("rooms/ABC").await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_available(true);
        assert!(store.read("rooms/ABC").await.unwrap().is_none());
        assert!(matches!(
            store.read("rooms//x").await,
            Err(StoreError::InvalidPath(_))
        ));
    }
}
