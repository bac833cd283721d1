// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue store.
//!
//! The whole queue is one JSON array under [`QUEUE_STORAGE_KEY`] in a
//! [`KeyValueStore`]. Items are appended at the tail and removed only by
//! id, so storage order is always delivery order.
//!
//! The store also keeps an in-memory view of the queue. It is seeded by
//! hydration and replaced after every successful mutation, and is what the
//! replay engine walks.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use cq_core::id::generate_unique_queue_id;
use cq_core::{CanonicalRequest, QueuedRequest};

use crate::storage::{KeyValueStore, StorageError, Update};

/// Storage key holding the serialized queue.
pub const QUEUE_STORAGE_KEY: &str = "offline_queue";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-memory view is unusable after a panic elsewhere.
    #[error("queue lock poisoned")]
    Poisoned,
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

fn decode(json: Option<&str>) -> QueueResult<Vec<QueuedRequest>> {
    match json {
        Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(json)?),
        _ => Ok(Vec::new()),
    }
}

/// An empty queue removes the key rather than storing `[]`.
fn encode(items: &[QueuedRequest]) -> QueueResult<Update> {
    if items.is_empty() {
        Ok(Update::Remove)
    } else {
        Ok(Update::Set(serde_json::to_string(items)?))
    }
}

/// Durable FIFO of deferred requests.
pub struct QueueStore {
    storage: Box<dyn KeyValueStore>,
    cache: Mutex<Vec<QueuedRequest>>,
}

impl QueueStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        QueueStore {
            storage,
            cache: Mutex::new(Vec::new()),
        }
    }

    fn cache(&self) -> QueueResult<MutexGuard<'_, Vec<QueuedRequest>>> {
        self.cache.lock().map_err(|_| QueueError::Poisoned)
    }

    fn read_storage(&self) -> QueueResult<Vec<QueuedRequest>> {
        decode(self.storage.get_item(QUEUE_STORAGE_KEY)?.as_deref())
    }

    /// Applies `edit` to the stored queue as one atomic read-modify-write
    /// and refreshes the in-memory view. `edit` returns its output and
    /// whether it changed the queue; unchanged queues are not rewritten.
    ///
    /// On failure nothing is persisted and the in-memory view is unchanged.
    fn modify<T>(
        &self,
        edit: impl FnOnce(&mut Vec<QueuedRequest>) -> (T, bool),
    ) -> QueueResult<T> {
        let mut cache = self.cache()?;
        let mut edit = Some(edit);
        let mut edited: Option<QueueResult<(T, Vec<QueuedRequest>)>> = None;

        self.storage.update(QUEUE_STORAGE_KEY, &mut |current: Option<&str>| {
            let Some(edit) = edit.take() else {
                return Update::Keep;
            };
            let mut items = match decode(current) {
                Ok(items) => items,
                Err(e) => {
                    edited = Some(Err(e));
                    return Update::Keep;
                }
            };
            let (output, changed) = edit(&mut items);
            let update = if changed {
                match encode(&items) {
                    Ok(update) => update,
                    Err(e) => {
                        edited = Some(Err(e));
                        return Update::Keep;
                    }
                }
            } else {
                Update::Keep
            };
            edited = Some(Ok((output, items)));
            update
        })?;

        let (output, items) = edited.ok_or_else(|| {
            StorageError::Unavailable("storage skipped the queue update".to_string())
        })??;
        *cache = items;
        Ok(output)
    }

    /// Reads the full queue from storage, oldest first, and refreshes the
    /// in-memory view.
    pub fn try_get_queue(&self) -> QueueResult<Vec<QueuedRequest>> {
        let mut cache = self.cache()?;
        let items = self.read_storage()?;
        *cache = items.clone();
        Ok(items)
    }

    /// Like [`try_get_queue`](Self::try_get_queue), but an unreadable
    /// storage reads as an empty queue.
    pub fn get_queue(&self) -> Vec<QueuedRequest> {
        match self.try_get_queue() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "offline queue unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Appends a request at the tail and persists the queue.
    ///
    /// Returns the stored item. On failure nothing is persisted and the
    /// in-memory view is unchanged.
    pub fn add_to_queue(&self, request: CanonicalRequest) -> QueueResult<QueuedRequest> {
        let enqueued_at = Utc::now();
        let item = self.modify(|items| {
            let id = generate_unique_queue_id(&request, &enqueued_at, |candidate| {
                items.iter().any(|item| item.id == candidate)
            });
            let item = QueuedRequest::new(id, request, enqueued_at);
            items.push(item.clone());
            (item, true)
        })?;

        tracing::debug!(
            id = %item.id,
            method = %item.request.method,
            url = %item.request.url,
            "queued request"
        );
        Ok(item)
    }

    /// Removes the item with the given id.
    ///
    /// Returns false if no such item was stored.
    pub fn remove_from_queue(&self, id: &str) -> QueueResult<bool> {
        self.modify(|items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            let removed = items.len() != before;
            (removed, removed)
        })
    }

    /// Increments and persists the delivery attempt count of an item.
    ///
    /// Returns the new count, or `None` if no such item was stored.
    pub fn record_attempt(&self, id: &str) -> QueueResult<Option<u32>> {
        self.modify(|items| match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.attempts = item.attempts.saturating_add(1);
                (Some(item.attempts), true)
            }
            None => (None, false),
        })
    }

    /// Removes every queued item.
    pub fn clear(&self) -> QueueResult<usize> {
        let mut cache = self.cache()?;
        let mut count = 0;
        self.storage.update(QUEUE_STORAGE_KEY, &mut |current: Option<&str>| {
            count = decode(current).map(|items| items.len()).unwrap_or(0);
            Update::Remove
        })?;
        cache.clear();
        Ok(count)
    }

    /// Replaces the in-memory view without touching storage.
    pub(crate) fn seed(&self, items: Vec<QueuedRequest>) {
        if let Ok(mut cache) = self.cache() {
            *cache = items;
        }
    }

    /// The in-memory view, oldest first.
    pub fn snapshot(&self) -> Vec<QueuedRequest> {
        self.cache().map(|c| c.clone()).unwrap_or_default()
    }

    /// The oldest item in the in-memory view.
    pub fn head(&self) -> Option<QueuedRequest> {
        self.cache().ok().and_then(|c| c.first().cloned())
    }

    /// Number of items in the in-memory view.
    pub fn len(&self) -> usize {
        self.cache().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
