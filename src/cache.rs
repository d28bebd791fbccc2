// SPDX-License-Identifier: MIT
//! Client-side query cache with a freshness window.
//!
//! A single-writer key-value store shared across the process (`Arc`).
//! Cached values are copies of remote state, never a source of truth.
//! The full mutating surface is:
//!
//! - [`QueryCache::read`] — cloned value plus a staleness verdict
//! - [`QueryCache::replace`] — store a fresh value
//! - [`QueryCache::transform`] — atomic patch-and-commit
//! - [`QueryCache::invalidate`] — mark stale, eligible for refresh
//!
//! `transform` computes the new value and commits it under one lock
//! acquisition. A patch can therefore never be computed and then dropped
//! on the floor, and concurrent mutation handlers cannot interleave
//! between compute and commit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Result of a cache read: the stored value and whether it is stale.
#[derive(Debug, Clone)]
pub struct CachedRead<T> {
    pub value: T,
    /// True when the entry was invalidated or its age exceeds the
    /// freshness window. Stale entries stay readable; they are merely
    /// eligible for background refresh on next access.
    pub is_stale: bool,
}

#[derive(Debug)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
    invalidated: bool,
}

/// Keyed query cache with one configuration option: the freshness window.
#[derive(Debug)]
pub struct QueryCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    stale_after: Duration,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // A panic mid-operation leaves no torn entry (each op is a single
        // insert/remove), so recover rather than propagate the poison.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a cached value, if any, with its staleness verdict.
    pub fn read(&self, key: &str) -> Option<CachedRead<T>> {
        let entries = self.lock();
        entries.get(key).map(|entry| CachedRead {
            value: entry.value.clone(),
            is_stale: entry.invalidated || entry.fetched_at.elapsed() >= self.stale_after,
        })
    }

    /// Store a freshly fetched value, resetting age and the stale flag.
    pub fn replace(&self, key: &str, value: T) {
        let mut entries = self.lock();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Atomic patch-and-commit: apply `f` to the stored value and commit
    /// the result in the same lock acquisition. Age and staleness are
    /// untouched — a patch is speculative, not a fetch.
    ///
    /// Returns false (and does nothing) when the key is absent.
    pub fn transform<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(T) -> T,
    {
        let mut entries = self.lock();
        match entries.remove(key) {
            Some(entry) => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: f(entry.value),
                        fetched_at: entry.fetched_at,
                        invalidated: entry.invalidated,
                    },
                );
                true
            }
            None => false,
        }
    }

    /// Mark an entry stale. A no-op for absent keys.
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.invalidated = true;
        }
    }
}
