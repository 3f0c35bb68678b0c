// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request coalescing
//!
//! [`Dedup`] folds concurrent calls with the same key into one execution.
//! The first caller (the leader) runs the operation; callers arriving while it
//! is in flight (followers) wait and receive a clone of its result. Nothing is
//! cached: the entry is removed as soon as the leader settles.
//!
//! If the leader future is dropped before settling, its entry is removed and
//! waiting followers start over, one of them becoming the new leader.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, OnceCell};

struct Waiter<V, E> {
    result: OnceCell<Result<V, E>>,
    abandoned: AtomicBool,
    notify: Notify,
}

impl<V, E> Waiter<V, E> {
    fn new() -> Self {
        Self {
            result: OnceCell::new(),
            abandoned: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }
}

enum Role<V, E> {
    Leader(Arc<Waiter<V, E>>),
    Follower(Arc<Waiter<V, E>>),
}

pub struct Dedup<K, V, E> {
    in_flight: Mutex<HashMap<K, Arc<Waiter<V, E>>>>,
}

impl<K, V, E> Dedup<K, V, E>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    E: Clone + Send,
{
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` unless an identical call is already in flight, in which case
    /// wait for that call and return a clone of its result
    pub async fn call<F, Fut>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loop {
            let waiter = match self.join(&key) {
                Role::Leader(waiter) => return self.lead(key, waiter, f).await,
                Role::Follower(waiter) => waiter,
            };
            if let Some(result) = follow(&waiter).await {
                return result;
            }
        }
    }

    /// Number of distinct keys currently in flight
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }

    fn join(&self, key: &K) -> Role<V, E> {
        let mut map = self.in_flight.lock().unwrap();
        match map.get(key) {
            Some(waiter) => Role::Follower(Arc::clone(waiter)),
            None => {
                let waiter = Arc::new(Waiter::new());
                map.insert(key.clone(), Arc::clone(&waiter));
                Role::Leader(waiter)
            }
        }
    }

    async fn lead<F, Fut>(&self, key: K, waiter: Arc<Waiter<V, E>>, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut guard = LeaderGuard {
            dedup: self,
            key,
            waiter,
            settled: false,
        };

        let result = f().await;

        // Only writer, so set cannot fail
        let _ = guard.waiter.result.set(result.clone());
        guard.settled = true;
        result
    }
}

async fn follow<V: Clone, E: Clone>(waiter: &Waiter<V, E>) -> Option<Result<V, E>> {
    loop {
        // Register before checking, so a notification between the check and
        // the await is not lost
        let notified = waiter.notify.notified();

        if let Some(result) = waiter.result.get() {
            return Some(result.clone());
        }
        if waiter.abandoned.load(Ordering::Acquire) {
            return None;
        }

        notified.await;
    }
}

/// Removes the in-flight entry and wakes followers however the leader exits
struct LeaderGuard<'a, K, V, E>
where
    K: Hash + Eq,
{
    dedup: &'a Dedup<K, V, E>,
    key: K,
    waiter: Arc<Waiter<V, E>>,
    settled: bool,
}

impl<K, V, E> Drop for LeaderGuard<'_, K, V, E>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        {
            let mut map = self.dedup.in_flight.lock().unwrap();
            if map.get(&self.key).is_some_and(|current| Arc::ptr_eq(current, &self.waiter)) {
                map.remove(&self.key);
            }
        }
        if !self.settled {
            self.waiter.abandoned.store(true, Ordering::Release);
        }
        self.waiter.notify.notify_waiters();
    }
}

impl<K, V, E> Default for Dedup<K, V, E>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    E: Clone + Send,
{
    fn default() -> Self {
        Self::new()
    }
}
