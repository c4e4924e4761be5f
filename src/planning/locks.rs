// ABOUTME: Per-user serialization of pool and plan read-modify-write sequences
// ABOUTME: DashMap of async mutexes so concurrent calls for one user run one at a time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per user
///
/// Every mutating engine call holds its user's guard for the whole
/// read-modify-write. Calls for different users never contend.
#[derive(Debug, Default, Clone)]
pub struct UserLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Empty lock table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and hold the user's lock
    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop entries no task currently holds or waits on
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked users
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no user is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_serializes() {
        let locks = UserLocks::new();
        let user = Uuid::new_v4();

        let guard = locks.acquire(user).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(user)).await;
        assert!(second.is_err());
        drop(guard);

        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(user)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _first = locks.acquire(Uuid::new_v4()).await;
        let second =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = UserLocks::new();
        let held = locks.acquire(Uuid::new_v4()).await;
        drop(locks.acquire(Uuid::new_v4()).await);
        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }
}
