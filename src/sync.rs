//! Per-entity mutual exclusion.
//!
//! All mutations to one lifecycle entity are serialized through
//! `EntityGuard::with_lock`, whether they come from an interaction event, a
//! timer firing, or a gateway event. Locks are created lazily on first use
//! and evicted once the last holder releases, so the table only ever holds
//! entries for entities with a mutation in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;

#[derive(Default)]
pub struct EntityGuard {
    locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fut` while holding the exclusive lock for `key`.
    ///
    /// Two concurrent calls for the same key never overlap; calls for
    /// different keys never block each other. Waiters for one key are served
    /// in arrival order (tokio mutexes are FIFO-fair). The lock is released
    /// on every exit path, and the table entry is dropped once no other task
    /// holds or awaits it.
    pub async fn with_lock<F, T>(&self, key: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        let output = {
            let _held = lock.lock().await;
            fut.await
        };

        {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = locks.get(key) {
                // Two strong refs means the table and our clone; nobody else
                // is waiting, so the entry can be evicted.
                if Arc::strong_count(entry) <= 2 {
                    locks.remove(key);
                }
            }
        }

        output
    }

    /// Number of live lock entries. Only meaningful for eviction tests.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock key helpers so every call site uses the same namespacing.
pub mod keys {
    pub fn ticket(id: i32) -> String {
        format!("ticket:{id}")
    }

    pub fn role_menu_user(menu_id: i32, user_id: &str) -> String {
        format!("rolemenu:{menu_id}:{user_id}")
    }

    pub fn temp_voice(channel_id: &str) -> String {
        format!("tempvoice:{channel_id}")
    }

    pub fn giveaway(id: i32) -> String {
        format!("giveaway:{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Two tasks incrementing through the same key must never observe each
    /// other mid-critical-section.
    #[tokio::test]
    async fn serializes_same_key() {
        let guard = Arc::new(EntityGuard::new());
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = Arc::clone(&guard);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                guard
                    .with_lock("ticket:1", async {
                        let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_section.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    /// Different keys must not contend: a held lock on one key cannot delay
    /// work under another key.
    #[tokio::test]
    async fn independent_keys_run_concurrently() {
        let guard = Arc::new(EntityGuard::new());

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let holder = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move {
                guard
                    .with_lock("ticket:1", async {
                        // Blocks until the other key's work completes.
                        rx.await.unwrap();
                    })
                    .await;
            })
        };

        guard.with_lock("ticket:2", async {}).await;
        tx.send(()).unwrap();
        holder.await.unwrap();
    }

    /// The lock table must not leak entries once all holders are done.
    #[tokio::test]
    async fn evicts_idle_entries() {
        let guard = Arc::new(EntityGuard::new());

        let mut handles = Vec::new();
        for i in 0..4 {
            let guard = Arc::clone(&guard);
            handles.push(tokio::spawn(async move {
                guard.with_lock(&format!("giveaway:{i}"), async {}).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(guard.is_empty());
    }

    /// A panic-free error exit still releases the lock for the next caller.
    #[tokio::test]
    async fn releases_on_error_path() {
        let guard = EntityGuard::new();

        let result: Result<(), &str> = guard.with_lock("ticket:9", async { Err("boom") }).await;
        assert!(result.is_err());

        // Re-acquiring must succeed immediately.
        guard.with_lock("ticket:9", async {}).await;
        assert!(guard.is_empty());
    }
}
