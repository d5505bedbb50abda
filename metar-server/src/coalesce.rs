//! In-flight request coalescing.
//!
//! Concurrent callers asking for the same key share one underlying
//! resolution: the first caller to find no slot creates one and runs the
//! resolution, later callers find the slot and wait on it. Once resolved, or
//! abandoned by every caller, the slot is removed, so the next caller after
//! that starts a fresh resolution.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

/// Table of in-flight resolutions keyed by `K`, each producing a `V`.
pub struct Coalescer<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for Coalescer<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Coalescer<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`, joining an in-flight resolution if there is one.
    ///
    /// `resolve` only runs if this caller ends up driving the resolution. If
    /// the driving caller is cancelled, a waiting caller takes over with its
    /// own `resolve`.
    pub async fn run<F, Fut>(&self, key: K, resolve: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let guard = {
            let mut slots = self.slots.lock();
            let slot = Arc::clone(slots.entry(key.clone()).or_default());
            SlotGuard {
                slots: &self.slots,
                key,
                slot,
            }
        };

        guard.slot.get_or_init(resolve).await.clone()
    }

    /// Number of keys currently being resolved.
    pub fn in_flight(&self) -> usize {
        self.slots.lock().len()
    }
}

/// A caller's hold on a slot. Dropping it, on completion or cancellation,
/// removes the slot once it is resolved or no other caller holds it.
///
/// Slot handles are only cloned and released under the table lock, so the
/// reference count seen there is exact.
struct SlotGuard<'a, K, V>
where
    K: Eq + Hash,
{
    slots: &'a Mutex<HashMap<K, Arc<OnceCell<V>>>>,
    key: K,
    slot: Arc<OnceCell<V>>,
}

impl<K, V> Drop for SlotGuard<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        let slot = std::mem::take(&mut self.slot);

        let ours = slots
            .get(&self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &slot));
        // The table holds one handle and we hold the other
        if ours && (slot.initialized() || Arc::strong_count(&slot) == 2) {
            slots.remove(&self.key);
        }

        drop(slot);
        drop(slots);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;

    #[tokio::test]
    async fn concurrent_callers_share_one_resolution() {
        let coalescer: Coalescer<&str, usize> = Coalescer::new();
        let calls = AtomicUsize::new(0);

        let results = join_all((0..10).map(|_| {
            coalescer.run("EGLL", || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                calls.fetch_add(1, Ordering::SeqCst) + 1
            })
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|&r| r == 1));
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn different_keys_resolve_independently() {
        let coalescer: Coalescer<&str, String> = Coalescer::new();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            coalescer.run("EGLL", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                "EGLL".to_string()
            }),
            coalescer.run("EGKK", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                "EGKK".to_string()
            }),
        );

        assert_eq!(a, "EGLL");
        assert_eq!(b, "EGKK");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sequential_callers_resolve_again() {
        let coalescer: Coalescer<&str, usize> = Coalescer::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            coalescer
                .run("EGLL", || async { calls.fetch_add(1, Ordering::SeqCst) })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_are_shared_too() {
        let coalescer: Coalescer<&str, Result<String, String>> = Coalescer::new();

        let results = join_all((0..4).map(|_| {
            coalescer.run("ZZZZ", || async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err("not found".to_string())
            })
        }))
        .await;

        assert!(results.iter().all(|r| r == &Err("not found".to_string())));
    }

    #[tokio::test]
    async fn cancelled_driver_is_taken_over() {
        let coalescer: Coalescer<&str, &str> = Coalescer::new();

        let driver = coalescer.run("EGLL", || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            "never"
        });
        // Poll the driver briefly, then drop it mid-resolution
        let _ = tokio::time::timeout(Duration::from_millis(10), driver).await;

        let value = coalescer.run("EGLL", || async { "fresh" }).await;
        assert_eq!(value, "fresh");
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn abandoned_driver_releases_its_slot() {
        let coalescer: Coalescer<&str, &str> = Coalescer::new();

        let driver = coalescer.run("EGLL", || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            "never"
        });
        let _ = tokio::time::timeout(Duration::from_millis(10), driver).await;

        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn abandoned_drivers_do_not_accumulate() {
        let coalescer: Coalescer<u32, u32> = Coalescer::new();

        for key in 0..100 {
            let driver = coalescer.run(key, || async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                key
            });
            let _ = tokio::time::timeout(Duration::from_millis(1), driver).await;
        }

        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn abandoned_waiter_leaves_driver_in_flight() {
        let coalescer: Coalescer<&str, &str> = Coalescer::new();

        let driver = coalescer.run("EGLL", || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            "resolved"
        });
        let waiter = async {
            let joined = coalescer.run("EGLL", || async { "unused" });
            let _ = tokio::time::timeout(Duration::from_millis(10), joined).await;
            coalescer.in_flight()
        };

        let (value, in_flight_after_waiter_left) = tokio::join!(driver, waiter);

        assert_eq!(value, "resolved");
        assert_eq!(in_flight_after_waiter_left, 1);
        assert_eq!(coalescer.in_flight(), 0);
    }
}
