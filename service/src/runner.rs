//! Per-user task gating for batch runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

use idsync_types::UserId;

/// Per-user lock for parallel sync passes.
/// Work for different users runs concurrently up to a global limit.
/// Work for the same user is serialized, so a pass always retires the old
/// pending diff before the next pass can stage a new one.
pub struct UserTaskRunner {
    /// Per-user mutexes
    user_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    /// Maximum concurrent tasks
    max_concurrent: usize,
    /// Semaphore for limiting total concurrency
    semaphore: Arc<Semaphore>,
}

impl UserTaskRunner {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            user_locks: Arc::new(Mutex::new(HashMap::new())),
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Get or create the lock for a specific user.
    async fn get_user_lock(&self, user: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run a task with per-user serialization. Different users proceed in
    /// parallel, bounded by the global limit.
    pub async fn run<F, R>(&self, user: &UserId, task: F) -> R
    where
        F: Future<Output = R>,
    {
        let _global_permit = self
            .semaphore
            .acquire()
            .await
            .expect("runner semaphore is never closed");
        let lock = self.get_user_lock(user).await;
        let _user_guard = lock.lock().await;
        task.await
    }

    /// Returns the maximum concurrency limit.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of users with a lock entry right now.
    pub async fn tracked_users(&self) -> usize {
        self.user_locks.lock().await.len()
    }

    /// Drop lock entries for users no task currently holds.
    pub async fn cleanup(&self) {
        let mut locks = self.user_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn basic_run_returns_task_result() {
        let runner = UserTaskRunner::new(4);
        let result = runner.run(&UserId::new("u1"), async { 42 }).await;
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn different_users_run_in_parallel() {
        let runner = Arc::new(UserTaskRunner::new(4));

        let start = Instant::now();
        let mut handles = Vec::new();
        for i in 0..4 {
            let r = Arc::clone(&runner);
            handles.push(tokio::spawn(async move {
                let user = UserId::new(format!("user-{i}"));
                r.run(&user, async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    i
                })
                .await
            }));
        }

        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }

        let elapsed = start.elapsed();
        // All four should overlap, so total time stays near 50ms, not
        // 200ms. Allow generous margin.
        assert!(
            elapsed < Duration::from_millis(200),
            "expected parallel execution, took {elapsed:?}"
        );
        results.sort();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn same_user_is_serialized() {
        let runner = Arc::new(UserTaskRunner::new(4));
        let in_flight = Arc::new(AtomicU64::new(0));
        let overlap_seen = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let r = Arc::clone(&runner);
            let inf = Arc::clone(&in_flight);
            let overlap = Arc::clone(&overlap_seen);
            handles.push(tokio::spawn(async move {
                let user = UserId::new("same-user");
                r.run(&user, async move {
                    let current = inf.fetch_add(1, Ordering::SeqCst) + 1;
                    overlap.fetch_max(current, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    inf.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(overlap_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn semaphore_limits_concurrency() {
        let runner = Arc::new(UserTaskRunner::new(2));
        let in_flight = Arc::new(AtomicU64::new(0));
        let max_seen = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for i in 0..6 {
            let r = Arc::clone(&runner);
            let inf = Arc::clone(&in_flight);
            let ms = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let user = UserId::new(format!("user-{i}"));
                r.run(&user, async move {
                    let current = inf.fetch_add(1, Ordering::SeqCst) + 1;
                    ms.fetch_max(current, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    inf.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let observed_max = max_seen.load(Ordering::SeqCst);
        assert!(
            observed_max <= 2,
            "expected max concurrency 2, observed {observed_max}"
        );
    }

    #[tokio::test]
    async fn cleanup_removes_idle_locks() {
        let runner = UserTaskRunner::new(4);
        runner.run(&UserId::new("a"), async {}).await;
        runner.run(&UserId::new("b"), async {}).await;
        assert_eq!(runner.tracked_users().await, 2);

        runner.cleanup().await;
        assert_eq!(runner.tracked_users().await, 0);
    }

    #[tokio::test]
    async fn zero_limit_is_clamped_to_one() {
        let runner = UserTaskRunner::new(0);
        let result = runner.run(&UserId::new("u1"), async { "ran" }).await;
        assert_eq!(result, "ran");
    }
}
