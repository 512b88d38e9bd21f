// src/core/budget.rs — Process-wide concurrency budget: rate limiter + permit pool
//
// Both limits are acquired before a text's analysis starts. The permit is
// released when the returned guard drops, whichever way the analysis ends.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::infra::errors::AnalysisError;

/// Sliding-window limiter: at most `max_per_window` acquisitions in any
/// window of length `window`.
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        let max_per_window = max_per_window.max(1) as usize;
        Self {
            max_per_window,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_per_window)),
        }
    }

    pub fn per_second(max: u32) -> Self {
        Self::new(max, Duration::from_secs(1))
    }

    /// Wait until a slot is free in the current window, then take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();
                while let Some(&oldest) = admitted.front() {
                    if now.duration_since(oldest) >= self.window {
                        admitted.pop_front();
                    } else {
                        break;
                    }
                }
                if admitted.len() < self.max_per_window {
                    admitted.push_back(now);
                    return;
                }
                // Full window: sleep until the oldest admission ages out.
                match admitted.front() {
                    Some(&oldest) => (oldest + self.window).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };
            tokio::time::sleep(wait).await;
        }
    }
}

/// Shared handle over both limits. Cheap to clone.
#[derive(Clone)]
pub struct ConcurrencyBudget {
    permits: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    max_concurrent: usize,
}

/// Held for the lifetime of one analysis.
pub struct BudgetPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyBudget {
    pub fn new(rate_limit: u32, max_concurrent: usize) -> Self {
        Self::with_limiter(RateLimiter::per_second(rate_limit), max_concurrent)
    }

    pub fn with_limiter(limiter: RateLimiter, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            limiter: Arc::new(limiter),
            max_concurrent,
        }
    }

    /// Take one concurrency permit, then one rate-limiter slot.
    pub async fn acquire(&self) -> Result<BudgetPermit, AnalysisError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AnalysisError::BudgetClosed)?;
        self.limiter.acquire().await;
        Ok(BudgetPermit { _permit: permit })
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_limiter_admits_burst_up_to_limit() {
        let limiter = RateLimiter::per_second(3);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_rolling_window_under_concurrent_demand() {
        let limiter = Arc::new(RateLimiter::per_second(4));
        let admitted = Arc::new(std::sync::Mutex::new(Vec::new()));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = limiter.clone();
            let admitted = admitted.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                admitted.lock().unwrap().push(start.elapsed());
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let mut times = admitted.lock().unwrap().clone();
        times.sort();
        assert_eq!(times.len(), 20);
        for (i, t) in times.iter().enumerate() {
            let in_window = times[i..]
                .iter()
                .take_while(|u| **u < *t + Duration::from_secs(1))
                .count();
            assert!(in_window <= 4, "{in_window} admissions in window starting at {t:?}");
        }
    }

    #[tokio::test]
    async fn test_zero_limits_are_clamped() {
        let budget = ConcurrencyBudget::new(0, 0);
        assert_eq!(budget.max_concurrent(), 1);
        let permit = budget.acquire().await.unwrap();
        assert_eq!(budget.available(), 0);
        drop(permit);
        assert_eq!(budget.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permit_released_on_drop() {
        let budget = ConcurrencyBudget::new(100, 2);
        let a = budget.acquire().await.unwrap();
        let _b = budget.acquire().await.unwrap();
        assert_eq!(budget.available(), 0);

        let waiter = {
            let budget = budget.clone();
            tokio::spawn(async move { budget.acquire().await.map(|_| ()) })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(a);
        waiter.await.unwrap().unwrap();
    }
}
