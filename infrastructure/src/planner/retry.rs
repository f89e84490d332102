use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use docent_application::ports::planner::PlannerError;
use tracing::warn;

/// Backoff settings for planner requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: usize,
    pub min_delay: Duration,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(500),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Run `operation`, retrying transport faults and timeouts with jittered
/// exponential backoff. Rejections and malformed responses fail immediately.
pub async fn retry_planner_call<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, PlannerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlannerError>>,
{
    let strategy = ExponentialBuilder::default()
        .with_min_delay(policy.min_delay)
        .with_factor(policy.factor)
        .with_max_times(policy.max_retries)
        .with_jitter();

    operation
        .retry(strategy)
        .when(PlannerError::is_retryable)
        .notify(|err: &PlannerError, delay: Duration| {
            warn!(error = %err, delay_ms = delay.as_millis() as u64, "Retrying planner request");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            min_delay: Duration::from_millis(1),
            factor: 1.0,
        }
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result = retry_planner_call(&fast(3), || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(PlannerError::Transport("connection reset".into()))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rejections_are_not_retried() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<(), _> = retry_planner_call(&fast(3), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(PlannerError::Rejected {
                status: 401,
                body: "invalid key".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(PlannerError::Rejected { status: 401, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<(), _> = retry_planner_call(&fast(2), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(PlannerError::Timeout)
        })
        .await;

        assert_eq!(result, Err(PlannerError::Timeout));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
