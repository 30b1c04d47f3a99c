use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AppError, FailureClass};

pub type RetryPredicate = Arc<dyn Fn(&AppError) -> bool + Send + Sync>;
pub type RetryHook = Arc<dyn Fn(u32, &AppError) + Send + Sync>;

/// Per-call retry configuration. Constructed at the call site, consumed by
/// one [`retry_operation`] invocation, then discarded; it carries no state
/// across calls.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    context: Option<String>,
    should_retry: RetryPredicate,
    on_retry: Option<RetryHook>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            context: None,
            should_retry: Arc::new(default_should_retry),
            on_retry: None,
        }
    }

    /// Logical operation name stamped onto the propagated error when the
    /// error does not already carry one.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_predicate<F>(mut self, should_retry: F) -> Self
    where
        F: Fn(&AppError) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(should_retry);
        self
    }

    /// The sole side channel of the executor; fired once before each
    /// re-attempt with the zero-based attempt number that just failed.
    pub fn with_on_retry<F>(mut self, on_retry: F) -> Self
    where
        F: Fn(u32, &AppError) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(on_retry));
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Linear backoff: base delay scaled by the number of attempts made.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(attempt.saturating_add(1))
    }

    fn annotate(&self, mut err: AppError) -> AppError {
        if err.context.is_none() {
            err.context = self.context.clone();
        }
        err
    }
}

/// Default predicate: only failures where no response was received, or
/// where the server answered 5xx, are retry-eligible. Validation failures
/// and 4xx business failures terminate immediately.
pub fn default_should_retry(err: &AppError) -> bool {
    matches!(err.class(), FailureClass::Network | FailureClass::Server)
}

/// Run `operation` until it succeeds, the policy's predicate rejects the
/// failure, or `max_retries` re-attempts have been spent. Success returns
/// immediately with no delay; the final failure is propagated annotated
/// with the policy's context.
pub async fn retry_operation<T, F, Fut>(mut operation: F, policy: &RetryPolicy) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_retries || !(policy.should_retry)(&err) {
                    return Err(policy.annotate(err));
                }
                if let Some(hook) = &policy.on_retry {
                    hook(attempt, &err);
                }
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
        }
    }
}
