// src/indexing/retry.rs
// =============================================================================
// Bounded exponential backoff as a plain state machine.
//
// Each entry goes through:
//
//   Attempting(1) --transient--> Attempting(2) --transient--> ... Attempting(max)
//        |                            |                               |
//        +--ok--> Submitted           +--ok--> Submitted              +--ok/any--> Submitted | Failed
//        +--rejected--> Failed        +--rejected--> Failed
//
// RetryPolicy::step only decides what happens next. It never sleeps and never
// calls the network, so it works the same for blocking or async callers.
// =============================================================================

use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls per entry, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every further attempt
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// What to do after an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Submitted,
    Retry { delay: Duration, next_attempt: u32 },
    Failed { reason: String },
}

impl RetryPolicy {
    /// No waiting between attempts. Handy for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Decides the transition out of `Attempting(attempt)` given its result.
    pub fn step<T>(&self, attempt: u32, result: &Result<T, ApiError>) -> Step {
        match result {
            Ok(_) => Step::Submitted,
            Err(e) if e.retryable && attempt < self.max_attempts.max(1) => Step::Retry {
                delay: self.delay_after(attempt),
                next_attempt: attempt + 1,
            },
            Err(e) if e.retryable => Step::Failed {
                reason: format!("{} (gave up after {} attempts)", e.message, attempt),
            },
            Err(e) => Step::Failed {
                reason: e.message.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> Result<(), ApiError> {
        Err(ApiError::retryable(Some(429), "Rate limit exceeded"))
    }

    #[test]
    fn test_success_is_terminal() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.step(1, &Ok::<(), ApiError>(())), Step::Submitted);
    }

    #[test]
    fn test_transient_errors_retry_until_exhausted() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.step(1, &transient()),
            Step::Retry {
                delay: Duration::from_secs(1),
                next_attempt: 2
            }
        );
        assert_eq!(
            policy.step(2, &transient()),
            Step::Retry {
                delay: Duration::from_secs(2),
                next_attempt: 3
            }
        );
        match policy.step(3, &transient()) {
            Step::Failed { reason } => {
                assert!(reason.contains("Rate limit exceeded"));
                assert!(reason.contains("3 attempts"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_rejection_fails_immediately() {
        let policy = RetryPolicy::default();
        let rejected: Result<(), ApiError> =
            Err(ApiError::rejected(Some(403), "Permission denied. Failed to verify the URL ownership."));
        assert_eq!(
            policy.step(1, &rejected),
            Step::Failed {
                reason: "Permission denied. Failed to verify the URL ownership.".to_string()
            }
        );
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(4));
        assert_eq!(policy.delay_after(2), Duration::from_secs(8));
        assert_eq!(policy.delay_after(3), Duration::from_secs(10));
        assert_eq!(policy.delay_after(40), Duration::from_secs(10));
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::immediate(1);
        assert!(matches!(policy.step(1, &transient()), Step::Failed { .. }));
    }
}
