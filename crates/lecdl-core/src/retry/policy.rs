use std::time::Duration;

/// Why a fetch failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tool or the remote did not answer in time.
    Timeout,
    /// Rate limited (429, 503, "too many requests").
    Throttled,
    /// DNS, refused or reset connections.
    Connection,
    /// Server-side error other than throttling.
    Http5xx(u16),
    /// Bad URL, 4xx, missing artifact, tool misconfiguration.
    Other,
}

impl ErrorKind {
    /// Transient kinds are retried; `Other` fails the task at once.
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Bounded exponential backoff around a single Fetcher call.
///
/// Attempt `n` (1-based) that fails transiently waits
/// `base_delay * 2^(n-1)`, capped at `max_delay`, unless it was the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        // Shift is clamped so large attempt numbers cannot overflow.
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(p: &RetryPolicy, attempt: u32, kind: ErrorKind) -> Duration {
        match p.decide(attempt, kind) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected a retry at attempt {attempt}"),
        }
    }

    #[test]
    fn permanent_kind_is_never_retried() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
        assert!(!ErrorKind::Other.is_transient());
        assert!(ErrorKind::Http5xx(502).is_transient());
    }

    #[test]
    fn default_backoff_doubles_from_one_second_up_to_ten() {
        let p = RetryPolicy {
            max_attempts: 10,
            ..RetryPolicy::default()
        };
        let secs: Vec<u64> = (1..=5)
            .map(|a| delay(&p, a, ErrorKind::Connection).as_secs())
            .collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 10]);
    }

    #[test]
    fn huge_attempt_numbers_stay_capped() {
        let p = RetryPolicy {
            max_attempts: u32::MAX,
            ..RetryPolicy::default()
        };
        assert_eq!(delay(&p, 1_000, ErrorKind::Timeout), p.max_delay);
    }

    #[test]
    fn last_attempt_is_not_followed_by_a_retry() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(2, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Throttled), RetryDecision::NoRetry);
        assert_eq!(
            RetryPolicy::no_retry().decide(1, ErrorKind::Timeout),
            RetryDecision::NoRetry
        );
    }
}
