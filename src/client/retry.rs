//! Attempt budget and exponential backoff for listing fetches.

// self
use crate::{_prelude::*, error::ConfigError};

/// Retry budget applied to each logical fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
	/// Physical attempts allowed per fetch, including the first.
	pub max_attempts: u32,
	/// Delay before the second attempt in milliseconds; doubles after every wait.
	pub initial_backoff_ms: u64,
}
impl RetryPolicy {
	/// Default attempt budget.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
	/// Default initial backoff in milliseconds.
	pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;

	/// Creates a policy with the provided budget and initial delay.
	pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
		Self {
			max_attempts,
			initial_backoff_ms: u64::try_from(initial_backoff.as_millis()).unwrap_or(u64::MAX),
		}
	}

	/// Returns the delay before the second attempt.
	pub fn initial_backoff(&self) -> Duration {
		Duration::from_millis(self.initial_backoff_ms)
	}

	/// Starts a fresh backoff sequence for one fetch.
	pub fn backoff(&self) -> Backoff {
		Backoff { next: self.initial_backoff() }
	}

	/// Rejects policies that allow no attempt at all.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_attempts == 0 {
			return Err(ConfigError::NoAttempts);
		}

		Ok(())
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
			initial_backoff_ms: Self::DEFAULT_INITIAL_BACKOFF_MS,
		}
	}
}

/// Doubling delay sequence scoped to a single fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backoff {
	next: Duration,
}
impl Backoff {
	/// Returns the delay that the next wait would use without advancing.
	pub fn peek(&self) -> Duration {
		self.next
	}

	/// Returns the current delay and doubles it for the following wait.
	pub fn advance(&mut self) -> Duration {
		let current = self.next;

		self.next = current.saturating_mul(2);

		current
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn backoff_doubles_from_initial_delay() {
		let mut backoff = RetryPolicy::default().backoff();
		let delays = (0..4).map(|_| backoff.advance().as_millis()).collect::<Vec<_>>();

		assert_eq!(delays, [1_000, 2_000, 4_000, 8_000]);
		assert_eq!(backoff.peek(), Duration::from_millis(16_000));
	}

	#[test]
	fn zero_attempts_are_rejected() {
		assert!(matches!(
			RetryPolicy::new(0, Duration::from_millis(10)).validate(),
			Err(ConfigError::NoAttempts)
		));
		assert!(RetryPolicy::default().validate().is_ok());
	}

	#[test]
	fn oversized_initial_backoff_saturates() {
		let policy = RetryPolicy::new(2, Duration::MAX);

		assert_eq!(policy.initial_backoff_ms, u64::MAX);
		assert_eq!(policy.initial_backoff(), Duration::from_millis(u64::MAX));
	}

	#[test]
	fn missing_fields_use_defaults() {
		let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts":3}"#)
			.expect("Partial retry policy should deserialize.");

		assert_eq!(policy.max_attempts, 3);
		assert_eq!(policy.initial_backoff(), Duration::from_secs(1));
	}
}
