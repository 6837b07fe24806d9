//! Sliding-window request budget shared by every concurrent fetch.

// crates.io
use tokio::time::Instant;
// self
use crate::{_prelude::*, error::ConfigError};

/// Window and cap applied by [`RequestThrottle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
	/// Window length in seconds.
	pub window_secs: u64,
	/// Count at which requests inside one window are rejected.
	pub cap: u32,
}
impl ThrottleConfig {
	/// Default window length.
	pub const DEFAULT_WINDOW_SECS: u64 = 60;
	/// Default request cap per window.
	pub const DEFAULT_CAP: u32 = 100;
	/// Longest accepted window (one day).
	pub const MAX_WINDOW_SECS: u64 = 86_400;

	/// Returns the window length, clamped to [`Self::MAX_WINDOW_SECS`].
	pub fn window(&self) -> Duration {
		Duration::from_secs(self.window_secs.min(Self::MAX_WINDOW_SECS))
	}

	/// Rejects settings that cannot admit any request or whose window is out of range.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.window_secs == 0 {
			return Err(ConfigError::InvalidThrottle { reason: "window must be positive" });
		}
		if self.window_secs > Self::MAX_WINDOW_SECS {
			return Err(ConfigError::InvalidThrottle { reason: "window must not exceed one day" });
		}
		if self.cap == 0 {
			return Err(ConfigError::InvalidThrottle { reason: "cap must be at least one" });
		}

		Ok(())
	}
}
impl Default for ThrottleConfig {
	fn default() -> Self {
		Self { window_secs: Self::DEFAULT_WINDOW_SECS, cap: Self::DEFAULT_CAP }
	}
}

/// Result emitted by [`RequestThrottle::admit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThrottleDecision {
	/// The request may proceed immediately.
	Allow,
	/// The request must not be sent; retry later.
	Reject(RetryDirective),
}
impl ThrottleDecision {
	/// Returns `true` for [`ThrottleDecision::Allow`].
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allow)
	}
}

/// Advises callers when to retry after a [`ThrottleDecision::Reject`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant when it is safe to retry.
	pub earliest_retry_at: Instant,
	/// Suggested wait duration.
	pub retry_after: Duration,
}
impl RetryDirective {
	/// Creates a new directive relative to `now`.
	///
	/// `earliest_retry_at` falls back to `now` when the sum is not representable.
	pub fn new(now: Instant, retry_after: Duration) -> Self {
		Self { earliest_retry_at: now.checked_add(retry_after).unwrap_or(now), retry_after }
	}
}

#[derive(Debug, Default)]
struct WindowState {
	window_start: Option<Instant>,
	count: u32,
}

/// Process-wide sliding-window counter.
///
/// Each [`admit`](Self::admit) call is a single critical section: when the window has
/// elapsed the counter restarts at one, otherwise it increments and rejects once it reaches
/// the cap. Rejected calls keep their slot, so the count never decreases inside a window.
#[derive(Debug, Default)]
pub struct RequestThrottle {
	config: ThrottleConfig,
	state: Mutex<WindowState>,
}
impl RequestThrottle {
	/// Creates a throttle with the provided window and cap.
	pub fn new(config: ThrottleConfig) -> Self {
		Self { config, state: Default::default() }
	}

	/// Returns the active configuration.
	pub fn config(&self) -> ThrottleConfig {
		self.config
	}

	/// Returns the number of requests counted in the current window.
	pub fn count(&self) -> u32 {
		self.state.lock().count
	}

	/// Evaluates the budget at the current instant.
	pub fn admit(&self) -> ThrottleDecision {
		self.admit_at(Instant::now())
	}

	/// Evaluates the budget at `now`.
	pub fn admit_at(&self, now: Instant) -> ThrottleDecision {
		let window = self.config.window();
		let mut state = self.state.lock();
		let elapsed = match state.window_start {
			Some(start) if now.saturating_duration_since(start) < window =>
				now.saturating_duration_since(start),
			_ => {
				state.window_start = Some(now);
				state.count = 1;

				return ThrottleDecision::Allow;
			},
		};

		state.count = state.count.saturating_add(1);

		if state.count >= self.config.cap {
			let retry_after =
				window.saturating_sub(elapsed).saturating_add(Duration::from_secs(1));

			return ThrottleDecision::Reject(RetryDirective::new(now, retry_after));
		}

		ThrottleDecision::Allow
	}
}
