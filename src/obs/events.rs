// self
use crate::{_prelude::*, obs::OpKind, throttle::ThrottleStatus};

/// Logs the rate-limit headers observed on the latest response.
pub(crate) fn log_throttle_status(status: &ThrottleStatus) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			used = status.used.as_deref().unwrap_or_default(),
			remaining = status.remaining.as_deref().unwrap_or_default(),
			reset = status.reset.as_deref().unwrap_or_default(),
			"Observed remote rate-limit headers."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = status;
	}
}

/// Logs a failed attempt that the retry loop will handle.
pub(crate) fn log_attempt_failure(kind: OpKind, attempt: u32, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = kind.as_str(), attempt, error = %error, "Attempt failed.");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, attempt, error);
	}
}

/// Logs a remote 429 and the delay before the next attempt.
pub(crate) fn log_remote_throttle(attempt: u32, delay: Duration, from_header: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(
			attempt,
			delay_ms = delay.as_millis() as u64,
			from_header,
			"Rate limited by the remote API; retrying after delay."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, delay, from_header);
	}
}

/// Logs a local budget rejection.
pub(crate) fn log_local_throttle(retry_after: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			retry_after_ms = retry_after.as_millis() as u64,
			"Local request budget exhausted."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = retry_after;
	}
}

/// Logs a report failure before it is collapsed into a generic response.
pub(crate) fn log_report_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(
			error = %error,
			rate_limited = error.is_rate_limited(),
			"Subreddit report failed."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
