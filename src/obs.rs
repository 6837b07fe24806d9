//! Optional observability helpers for refreshes and fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `subreddit_stats.op` with the `op` and
//!   `stage` (call site) fields, plus events for rate-limit headers and failed attempts.
//! - Enable `metrics` to increment the `subreddit_stats_op_total` counter for every
//!   attempt/success/failure/throttled outcome, labeled by `op` + `outcome`.

mod events;
mod metrics;
mod tracing;

pub(crate) use events::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Refresh-token exchange.
	Refresh,
	/// Listing fetch, including its retry loop.
	Fetch,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Refresh => "refresh",
			OpKind::Fetch => "fetch",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Rejected by a local or remote rate limit.
	Throttled,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Throttled => "throttled",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
