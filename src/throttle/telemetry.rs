//! Last-observed remote rate-limit headers.

// crates.io
use ::http::HeaderMap;
// self
use crate::{_prelude::*, obs};

/// Header reporting how many requests were used in the current remote period.
pub const RATE_LIMIT_USED: &str = "x-ratelimit-used";
/// Header reporting how many requests remain in the current remote period.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Header reporting seconds until the remote period resets.
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Raw rate-limit header values from the most recent response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleStatus {
	/// Raw `X-Ratelimit-Used` value.
	#[serde(rename = "rateLimitUsed")]
	pub used: Option<String>,
	/// Raw `X-Ratelimit-Remaining` value.
	#[serde(rename = "rateLimitRemaining")]
	pub remaining: Option<String>,
	/// Raw `X-Ratelimit-Reset` value.
	#[serde(rename = "rateLimitReset")]
	pub reset: Option<String>,
}
impl ThrottleStatus {
	/// Extracts the rate-limit headers; missing or non-text headers read as `None`.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self {
			used: header_text(headers, RATE_LIMIT_USED),
			remaining: header_text(headers, RATE_LIMIT_REMAINING),
			reset: header_text(headers, RATE_LIMIT_RESET),
		}
	}
}

/// Shared, always-readable mirror of the remote rate-limit headers.
#[derive(Debug, Default)]
pub struct ThrottleTelemetry(RwLock<ThrottleStatus>);
impl ThrottleTelemetry {
	/// Replaces the stored status with the headers of a freshly received response.
	pub fn observe(&self, headers: &HeaderMap) -> ThrottleStatus {
		let status = ThrottleStatus::from_headers(headers);

		obs::log_throttle_status(&status);

		*self.0.write() = status.clone();

		status
	}

	/// Returns the status recorded from the most recent response.
	pub fn snapshot(&self) -> ThrottleStatus {
		self.0.read().clone()
	}
}

fn header_text(headers: &HeaderMap, name: &'static str) -> Option<String> {
	headers.get(name).and_then(|value| value.to_str().ok()).map(|value| value.trim().to_owned())
}
