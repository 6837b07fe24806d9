//! Client-level error types shared by the refresher, throttle, and request executor.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token exchange failed or no usable access token exists.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local request budget or remote throttling prevented the fetch.
	#[error(transparent)]
	RateLimited(#[from] RateLimitError),
	/// Fetch failed after exhausting the retry budget.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Subreddit name could not be validated.
	#[error(transparent)]
	Subreddit(#[from] crate::subreddit::SubredditNameError),
}
impl Error {
	/// Returns `true` for both local and remote rate-limit failures.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Self::RateLimited(_))
	}

	/// Suggested wait before retrying, when the failure carries one.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::RateLimited(RateLimitError::Local { retry_after }) => Some(*retry_after),
			_ => None,
		}
	}
}

/// Token lifecycle failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the refresh exchange with HTTP {status}.")]
	TokenEndpoint {
		/// HTTP status code returned by the token endpoint.
		status: u16,
	},
	/// Token endpoint responded with a body that lacks a usable `access_token`.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint returned an empty `access_token`.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
	/// Neither configuration nor a refresh produced an access token.
	#[error("No access token is available for the request.")]
	MissingAccessToken,
	/// Token exchange failed in transit.
	#[error("Token exchange failed before the endpoint responded.")]
	Transport(#[source] TransportError),
}

/// Rate-limit failures; callers should not retry immediately.
#[derive(Debug, ThisError)]
pub enum RateLimitError {
	/// Local sliding-window budget is exhausted; no request left the process.
	#[error(
		"Rate limit exceeded. Please wait {:.1} seconds before making another request.",
		.retry_after.as_secs_f64()
	)]
	Local {
		/// Suggested wait before the window frees up.
		retry_after: Duration,
	},
	/// Remote service kept answering 429 until the retry budget ran out.
	#[error("Rate limit exceeded after {attempts} attempts.")]
	Remote {
		/// Attempts consumed before giving up.
		attempts: u32,
	},
}

/// Generic fetch failure surfaced once the retry budget is spent.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// Every attempt failed; `source` carries the last attempt's failure.
	#[error("Failed to fetch the listing after {attempts} attempts.")]
	Exhausted {
		/// Attempts consumed before giving up.
		attempts: u32,
		/// Failure observed on the final attempt.
		#[source]
		source: Option<AttemptError>,
	},
}

/// Failure of a single physical attempt inside the retry loop.
#[derive(Debug, ThisError)]
pub enum AttemptError {
	/// Listing endpoint answered with a non-success, non-429 status.
	#[error("Listing endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body did not match the listing schema.
	#[error("Listing payload could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// A configured URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Configuration field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL cannot carry path segments.
	#[error("The {field} URL cannot be used as a base: {url}.")]
	CannotBeBase {
		/// Configuration field holding the URL.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A required field is missing or empty.
	#[error("The {field} setting must not be empty.")]
	MissingField {
		/// Configuration field name.
		field: &'static str,
	},
	/// Retry policy allows no attempts.
	#[error("Retry policy must allow at least one attempt.")]
	NoAttempts,
	/// Throttle settings cannot admit any request.
	#[error("Throttle settings are invalid: {reason}.")]
	InvalidThrottle {
		/// Human-readable validation failure.
		reason: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client gave up waiting for the server.
	#[error("Request timed out before the server responded.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns `true` when the transport timed out.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn local_rate_limit_reports_wait_and_classifies() {
		let err = Error::from(RateLimitError::Local { retry_after: Duration::from_secs(12) });

		assert!(err.is_rate_limited());
		assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
		assert!(err.to_string().contains("12.0 seconds"));
	}

	#[test]
	fn exhausted_fetch_hides_details_but_keeps_source() {
		let err = Error::from(FetchError::Exhausted {
			attempts: 5,
			source: Some(AttemptError::Status { status: 503 }),
		});

		assert!(!err.is_rate_limited());
		assert_eq!(err.to_string(), "Failed to fetch the listing after 5 attempts.");

		let source =
			StdError::source(&err).expect("Exhausted fetch should expose the last attempt error.");

		assert_eq!(source.to_string(), "Listing endpoint responded with HTTP 503.");
	}
}
