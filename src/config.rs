//! Client configuration, builder, and validation.
//!
//! [`ClientConfig`] is plain data so it can be deserialized from whatever source the host
//! application uses; [`ClientConfig::validate`] turns it into parsed [`Endpoints`] and is run
//! by every client constructor.

// self
use crate::{
	_prelude::*,
	auth::{AppIdentity, Credential, DEFAULT_REFRESH_INTERVAL, TokenSecret},
	client::RetryPolicy,
	error::ConfigError,
	throttle::ThrottleConfig,
};

/// Settings for one [`RedditClient`](crate::client::RedditClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// OAuth 2.0 client identifier.
	pub app_id: String,
	/// OAuth 2.0 client secret.
	pub app_secret: TokenSecret,
	/// Token endpoint accepting `grant_type=refresh_token`.
	pub token_url: String,
	/// Listing base URL; the subreddit name is appended to it.
	pub base_url: String,
	/// `User-Agent` header sent with every request.
	pub user_agent: String,
	/// Refresh token; without one the access token is used as-is.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Initial access token.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Instant the initial access token was obtained, if known.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub last_refresh: Option<OffsetDateTime>,
	/// Seconds after which the access token is refreshed.
	#[serde(default = "default_refresh_interval_secs")]
	pub refresh_interval_secs: u64,
	/// Retry budget applied to each fetch.
	#[serde(default)]
	pub retry: RetryPolicy,
	/// Local sliding-window request budget.
	#[serde(default)]
	pub throttle: ThrottleConfig,
}
impl ClientConfig {
	/// Starts a builder from the required identity and endpoint settings.
	pub fn builder(
		app_id: impl Into<String>,
		app_secret: impl Into<String>,
		token_url: impl Into<String>,
		base_url: impl Into<String>,
		user_agent: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(Self {
			app_id: app_id.into(),
			app_secret: TokenSecret::new(app_secret),
			token_url: token_url.into(),
			base_url: base_url.into(),
			user_agent: user_agent.into(),
			refresh_token: None,
			access_token: None,
			last_refresh: None,
			refresh_interval_secs: default_refresh_interval_secs(),
			retry: RetryPolicy::default(),
			throttle: ThrottleConfig::default(),
		})
	}

	/// Returns the refresh interval.
	pub fn refresh_interval(&self) -> time::Duration {
		time::Duration::seconds(i64::try_from(self.refresh_interval_secs).unwrap_or(i64::MAX))
	}

	/// Validates every setting and returns the parsed endpoints.
	pub fn validate(&self) -> Result<Endpoints, ConfigError> {
		require("app_id", &self.app_id)?;
		require("app_secret", self.app_secret.expose())?;
		require("user_agent", &self.user_agent)?;
		require("token_url", &self.token_url)?;
		require("base_url", &self.base_url)?;

		let token_url = parse_url("token_url", &self.token_url)?;
		let mut base_url = parse_url("base_url", &self.base_url)?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase { field: "base_url", url: base_url.into() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		self.retry.validate()?;
		self.throttle.validate()?;

		Ok(Endpoints { token_url, base_url })
	}

	/// Returns the identity presented to the token endpoint.
	pub fn identity(&self, token_url: Url) -> AppIdentity {
		AppIdentity {
			client_id: self.app_id.clone(),
			client_secret: self.app_secret.clone(),
			token_url,
			user_agent: self.user_agent.clone(),
		}
	}

	/// Returns the initial credential; blank tokens count as absent.
	pub fn credential(&self) -> Credential {
		Credential {
			access_token: self.access_token.clone().filter(|secret| !secret.is_blank()),
			refresh_token: self.refresh_token.clone().filter(|secret| !secret.is_blank()),
			last_refresh: self.last_refresh,
		}
	}
}

/// Parsed endpoints produced by [`ClientConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// Token endpoint.
	pub token_url: Url,
	/// Listing base URL, always ending in `/`.
	pub base_url: Url,
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	config: ClientConfig,
}
impl ClientConfigBuilder {
	fn new(config: ClientConfig) -> Self {
		Self { config }
	}

	/// Sets the refresh token.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.config.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the initial access token.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.config.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Records when the initial access token was obtained.
	pub fn last_refresh(mut self, instant: OffsetDateTime) -> Self {
		self.config.last_refresh = Some(instant);

		self
	}

	/// Overrides the refresh interval.
	pub fn refresh_interval(mut self, interval: Duration) -> Self {
		self.config.refresh_interval_secs = interval.as_secs();

		self
	}

	/// Overrides the retry policy.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.config.retry = retry;

		self
	}

	/// Overrides the local request budget.
	pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
		self.config.throttle = throttle;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn default_refresh_interval_secs() -> u64 {
	DEFAULT_REFRESH_INTERVAL.whole_seconds().unsigned_abs()
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { field }) } else { Ok(()) }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> ClientConfigBuilder {
		ClientConfig::builder(
			"app-id",
			"app-secret",
			"https://www.example.com/api/v1/access_token",
			"https://oauth.example.com/r",
			"subreddit-stats/0.1",
		)
	}

	#[test]
	fn base_url_gains_trailing_slash() {
		let config = builder().build().expect("Builder fixture should validate.");
		let endpoints = config.validate().expect("Validated config should resolve endpoints.");

		assert_eq!(endpoints.base_url.as_str(), "https://oauth.example.com/r/");
		assert_eq!(config.refresh_interval(), time::Duration::minutes(60));
	}

	#[test]
	fn missing_identity_fields_are_rejected() {
		let err = ClientConfig::builder("", "secret", "https://a.example", "https://b.example", "ua")
			.build()
			.expect_err("Empty app id should fail validation.");

		assert!(matches!(err, ConfigError::MissingField { field: "app_id" }));

		let err = builder()
			.retry(RetryPolicy::new(0, Duration::from_millis(1)))
			.build()
			.expect_err("Zero attempts should fail validation.");

		assert!(matches!(err, ConfigError::NoAttempts));
	}

	#[test]
	fn oversized_throttle_window_is_rejected() {
		let err = builder()
			.throttle(ThrottleConfig { window_secs: u64::MAX, cap: 1 })
			.build()
			.expect_err("A window longer than a day should fail validation.");

		assert!(matches!(err, ConfigError::InvalidThrottle { .. }));
	}

	#[test]
	fn invalid_urls_are_rejected() {
		let err = ClientConfig::builder("id", "secret", "not a url", "https://b.example/", "ua")
			.build()
			.expect_err("Unparseable token URL should fail validation.");

		assert!(matches!(err, ConfigError::InvalidUrl { field: "token_url", .. }));

		let err = ClientConfig::builder("id", "secret", "https://a.example", "mailto:x@y.z", "ua")
			.build()
			.expect_err("Non-base URL should fail validation.");

		assert!(matches!(err, ConfigError::CannotBeBase { field: "base_url", .. }));
	}

	#[test]
	fn deserializes_with_defaults_and_blank_tokens() {
		let config: ClientConfig = serde_json::from_value(serde_json::json!({
			"app_id": "id",
			"app_secret": "secret",
			"token_url": "https://www.example.com/api/v1/access_token",
			"base_url": "https://oauth.example.com/r/",
			"user_agent": "ua",
			"refresh_token": "",
			"access_token": "access-1",
			"last_refresh": "2025-11-10T12:00:00Z",
		}))
		.expect("Config JSON should deserialize.");

		assert_eq!(config.retry, RetryPolicy::default());
		assert_eq!(config.throttle, ThrottleConfig::default());
		assert_eq!(config.refresh_interval_secs, 3_600);

		let credential = config.credential();

		assert_eq!(credential.refresh_token, None);
		assert_eq!(credential.access_token, Some(TokenSecret::new("access-1")));
		assert!(credential.last_refresh.is_some());
	}
}
