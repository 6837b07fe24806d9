//! Refresh-token exchange with freshness checks, lock-free network calls, and metrics.
//!
//! [`TokenRefresher::ensure_fresh`] reads the stored credential once to decide whether a
//! refresh is due, performs the `grant_type=refresh_token` exchange with no lock held, and
//! applies the new access token in one write section. Concurrent callers may each run an
//! exchange; the store keeps whichever exchange started last.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use ::http::{
	Method, Request,
	header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	auth::{AppIdentity, CredentialStore, RefreshCheck, SkipReason, TokenSecret},
	error::{AuthError, ConfigError},
	http::{self, HttpRequest, HttpTransport, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Default age after which the access token is refreshed.
pub const DEFAULT_REFRESH_INTERVAL: time::Duration = time::Duration::minutes(60);

/// What [`TokenRefresher::ensure_fresh`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// No exchange was needed.
	Skipped(SkipReason),
	/// An exchange ran and its tokens were applied.
	Refreshed,
	/// An exchange ran but a newer refresh had already been applied.
	Superseded,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
}

/// Performs refresh-token exchanges against the configured token endpoint.
pub struct TokenRefresher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for the exchange.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors.
	pub transport_mapper: Arc<M>,
	/// Client credentials, token endpoint, and user agent.
	pub identity: AppIdentity,
	/// Age after which the access token is refreshed.
	pub refresh_interval: time::Duration,
	/// Shared counters for checks and exchanges.
	pub metrics: Arc<RefreshMetrics>,
}
impl<C, M> TokenRefresher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a refresher using the default 60-minute refresh interval.
	pub fn new(
		identity: AppIdentity,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			identity,
			refresh_interval: DEFAULT_REFRESH_INTERVAL,
			metrics: Default::default(),
		}
	}

	/// Overrides the refresh interval.
	pub fn with_refresh_interval(mut self, interval: time::Duration) -> Self {
		self.refresh_interval = interval;

		self
	}

	/// Refreshes the access token in `credentials` when a refresh is due.
	///
	/// Failures surface as [`AuthError`] without retrying; the next fetch calls this again.
	pub async fn ensure_fresh(&self, credentials: &CredentialStore) -> Result<RefreshOutcome> {
		const KIND: OpKind = OpKind::Refresh;

		self.metrics.record_check();

		let started_at = OffsetDateTime::now_utc();
		let refresh_token = match credentials.refresh_check(started_at, self.refresh_interval) {
			RefreshCheck::Due(token) => token,
			RefreshCheck::Skip(reason) => return Ok(RefreshOutcome::Skipped(reason)),
		};
		let span = OpSpan::new(KIND, "ensure_fresh");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.metrics.record_exchange();

		let result = span.instrument(self.exchange(&refresh_token)).await;

		match result {
			Ok(response) => {
				let access_token = TokenSecret::non_empty(response.access_token)
					.ok_or(AuthError::EmptyAccessToken)
					.inspect_err(|_| {
						self.metrics.record_failure();
						obs::record_op_outcome(KIND, OpOutcome::Failure);
					})?;
				let rotated = response.refresh_token.and_then(TokenSecret::non_empty);
				let applied = credentials.apply_refresh(
					access_token,
					rotated,
					started_at,
					OffsetDateTime::now_utc(),
				);

				self.metrics.record_success();
				obs::record_op_outcome(KIND, OpOutcome::Success);

				Ok(if applied { RefreshOutcome::Refreshed } else { RefreshOutcome::Superseded })
			},
			Err(err) => {
				self.metrics.record_failure();
				obs::record_op_outcome(KIND, OpOutcome::Failure);
				obs::log_attempt_failure(KIND, 1, &err);

				Err(err)
			},
		}
	}

	async fn exchange(&self, refresh_token: &TokenSecret) -> Result<TokenResponse> {
		let request = self.build_request(refresh_token)?;
		let response = self.http_client.send(request).await.map_err(|err| {
			AuthError::Transport(self.transport_mapper.map_transport_error(err))
		})?;
		let status = response.status();

		if !status.is_success() {
			return Err(AuthError::TokenEndpoint { status: status.as_u16() }.into());
		}

		http::decode_json::<TokenResponse>(response.body()).map_err(|source| {
			AuthError::TokenResponseParse { source, status: status.as_u16() }.into()
		})
	}

	fn build_request(&self, refresh_token: &TokenSecret) -> Result<HttpRequest> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", "refresh_token")
			.append_pair("refresh_token", refresh_token.expose())
			.finish();
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.identity.token_url.as_str())
			.header(AUTHORIZATION, self.identity.basic_authorization())
			.header(USER_AGENT, self.identity.user_agent.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(body.into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}
impl<C, M> Clone for TokenRefresher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			identity: self.identity.clone(),
			refresh_interval: self.refresh_interval,
			metrics: self.metrics.clone(),
		}
	}
}
impl<C, M> Debug for TokenRefresher<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRefresher")
			.field("client_id", &self.identity.client_id)
			.field("token_url", &self.identity.token_url.as_str())
			.field("refresh_interval", &self.refresh_interval)
			.finish()
	}
}
