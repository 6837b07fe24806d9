//! Request executor: throttle gate, authenticated send, telemetry, and the retry loop.
//!
//! One logical fetch consults the [`RequestThrottle`](crate::throttle::RequestThrottle) once
//! and then runs up to [`RetryPolicy::max_attempts`] physical attempts. Remote 429 responses
//! wait for `Retry-After` when the header is usable and for the current backoff otherwise;
//! every other failure waits for the backoff. Telemetry is refreshed from every response
//! before its status is inspected.

// crates.io
use ::http::{
	Method, Request, StatusCode,
	header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	client::{Listing, Post, RedditClient},
	error::{AttemptError, AuthError, ConfigError, FetchError, RateLimitError},
	http::{self, HttpRequest, HttpTransport, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
	throttle::ThrottleDecision,
};

const KIND: OpKind = OpKind::Fetch;

enum AttemptOutcome {
	Listing(Vec<Post>),
	Throttled { retry_after: Option<Duration> },
	Failed(AttemptError),
}

impl<C, M> RedditClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches `url` and returns the listing's children.
	///
	/// Fails with [`RateLimitError::Local`] without sending anything when the local budget is
	/// spent, [`RateLimitError::Remote`] when the final attempt is answered with 429, and
	/// [`FetchError::Exhausted`] when every attempt fails for another reason. A missing access
	/// token fails immediately with [`AuthError::MissingAccessToken`].
	pub async fn fetch_listing(&self, url: Url) -> Result<Vec<Post>> {
		if let ThrottleDecision::Reject(directive) = self.throttle.admit() {
			obs::log_local_throttle(directive.retry_after);
			obs::record_op_outcome(KIND, OpOutcome::Throttled);

			return Err(RateLimitError::Local { retry_after: directive.retry_after }.into());
		}

		let span = OpSpan::new(KIND, "fetch_listing");

		span.instrument(self.run_attempts(url)).await
	}

	async fn run_attempts(&self, url: Url) -> Result<Vec<Post>> {
		let attempts = self.retry.max_attempts;
		let mut backoff = self.retry.backoff();
		let mut last_error = None;

		for attempt in 1..=attempts {
			let final_attempt = attempt == attempts;

			obs::record_op_outcome(KIND, OpOutcome::Attempt);

			let delay = match self.attempt(&url).await? {
				AttemptOutcome::Listing(posts) => {
					obs::record_op_outcome(KIND, OpOutcome::Success);

					return Ok(posts);
				},
				AttemptOutcome::Throttled { .. } if final_attempt => {
					obs::record_op_outcome(KIND, OpOutcome::Throttled);

					return Err(RateLimitError::Remote { attempts }.into());
				},
				AttemptOutcome::Throttled { retry_after } => {
					let from_header = retry_after.is_some();
					let delay = retry_after.unwrap_or_else(|| backoff.advance());

					obs::log_remote_throttle(attempt, delay, from_header);

					delay
				},
				AttemptOutcome::Failed(err) => {
					obs::log_attempt_failure(KIND, attempt, &err);
					last_error = Some(err);

					if final_attempt {
						break;
					}

					backoff.advance()
				},
			};

			tokio::time::sleep(delay).await;
		}

		obs::record_op_outcome(KIND, OpOutcome::Failure);

		Err(FetchError::Exhausted { attempts, source: last_error }.into())
	}

	async fn attempt(&self, url: &Url) -> Result<AttemptOutcome> {
		let request = self.build_request(url)?;
		let response = match self.http_client.send(request).await {
			Ok(response) => response,
			Err(err) => {
				let err = self.transport_mapper.map_transport_error(err);

				return Ok(AttemptOutcome::Failed(err.into()));
			},
		};

		self.telemetry.observe(response.headers());

		let status = response.status();

		if status == StatusCode::TOO_MANY_REQUESTS {
			return Ok(AttemptOutcome::Throttled {
				retry_after: http::parse_retry_after(response.headers()),
			});
		}
		if !status.is_success() {
			return Ok(AttemptOutcome::Failed(AttemptError::Status { status: status.as_u16() }));
		}

		Ok(match http::decode_json::<Listing>(response.body()) {
			Ok(listing) => AttemptOutcome::Listing(listing.data.children),
			Err(source) => AttemptOutcome::Failed(AttemptError::Decode { source }),
		})
	}

	fn build_request(&self, url: &Url) -> Result<HttpRequest> {
		let access_token = self.credentials.access_token().ok_or(AuthError::MissingAccessToken)?;
		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
			.header(USER_AGENT, self.user_agent.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}
