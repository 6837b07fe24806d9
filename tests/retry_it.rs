#![cfg(feature = "reqwest")]

// crates.io
use tokio::time::Instant;
// self
use subreddit_stats::{
	_preludet::*,
	client::{RedditClient, RetryPolicy},
	config::{ClientConfig, ClientConfigBuilder},
	error::{AttemptError, AuthError, Error, FetchError, RateLimitError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, TransportErrorMapper, TransportFuture},
	http_types::Response,
	subreddit::SubredditName,
	throttle::ThrottleConfig,
};

const LISTING: &str = r#"{"data":{"children":[{"data":{"title":"a"}},{"data":{"title":"b"}}]}}"#;

#[derive(Debug)]
struct ScriptedTransportError;
impl Display for ScriptedTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Scripted connection reset.")
	}
}
impl StdError for ScriptedTransportError {}

#[derive(Clone, Debug)]
enum Step {
	Respond { status: u16, headers: Vec<(&'static str, &'static str)>, body: &'static str },
	Fail,
}
impl Step {
	fn ok() -> Self {
		Self::Respond { status: 200, headers: Vec::new(), body: LISTING }
	}

	fn status(status: u16) -> Self {
		Self::Respond { status, headers: Vec::new(), body: "" }
	}

	fn throttled_for(retry_after: &'static str) -> Self {
		Self::Respond { status: 429, headers: vec![("retry-after", retry_after)], body: "" }
	}
}

/// Replays a fixed script of responses and records every request it receives.
#[derive(Default)]
struct ScriptedTransport {
	script: Vec<Step>,
	repeat_last: bool,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	fn new(script: Vec<Step>) -> Self {
		Self { script, ..Default::default() }
	}

	fn repeating(step: Step) -> Self {
		Self { script: vec![step], repeat_last: true, ..Default::default() }
	}

	fn calls(&self) -> usize {
		self.requests.lock().len()
	}
}
impl HttpTransport for ScriptedTransport {
	type TransportError = ScriptedTransportError;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let index = {
			let mut requests = self.requests.lock();

			requests.push(request);

			requests.len() - 1
		};
		let step = self
			.script
			.get(index)
			.or_else(|| self.script.last().filter(|_| self.repeat_last))
			.cloned()
			.unwrap_or(Step::Fail);

		Box::pin(async move {
			match step {
				Step::Respond { status, headers, body } => {
					let mut builder = Response::builder().status(status);

					for (name, value) in headers {
						builder = builder.header(name, value);
					}

					let response: HttpResponse = builder
						.body(body.as_bytes().to_vec())
						.expect("Scripted response should build.");

					Ok(response)
				},
				Step::Fail => Err(ScriptedTransportError),
			}
		})
	}
}

#[derive(Debug, Default)]
struct ScriptedMapper;
impl TransportErrorMapper<ScriptedTransportError> for ScriptedMapper {
	fn map_transport_error(&self, error: ScriptedTransportError) -> TransportError {
		TransportError::network(error)
	}
}

fn config() -> ClientConfigBuilder {
	ClientConfig::builder(
		"client-1",
		"secret-1",
		"https://www.example.com/api/v1/access_token",
		"https://oauth.example.com/r/",
		"subreddit-stats-tests/0.1",
	)
	.access_token("access-1")
}

fn build_client(
	builder: ClientConfigBuilder,
	transport: &Arc<ScriptedTransport>,
) -> RedditClient<ScriptedTransport, ScriptedMapper> {
	RedditClient::with_http_client(
		builder.build().expect("Client config fixture should validate."),
		transport.clone(),
		Arc::new(ScriptedMapper),
	)
	.expect("Scripted client should build.")
}

fn assert_waited(started: Instant, secs: u64) {
	let elapsed = started.elapsed();
	let expected = Duration::from_secs(secs);

	assert!(
		elapsed >= expected && elapsed < expected + Duration::from_millis(50),
		"Expected about {expected:?} of backoff, observed {elapsed:?}."
	);
}

fn subreddit() -> SubredditName {
	SubredditName::new("test").expect("Subreddit fixture should be valid.")
}

#[tokio::test(start_paused = true)]
async fn persistent_429_backs_off_then_fails_as_rate_limited() {
	let transport = Arc::new(ScriptedTransport::repeating(Step::status(429)));
	let client = build_client(config(), &transport);
	let started = Instant::now();
	let err = client
		.top_posts(&subreddit())
		.await
		.expect_err("Five 429 responses should exhaust the retry budget.");

	assert!(matches!(err, Error::RateLimited(RateLimitError::Remote { attempts: 5 })));
	assert!(err.is_rate_limited());
	assert_eq!(transport.calls(), 5);
	// 1 s + 2 s + 4 s + 8 s; the final 429 fails without waiting.
	assert_waited(started, 15);
}

#[tokio::test(start_paused = true)]
async fn retry_after_header_overrides_backoff() {
	let transport = Arc::new(ScriptedTransport::new(vec![
		Step::throttled_for("5"),
		Step::status(429),
		Step::ok(),
	]));
	let client = build_client(config(), &transport);
	let started = Instant::now();
	let posts = client.top_posts(&subreddit()).await.expect("Third attempt should succeed.");

	assert_eq!(posts.len(), 2);
	assert_eq!(transport.calls(), 3);
	// Retry-After 5 s, then the untouched initial backoff of 1 s.
	assert_waited(started, 6);
}

#[tokio::test(start_paused = true)]
async fn three_429s_then_success_returns_listing() {
	let transport = Arc::new(ScriptedTransport::new(vec![
		Step::status(429),
		Step::status(429),
		Step::status(429),
		Step::ok(),
	]));
	let client = build_client(config(), &transport);
	let started = Instant::now();
	let posts = client.new_posts(&subreddit()).await.expect("Fourth attempt should succeed.");

	assert_eq!(posts.len(), 2);
	assert_eq!(posts[1].data.title.as_deref(), Some("b"));
	assert_eq!(transport.calls(), 4);
	assert_waited(started, 7);
}

#[tokio::test(start_paused = true)]
async fn transport_failures_exhaust_into_fetch_error() {
	let transport = Arc::new(ScriptedTransport::default());
	let client = build_client(config(), &transport);
	let started = Instant::now();
	let err = client
		.top_posts(&subreddit())
		.await
		.expect_err("Failing transport should exhaust the retry budget.");

	assert_eq!(transport.calls(), 5);
	assert_waited(started, 15);
	assert!(!err.is_rate_limited());

	match err {
		Error::Fetch(FetchError::Exhausted { attempts: 5, source: Some(source) }) => {
			assert!(matches!(source, AttemptError::Transport(TransportError::Network { .. })));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test(start_paused = true)]
async fn transient_server_errors_recover() {
	let transport = Arc::new(ScriptedTransport::new(vec![
		Step::status(500),
		Step::Fail,
		Step::ok(),
	]));
	let client = build_client(config(), &transport);
	let started = Instant::now();

	client.top_posts(&subreddit()).await.expect("Third attempt should succeed.");

	assert_eq!(transport.calls(), 3);
	assert_waited(started, 3);
}

#[tokio::test(start_paused = true)]
async fn requests_carry_bearer_and_user_agent() {
	let transport = Arc::new(ScriptedTransport::new(vec![Step::ok()]));
	let client = build_client(config(), &transport);

	client.top_posts(&subreddit()).await.expect("Scripted listing should be returned.");

	let requests = transport.requests.lock();
	let request = &requests[0];

	assert_eq!(request.uri(), "https://oauth.example.com/r/test/top?limit=5");
	assert_eq!(request.headers()["authorization"], "Bearer access-1");
	assert_eq!(request.headers()["user-agent"], "subreddit-stats-tests/0.1");
}

#[tokio::test(start_paused = true)]
async fn missing_access_token_fails_without_sending() {
	let transport = Arc::new(ScriptedTransport::repeating(Step::ok()));
	let builder = ClientConfig::builder(
		"client-1",
		"secret-1",
		"https://www.example.com/api/v1/access_token",
		"https://oauth.example.com/r/",
		"subreddit-stats-tests/0.1",
	);
	let client = build_client(builder, &transport);
	let err = client.top_posts(&subreddit()).await.expect_err("No access token should fail.");

	assert!(matches!(err, Error::Auth(AuthError::MissingAccessToken)));
	assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn local_budget_rejects_before_any_request() {
	let transport = Arc::new(ScriptedTransport::repeating(Step::ok()));
	let client = build_client(
		config().throttle(ThrottleConfig { window_secs: 60, cap: 2 }),
		&transport,
	);

	client.top_posts(&subreddit()).await.expect("First fetch should be admitted.");

	let err = client.top_posts(&subreddit()).await.expect_err("Second fetch should hit the cap.");

	assert!(matches!(err, Error::RateLimited(RateLimitError::Local { .. })));
	assert_eq!(err.retry_after(), Some(Duration::from_secs(61)));
	assert_eq!(transport.calls(), 1);

	tokio::time::advance(Duration::from_secs(60)).await;

	client.top_posts(&subreddit()).await.expect("A new window should admit the fetch.");
	assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_share_one_budget() {
	let transport = Arc::new(ScriptedTransport::repeating(Step::ok()));
	let client = build_client(config().retry(RetryPolicy::new(1, Duration::ZERO)), &transport);
	let handles = (0..150)
		.map(|_| {
			let client = client.clone();

			tokio::spawn(async move { client.top_posts(&subreddit()).await })
		})
		.collect::<Vec<_>>();
	let mut admitted = 0;
	let mut rejected = 0;

	for handle in handles {
		match handle.await.expect("Fetch task should not panic.") {
			Ok(_) => admitted += 1,
			Err(Error::RateLimited(RateLimitError::Local { .. })) => rejected += 1,
			Err(other) => panic!("Unexpected error variant: {other:?}."),
		}
	}

	assert_eq!(admitted, 99);
	assert_eq!(rejected, 51);
	assert_eq!(transport.calls(), 99);
	assert_eq!(client.throttle().count(), 150);
}
