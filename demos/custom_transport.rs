//! Demonstrates plugging an in-memory HTTP stack into the listing client.
//!
//! 1. Implement [`HttpTransport`] so every request is answered from memory: the token endpoint
//!    returns a fresh access token and listing URLs return canned posts plus rate-limit headers.
//! 2. Provide a [`TransportErrorMapper`] that tells timeouts apart from other failures.
//! 3. Wrap both handles in `Arc` and pass them to [`RedditClient::with_http_client`].
//! 4. Build a report through [`StatsService`], then switch the transport offline and inspect
//!    how the exhausted retry budget surfaces.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use color_eyre::Result;
// self
use subreddit_stats::{
	client::{RedditClient, RetryPolicy},
	config::ClientConfig,
	error::{AttemptError, Error, FetchError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, TransportErrorMapper, TransportFuture},
	http_types::{Method, Response},
	stats::StatsService,
	subreddit::SubredditName,
	throttle::{RATE_LIMIT_REMAINING, RATE_LIMIT_RESET, RATE_LIMIT_USED},
};

const TOKEN_URL: &str = "https://auth.example.com/api/v1/access_token";
const BASE_URL: &str = "https://oauth.example.com/r/";
const TOKEN_BODY: &str = r#"{"access_token":"demo-access","token_type":"bearer"}"#;
const LISTING_BODY: &str = r#"{"data":{"children":[
	{"data":{"title":"Ferris turns ten","ups":420,"author":"crab","link_flair_text":"News","post_hint":"image"}},
	{"data":{"title":"Borrow checker tips","ups":128,"author":"crab","link_flair_text":"Help","post_hint":"self"}},
	{"data":{"title":"Async in practice","ups":96,"author":"tokio-fan","link_flair_text":"Help"}}
]}}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(MemoryTransport::default());
	let config = ClientConfig::builder(
		"demo-client",
		"demo-secret",
		TOKEN_URL,
		BASE_URL,
		"subreddit-stats-demo/0.1",
	)
	.refresh_token("demo-refresh")
	.retry(RetryPolicy::new(2, Duration::from_millis(50)))
	.build()?;
	let client: RedditClient<MemoryTransport, MemoryTransportErrorMapper> =
		RedditClient::with_http_client(
			config,
			transport.clone(),
			Arc::new(MemoryTransportErrorMapper),
		)?;
	let service = StatsService::new(client.clone());
	let response = service.respond("Rust").await;

	println!("Report:\n{}", serde_json::to_string_pretty(&response)?);
	println!("Requests served from memory: {}", transport.served());
	println!("Token exchanges: {}", client.refresher().metrics.exchanges());

	transport.go_offline();

	let subreddit: SubredditName = "rust".parse()?;

	match client.top_posts(&subreddit).await {
		Ok(posts) => println!("Unexpected listing with {} posts.", posts.len()),
		Err(Error::Fetch(FetchError::Exhausted { attempts, source: Some(source) })) => {
			let timed_out = matches!(&source, AttemptError::Transport(err) if err.is_timeout());

			println!("Gave up after {attempts} attempts (timeout: {timed_out}): {source}");
		},
		Err(other) => println!("Unexpected failure: {other}"),
	}

	Ok(())
}

/// Transport failure emitted once the in-memory server is switched off.
#[derive(Debug)]
struct MemoryTransportError;
impl Display for MemoryTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("in-memory server timed out")
	}
}
impl StdError for MemoryTransportError {}

#[derive(Debug, Default)]
struct MemoryTransport {
	offline: AtomicBool,
	served: AtomicUsize,
}
impl MemoryTransport {
	fn go_offline(&self) {
		self.offline.store(true, Ordering::Relaxed);
	}

	fn served(&self) -> usize {
		self.served.load(Ordering::Relaxed)
	}

	fn respond(&self, request: &HttpRequest) -> HttpResponse {
		let served = self.served.fetch_add(1, Ordering::Relaxed) + 1;
		let (status, body) = match (request.method(), request.uri().path()) {
			(&Method::POST, "/api/v1/access_token") => (200, TOKEN_BODY),
			(&Method::GET, path) if path.starts_with("/r/") => (200, LISTING_BODY),
			_ => (404, ""),
		};

		Response::builder()
			.status(status)
			.header("content-type", "application/json")
			.header(RATE_LIMIT_USED, served.to_string())
			.header(RATE_LIMIT_REMAINING, 600_usize.saturating_sub(served).to_string())
			.header(RATE_LIMIT_RESET, "540")
			.body(body.as_bytes().to_vec())
			.unwrap_or_default()
	}
}
impl HttpTransport for MemoryTransport {
	type TransportError = MemoryTransportError;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			if self.offline.load(Ordering::Relaxed) {
				return Err(MemoryTransportError);
			}

			Ok(self.respond(&request))
		})
	}
}

#[derive(Debug, Default)]
struct MemoryTransportErrorMapper;
impl TransportErrorMapper<MemoryTransportError> for MemoryTransportErrorMapper {
	fn map_transport_error(&self, error: MemoryTransportError) -> TransportError {
		TransportError::timeout(error)
	}
}
