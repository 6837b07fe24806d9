//! Listing client facade tying together refresh, throttling, retries, and telemetry.

pub mod fetch;
pub mod listing;
pub mod retry;

pub use listing::*;
pub use retry::*;

// self
use crate::{
	_prelude::*,
	auth::{CredentialStore, TokenRefresher},
	config::ClientConfig,
	http::{HttpTransport, TransportErrorMapper},
	subreddit::SubredditName,
	throttle::{RequestThrottle, ThrottleStatus, ThrottleTelemetry},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Request timeout applied by [`RedditClient::new`].
#[cfg(feature = "reqwest")]
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestRedditClient = RedditClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Long-lived service object owning every piece of shared client state.
///
/// Cloning is cheap and every clone shares the same credential store, request budget, and
/// telemetry, so one instance should be built at startup and handed to each caller.
pub struct RedditClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for every listing request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors.
	pub transport_mapper: Arc<M>,
	base_url: Url,
	user_agent: String,
	credentials: Arc<CredentialStore>,
	refresher: TokenRefresher<C, M>,
	throttle: Arc<RequestThrottle>,
	telemetry: Arc<ThrottleTelemetry>,
	retry: RetryPolicy,
}
impl<C, M> RedditClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let endpoints = config.validate()?;
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let refresher = TokenRefresher::new(
			config.identity(endpoints.token_url),
			http_client.clone(),
			transport_mapper.clone(),
		)
		.with_refresh_interval(config.refresh_interval());

		Ok(Self {
			http_client,
			transport_mapper,
			base_url: endpoints.base_url,
			user_agent: config.user_agent.clone(),
			credentials: Arc::new(CredentialStore::new(config.credential())),
			refresher,
			throttle: Arc::new(RequestThrottle::new(config.throttle)),
			telemetry: Default::default(),
			retry: config.retry,
		})
	}

	/// Fetches the top five posts of `subreddit`.
	pub async fn top_posts(&self, subreddit: &SubredditName) -> Result<Vec<Post>> {
		self.listing(ListingSort::Top, subreddit).await
	}

	/// Fetches the newest hundred posts of `subreddit`.
	pub async fn new_posts(&self, subreddit: &SubredditName) -> Result<Vec<Post>> {
		self.listing(ListingSort::New, subreddit).await
	}

	/// Refreshes the access token when due, then fetches one listing page.
	pub async fn listing(&self, sort: ListingSort, subreddit: &SubredditName) -> Result<Vec<Post>> {
		let url = sort.url(&self.base_url, subreddit)?;

		self.refresher.ensure_fresh(&self.credentials).await?;

		self.fetch_listing(url).await
	}

	/// Returns the remote rate-limit headers seen on the most recent response.
	pub fn throttle_status(&self) -> ThrottleStatus {
		self.telemetry.snapshot()
	}

	/// Returns the shared credential store.
	pub fn credentials(&self) -> &Arc<CredentialStore> {
		&self.credentials
	}

	/// Returns the token refresher, including its counters.
	pub fn refresher(&self) -> &TokenRefresher<C, M> {
		&self.refresher
	}

	/// Returns the local request budget.
	pub fn throttle(&self) -> &Arc<RequestThrottle> {
		&self.throttle
	}

	/// Returns the listing base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Returns the active retry policy.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}
}
#[cfg(feature = "reqwest")]
impl RedditClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client with its own reqwest transport.
	///
	/// Requests give up after [`DEFAULT_REQUEST_TIMEOUT`]; use
	/// [`RedditClient::with_http_client`] to supply a differently configured transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_http_client(
			config,
			ReqwestHttpClient::with_timeout(DEFAULT_REQUEST_TIMEOUT)?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for RedditClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			base_url: self.base_url.clone(),
			user_agent: self.user_agent.clone(),
			credentials: self.credentials.clone(),
			refresher: self.refresher.clone(),
			throttle: self.throttle.clone(),
			telemetry: self.telemetry.clone(),
			retry: self.retry,
		}
	}
}
impl<C, M> Debug for RedditClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedditClient")
			.field("base_url", &self.base_url.as_str())
			.field("user_agent", &self.user_agent)
			.field("refresher", &self.refresher)
			.field("throttle", &self.throttle.config())
			.field("retry", &self.retry)
			.finish()
	}
}
