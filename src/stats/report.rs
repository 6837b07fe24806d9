//! Subreddit report assembly and the JSON envelope served to callers.

// self
use crate::{
	_prelude::*,
	client::RedditClient,
	http::{HttpTransport, TransportErrorMapper},
	obs,
	stats::{self, ImageTextRatio, PostSummary, UserPostCount},
	subreddit::{SubredditName, SubredditNameError},
	throttle::ThrottleStatus,
};

/// Aggregated statistics for one subreddit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
	/// Top posts with their upvote counts.
	pub top_posts: Vec<PostSummary>,
	/// Most active authors among the top posts.
	pub top_users: Vec<UserPostCount>,
	/// Flair counts among the newest posts.
	pub post_flair_distribution: BTreeMap<String, usize>,
	/// Image versus text posts among the newest posts.
	pub image_text_post_ratio: ImageTextRatio,
	/// Remote rate-limit headers after the last fetch.
	pub rate_limit: ThrottleStatus,
}

/// JSON body returned for a report request.
///
/// Failures never expose internal error details; rate-limit failures carry the latest
/// remote rate-limit headers so callers can decide when to come back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatsResponse {
	/// Successful report.
	Report(StatsReport),
	/// Local or remote rate limit stopped the report.
	RateLimited {
		/// Fixed error message.
		error: &'static str,
		/// Remote rate-limit headers at the time of failure.
		#[serde(rename = "rateLimit")]
		rate_limit: ThrottleStatus,
	},
	/// Any other failure.
	Failed {
		/// Fixed error message.
		error: &'static str,
	},
}
impl StatsResponse {
	/// Message for rate-limit failures.
	pub const RATE_LIMITED: &'static str = "Reddit rate limit exceeded";
	/// Message for generic failures.
	pub const FAILED: &'static str = "Error getting subreddit stats";
	/// Message for blank subreddit input.
	pub const EMPTY_SUBREDDIT: &'static str = "Subreddit cannot be empty";
	/// Message for malformed subreddit input.
	pub const INVALID_SUBREDDIT: &'static str = "Subreddit name is invalid";

	/// Converts a report outcome into the response envelope.
	pub fn from_result(result: Result<StatsReport>, rate_limit: ThrottleStatus) -> Self {
		match result {
			Ok(report) => Self::Report(report),
			Err(err) if err.is_rate_limited() =>
				Self::RateLimited { error: Self::RATE_LIMITED, rate_limit },
			Err(Error::Subreddit(SubredditNameError::Empty)) =>
				Self::Failed { error: Self::EMPTY_SUBREDDIT },
			Err(Error::Subreddit(_)) => Self::Failed { error: Self::INVALID_SUBREDDIT },
			Err(_) => Self::Failed { error: Self::FAILED },
		}
	}

	/// Returns `true` when the envelope carries a report.
	pub fn is_report(&self) -> bool {
		matches!(self, Self::Report(_))
	}
}

/// Builds subreddit reports on top of a shared [`RedditClient`].
pub struct StatsService<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Client used for every listing fetch.
	pub client: RedditClient<C, M>,
}
impl<C, M> StatsService<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps a client.
	pub fn new(client: RedditClient<C, M>) -> Self {
		Self { client }
	}

	/// Validates `raw_subreddit`, fetches its top and new listings once each, and aggregates.
	pub async fn report(&self, raw_subreddit: &str) -> Result<StatsReport> {
		let subreddit = SubredditName::new(raw_subreddit)?;
		let top = self.client.top_posts(&subreddit).await?;
		let new = self.client.new_posts(&subreddit).await?;

		Ok(StatsReport {
			top_posts: stats::posts_by_upvotes(&top),
			top_users: stats::top_users(&top),
			post_flair_distribution: stats::flair_distribution(&new),
			image_text_post_ratio: stats::image_text_ratio(&new),
			rate_limit: self.client.throttle_status(),
		})
	}

	/// Runs [`report`](Self::report) and converts the outcome into a [`StatsResponse`].
	pub async fn respond(&self, raw_subreddit: &str) -> StatsResponse {
		let result = self.report(raw_subreddit).await;

		if let Err(err) = &result {
			obs::log_report_failure(err);
		}

		StatsResponse::from_result(result, self.client.throttle_status())
	}
}
impl<C, M> Clone for StatsService<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { client: self.client.clone() }
	}
}
impl<C, M> Debug for StatsService<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StatsService").field("client", &self.client).finish()
	}
}
