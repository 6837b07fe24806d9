//! Listing endpoints and the typed listing payload.

// self
use crate::{_prelude::*, error::ConfigError, subreddit::SubredditName};

/// Listing sort order together with the page size requested for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListingSort {
	/// Highest-scoring posts; five per request.
	Top,
	/// Most recent posts; one hundred per request.
	New,
}
impl ListingSort {
	/// Returns the path segment for this sort.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Top => "top",
			Self::New => "new",
		}
	}

	/// Returns the `limit` query value requested for this sort.
	pub const fn limit(self) -> u32 {
		match self {
			Self::Top => 5,
			Self::New => 100,
		}
	}

	/// Builds `<base>/<subreddit>/<sort>?limit=<n>`.
	///
	/// `base` must end with `/` so the subreddit is appended rather than replacing the last
	/// path segment.
	pub fn url(self, base: &Url, subreddit: &SubredditName) -> Result<Url, ConfigError> {
		let mut url = base
			.join(&format!("{subreddit}/{}", self.as_str()))
			.map_err(|source| ConfigError::InvalidUrl { field: "base_url", source })?;

		url.query_pairs_mut().append_pair("limit", &self.limit().to_string());

		Ok(url)
	}
}
impl Display for ListingSort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Top-level listing envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
	/// Listing body.
	pub data: ListingData,
}

/// Listing body holding the returned posts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingData {
	/// Posts in listing order.
	pub children: Vec<Post>,
}

/// One listing child.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
	/// Thing kind, e.g. `t3` for links.
	pub kind: Option<String>,
	/// Post fields.
	pub data: PostData,
}

/// Post fields consumed by the aggregations; everything else is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
	/// Post title.
	pub title: Option<String>,
	/// Upvote count.
	pub ups: Option<i64>,
	/// Author user name.
	pub author: Option<String>,
	/// Flair label.
	pub link_flair_text: Option<String>,
	/// Content hint such as `image` or `self`.
	pub post_hint: Option<String>,
}
