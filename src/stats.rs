//! Pure aggregations over listing posts.
//!
//! These functions never touch the network; [`StatsService`] feeds them with the listings
//! fetched by a [`RedditClient`](crate::client::RedditClient).

pub mod report;

pub use report::*;

// self
use crate::{_prelude::*, client::Post};

/// Number of authors returned by [`top_users`].
pub const TOP_USERS_LIMIT: usize = 5;

/// Title and upvote count of one post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
	/// Post title.
	pub title: Option<String>,
	/// Upvote count; missing counts read as zero.
	pub up_votes: i64,
}

/// Number of posts an author has in a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostCount {
	/// Author user name.
	pub user_name: String,
	/// Posts authored in the listing.
	pub post_count: usize,
}

/// Image posts versus text posts in a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTextRatio {
	/// Posts hinted as `image`.
	pub image_posts: usize,
	/// Self posts and posts without a hint.
	pub text_posts: usize,
}

/// Summarises each post in listing order.
pub fn posts_by_upvotes(posts: &[Post]) -> Vec<PostSummary> {
	posts
		.iter()
		.map(|post| PostSummary {
			title: post.data.title.clone(),
			up_votes: post.data.ups.unwrap_or_default(),
		})
		.collect()
}

/// Returns the most prolific authors, highest count first.
///
/// Ties keep the order in which authors first appear; posts without an author are skipped.
pub fn top_users(posts: &[Post]) -> Vec<UserPostCount> {
	let mut counts = Vec::<UserPostCount>::new();
	let mut index = HashMap::<&str, usize>::new();

	for author in posts.iter().filter_map(|post| post.data.author.as_deref()) {
		if author.is_empty() {
			continue;
		}

		match index.get(author).copied() {
			Some(slot) => counts[slot].post_count += 1,
			None => {
				index.insert(author, counts.len());
				counts.push(UserPostCount { user_name: author.to_owned(), post_count: 1 });
			},
		}
	}

	// Stable sort keeps first-appearance order among equal counts.
	counts.sort_by(|a, b| b.post_count.cmp(&a.post_count));
	counts.truncate(TOP_USERS_LIMIT);

	counts
}

/// Counts posts per non-empty flair.
pub fn flair_distribution(posts: &[Post]) -> BTreeMap<String, usize> {
	let mut distribution = BTreeMap::new();

	for flair in posts.iter().filter_map(|post| post.data.link_flair_text.as_deref()) {
		if !flair.is_empty() {
			*distribution.entry(flair.to_owned()).or_default() += 1;
		}
	}

	distribution
}

/// Counts image posts against text posts; other hints such as `link` count as neither.
pub fn image_text_ratio(posts: &[Post]) -> ImageTextRatio {
	let mut ratio = ImageTextRatio::default();

	for post in posts {
		match post.data.post_hint.as_deref() {
			Some("image") => ratio.image_posts += 1,
			Some("self") | Some("") | None => ratio.text_posts += 1,
			Some(_) => {},
		}
	}

	ratio
}
