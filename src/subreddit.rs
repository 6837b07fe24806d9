//! Validated subreddit names used as listing path segments.

// std
use std::{borrow::Borrow, ops::Deref, str::FromStr};
// self
use crate::_prelude::*;

const SUBREDDIT_MAX_LEN: usize = 64;

/// Error returned when subreddit validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SubredditNameError {
	/// The name was empty or whitespace once prefixes were stripped.
	#[error("Subreddit cannot be empty.")]
	Empty,
	/// The name exceeded the allowed character count.
	#[error("Subreddit name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
	/// The name contains a character outside `[A-Za-z0-9_]`.
	#[error("Subreddit name contains invalid character {found:?}.")]
	InvalidCharacter {
		/// First offending character.
		found: char,
	},
}

/// Subreddit name safe to splice into a listing URL.
///
/// Input such as ` /r/rust/ ` is normalised to `rust` before validation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubredditName(String);
impl SubredditName {
	/// Normalises and validates a user-supplied name.
	pub fn new(raw: impl AsRef<str>) -> Result<Self, SubredditNameError> {
		let view = normalize(raw.as_ref());

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the bare name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for SubredditName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SubredditName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for SubredditName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<SubredditName> for String {
	fn from(value: SubredditName) -> Self {
		value.0
	}
}
impl TryFrom<String> for SubredditName {
	type Error = SubredditNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for SubredditName {
	type Err = SubredditNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for SubredditName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Subreddit({})", self.0)
	}
}
impl Display for SubredditName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn normalize(raw: &str) -> &str {
	let trimmed = raw.trim();
	let trimmed = trimmed
		.strip_prefix("/r/")
		.or_else(|| trimmed.strip_prefix("r/"))
		.unwrap_or(trimmed);

	trimmed.strip_suffix('/').unwrap_or(trimmed)
}

fn validate_view(view: &str) -> Result<(), SubredditNameError> {
	if view.is_empty() {
		return Err(SubredditNameError::Empty);
	}
	if view.chars().count() > SUBREDDIT_MAX_LEN {
		return Err(SubredditNameError::TooLong { max: SUBREDDIT_MAX_LEN });
	}
	if let Some(found) = view.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
		return Err(SubredditNameError::InvalidCharacter { found });
	}

	Ok(())
}
