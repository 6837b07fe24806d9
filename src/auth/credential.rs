//! Credential state shared by the refresher and every fetch.
//!
//! [`CredentialStore`] keeps the [`Credential`] behind a read/write lock whose critical
//! sections cover only in-memory checks and updates. The refresher snapshots what it needs,
//! performs the exchange with no lock held, and applies the result in a single write section,
//! so concurrent fetches always read a fully-written access token.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh token pair plus the instant of the last successful refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Bearer token attached to listing requests.
	pub access_token: Option<TokenSecret>,
	/// Long-lived token exchanged for new access tokens.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the current access token was obtained through a refresh.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub last_refresh: Option<OffsetDateTime>,
}
impl Credential {
	/// Creates a credential from optional configured tokens; blank values count as absent.
	pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
		Self {
			access_token: access_token.and_then(TokenSecret::non_empty),
			refresh_token: refresh_token.and_then(TokenSecret::non_empty),
			last_refresh: None,
		}
	}

	/// Records a previous refresh instant (e.g., restored from configuration).
	pub fn with_last_refresh(mut self, instant: OffsetDateTime) -> Self {
		self.last_refresh = Some(instant);

		self
	}

	/// Decides whether a refresh exchange is due at `now`.
	///
	/// A refresh is skipped when no refresh token exists or when the last refresh happened
	/// no more than `interval` ago.
	pub fn refresh_check(&self, now: OffsetDateTime, interval: time::Duration) -> RefreshCheck {
		let Some(refresh_token) = self.refresh_token.as_ref().filter(|secret| !secret.is_blank())
		else {
			return RefreshCheck::Skip(SkipReason::NoRefreshToken);
		};

		match self.last_refresh {
			Some(last) if now - last <= interval => RefreshCheck::Skip(SkipReason::Fresh),
			_ => RefreshCheck::Due(refresh_token.clone()),
		}
	}
}

/// Result of [`Credential::refresh_check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshCheck {
	/// A refresh should run with the enclosed refresh token.
	Due(TokenSecret),
	/// No refresh is needed.
	Skip(SkipReason),
}

/// Why a refresh was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
	/// No refresh token is configured; the access token is treated as long-lived.
	NoRefreshToken,
	/// The last refresh is still within the refresh interval.
	Fresh,
}

/// Thread-safe holder of the process-wide [`Credential`].
#[derive(Debug, Default)]
pub struct CredentialStore(RwLock<StoreState>);
impl CredentialStore {
	/// Wraps an initial credential.
	pub fn new(credential: Credential) -> Self {
		Self(RwLock::new(StoreState { credential, applied_exchange: None }))
	}

	/// Returns a copy of the current credential.
	pub fn snapshot(&self) -> Credential {
		self.0.read().credential.clone()
	}

	/// Returns the current access token, if any.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.0.read().credential.access_token.clone()
	}

	/// Returns the instant the last applied refresh completed, if any.
	pub fn last_refresh(&self) -> Option<OffsetDateTime> {
		self.0.read().credential.last_refresh
	}

	/// Evaluates [`Credential::refresh_check`] against the stored credential.
	pub fn refresh_check(&self, now: OffsetDateTime, interval: time::Duration) -> RefreshCheck {
		self.0.read().credential.refresh_check(now, interval)
	}

	/// Installs tokens from an exchange that started at `started_at` and completed at
	/// `completed_at`.
	///
	/// `last_refresh` becomes `completed_at`. Returns `false` and leaves the store untouched
	/// when an exchange that started later has already been applied, or when the stored
	/// credential was obtained after `started_at`.
	pub(crate) fn apply_refresh(
		&self,
		access_token: TokenSecret,
		rotated_refresh: Option<TokenSecret>,
		started_at: OffsetDateTime,
		completed_at: OffsetDateTime,
	) -> bool {
		let mut guard = self.0.write();

		if guard.newest_start().is_some_and(|newest| newest > started_at) {
			return false;
		}

		guard.applied_exchange = Some(started_at);

		let credential = &mut guard.credential;

		credential.access_token = Some(access_token);
		credential.last_refresh = Some(completed_at.max(started_at));

		if let Some(refresh) = rotated_refresh {
			credential.refresh_token = Some(refresh);
		}

		true
	}
}

#[derive(Debug, Default)]
struct StoreState {
	credential: Credential,
	// Start instant of the exchange that produced the stored access token.
	applied_exchange: Option<OffsetDateTime>,
}
impl StoreState {
	fn newest_start(&self) -> Option<OffsetDateTime> {
		self.applied_exchange.or(self.credential.last_refresh)
	}
}
