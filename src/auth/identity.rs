//! Fixed application identity presented to the token endpoint.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client credentials, token endpoint, and user agent used for refresh exchanges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppIdentity {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Token endpoint accepting `grant_type=refresh_token`.
	pub token_url: Url,
	/// `User-Agent` header sent with every request.
	pub user_agent: String,
}
impl AppIdentity {
	/// Creates a new identity.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		token_url: Url,
		user_agent: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			token_url,
			user_agent: user_agent.into(),
		}
	}

	/// Returns the `Authorization` header value for HTTP Basic client authentication.
	pub fn basic_authorization(&self) -> String {
		let pair = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(pair))
	}
}
