//! Credential state, app identity, and the refresh-token exchange.

pub mod credential;
pub mod identity;
pub mod refresh;
pub mod secret;

pub use credential::*;
pub use identity::*;
pub use refresh::*;
pub use secret::*;
