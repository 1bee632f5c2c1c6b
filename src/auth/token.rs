//! Token issued by an authorizer and cached by the interceptor.

pub mod secret;

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
	error::ConfigError,
};

/// Token returned by an [`Authorizer`](crate::authorizer::Authorizer).
///
/// Only [`access_token`](Self::access_token) is consumed by the interceptor. The remaining
/// fields mirror what the token endpoint returned and are informational; in particular
/// `expires_in` is never used to invalidate a cached token, a rejected request is.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (normally `bearer`).
	pub token_type: String,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Scopes granted by the provider, if it echoed them.
	pub scope: Option<ScopeSet>,
	/// Lifetime hint reported by the provider.
	pub expires_in: Option<Duration>,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
}
impl Token {
	/// Creates a bearer token carrying only an access token, stamped with the current clock.
	pub fn bearer(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: "Bearer".into(),
			refresh_token: None,
			scope: None,
			expires_in: None,
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Sets the lifetime hint.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}

	/// Sets the granted scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Renders the `Authorization: Bearer <token>` header value, flagged as sensitive so
	/// HTTP stacks keep it out of their debug output.
	pub fn bearer_header(&self) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.access_token.expose()))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
