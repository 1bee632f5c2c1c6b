//! Configuration for the built-in OAuth 2.0 authorizer.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Grant used to obtain tokens from the token endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrantType {
	/// `grant_type=client_credentials`.
	#[default]
	ClientCredentials,
	/// `grant_type=password` (resource owner password credentials).
	Password {
		/// Resource owner username.
		username: String,
		/// Resource owner password.
		password: TokenSecret,
	},
}
impl GrantType {
	/// Returns the `grant_type` label sent to the token endpoint.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::ClientCredentials => "client_credentials",
			Self::Password { .. } => "password",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where client credentials travel on token requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsTransport {
	#[default]
	/// HTTP Basic `Authorization` header with `client_id`/`client_secret`.
	BasicAuthentication,
	/// Form body parameters for `client_id`/`client_secret`.
	RequestBody,
}

/// Options consumed by [`OAuth2Authorizer`](crate::authorizer::OAuth2Authorizer).
///
/// The struct deserializes from any serde format, with `snake_case` field names:
///
/// ```
/// # use oauth2_interceptor::AuthorizerOptions;
/// let options: AuthorizerOptions = serde_json::from_str(
/// 	r#"{
/// 		"token_endpoint": "https://auth.example.com/oauth2/token",
/// 		"client_id": "svc-reports",
/// 		"client_secret": "s3cr3t",
/// 		"scope": "reports.read reports.write"
/// 	}"#,
/// )
/// .unwrap();
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerOptions {
	/// Token endpoint URL.
	pub token_endpoint: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential clients.
	#[serde(default)]
	pub client_secret: Option<TokenSecret>,
	/// Scopes requested on every token call.
	#[serde(default)]
	pub scope: ScopeSet,
	/// Grant used to obtain tokens.
	#[serde(default)]
	pub grant: GrantType,
	/// How client credentials are transmitted.
	#[serde(default)]
	pub credentials_transport: CredentialsTransport,
	/// Additional form parameters appended to token requests (e.g., `audience`).
	#[serde(default)]
	pub extra_params: BTreeMap<String, String>,
}
impl AuthorizerOptions {
	/// Creates client-credentials options for the provided endpoint and client identifier.
	pub fn new(token_endpoint: Url, client_id: impl Into<String>) -> Self {
		Self {
			token_endpoint,
			client_id: client_id.into(),
			client_secret: None,
			scope: ScopeSet::default(),
			grant: GrantType::default(),
			credentials_transport: CredentialsTransport::default(),
			extra_params: BTreeMap::new(),
		}
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the requested scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Switches to the resource owner password grant.
	pub fn with_password_grant(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.grant =
			GrantType::Password { username: username.into(), password: TokenSecret::new(password) };

		self
	}

	/// Overrides how client credentials are transmitted.
	pub fn with_credentials_transport(mut self, transport: CredentialsTransport) -> Self {
		self.credentials_transport = transport;

		self
	}

	/// Adds an extra form parameter to every token request.
	pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(key.into(), value.into());

		self
	}

	/// Checks the options for values the token endpoint could never accept.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::InvalidOptions { reason: "client_id must not be empty" });
		}
		if matches!(&self.grant, GrantType::Password { username, .. } if username.is_empty()) {
			return Err(ConfigError::InvalidOptions {
				reason: "password grant requires a username",
			});
		}
		if self.extra_params.keys().any(|key| RESERVED_PARAMS.contains(&key.as_str())) {
			return Err(ConfigError::InvalidOptions {
				reason: "extra_params must not override reserved token request fields",
			});
		}

		Ok(())
	}
}

const RESERVED_PARAMS: [&str; 7] =
	["grant_type", "scope", "client_id", "client_secret", "username", "password", "refresh_token"];
