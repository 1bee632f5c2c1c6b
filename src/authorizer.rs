//! Authorizer capability and the built-in OAuth 2.0 token-endpoint implementation.
//!
//! The interceptor only relies on [`Authorizer::get_token`]: given a cancellation signal
//! it either returns a fresh [`Token`] or fails. [`OAuth2Authorizer`] fulfils that contract
//! with the `oauth2` crate, sending `client_credentials` or `password` grants through a
//! [`Transport`]. It never retries; a failed exchange is reported once and the caller
//! decides what to do next.

pub mod options;

pub use options::*;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Token, TokenSecret},
	error::{AuthFetchError, ConfigError, TransportError},
	http::{ResponseStatusSlot, TransportHttpClient},
	obs::{self, OpKind},
	transport::Transport,
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Boxed future returned by [`Authorizer::get_token`].
pub type AuthorizerFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Produces tokens on demand.
///
/// The interceptor treats implementations as opaque, potentially slow, potentially failing
/// remote calls and guarantees that at most one `get_token` call is in flight per
/// interceptor at any time. Implementations should return [`Error::Cancelled`] when
/// `cancel` fires mid-fetch.
pub trait Authorizer
where
	Self: 'static + Send + Sync,
{
	/// Fetches a new token.
	fn get_token(&self, cancel: CancellationToken) -> AuthorizerFuture<'_>;
}
impl<A> Authorizer for Arc<A>
where
	A: ?Sized + Authorizer,
{
	fn get_token(&self, cancel: CancellationToken) -> AuthorizerFuture<'_> {
		(**self).get_token(cancel)
	}
}

/// Authorizer that exchanges client (and optionally resource owner) credentials at an
/// OAuth 2.0 token endpoint.
pub struct OAuth2Authorizer<T>
where
	T: ?Sized + Transport,
{
	oauth_client: ConfiguredBasicClient,
	options: AuthorizerOptions,
	transport: Arc<T>,
}
impl<T> OAuth2Authorizer<T>
where
	T: ?Sized + Transport,
{
	/// Creates an authorizer that sends token requests through `transport`.
	///
	/// `transport` must reach the token endpoint directly; passing an interceptor here
	/// would make token requests try to authorize themselves.
	pub fn with_transport(
		options: AuthorizerOptions,
		transport: impl Into<Arc<T>>,
	) -> Result<Self> {
		options.validate()?;

		let token_url = TokenUrl::new(options.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;
		let mut oauth_client =
			BasicClient::new(ClientId::new(options.client_id.clone())).set_token_uri(token_url);

		if let Some(secret) = &options.client_secret {
			oauth_client =
				oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
		}

		oauth_client = oauth_client.set_auth_type(match options.credentials_transport {
			CredentialsTransport::BasicAuthentication => AuthType::BasicAuth,
			CredentialsTransport::RequestBody => AuthType::RequestBody,
		});

		Ok(Self { oauth_client, options, transport: transport.into() })
	}

	/// Returns the options this authorizer was built from.
	pub fn options(&self) -> &AuthorizerOptions {
		&self.options
	}

	async fn exchange(&self, cancel: CancellationToken) -> Result<Token> {
		let slot = ResponseStatusSlot::default();
		let http_client = TransportHttpClient::new(self.transport.clone(), slot.clone(), cancel);
		let scopes = self.options.scope.iter().map(|scope| Scope::new(scope.to_owned()));
		let extra_params = self.options.extra_params.iter();
		let response = match &self.options.grant {
			GrantType::ClientCredentials => {
				let mut request =
					self.oauth_client.exchange_client_credentials().add_scopes(scopes);

				for (key, value) in extra_params {
					request = request.add_extra_param(key, value);
				}

				request.request_async(&http_client).await
			},
			GrantType::Password { username, password } => {
				let username = ResourceOwnerUsername::new(username.clone());
				let password = ResourceOwnerPassword::new(password.expose().to_owned());
				let mut request =
					self.oauth_client.exchange_password(&username, &password).add_scopes(scopes);

				for (key, value) in extra_params {
					request = request.add_extra_param(key, value);
				}

				request.request_async(&http_client).await
			},
		}
		.map_err(|err| map_request_error(slot.take(), err))?;

		map_token_response(&response)
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Authorizer<ReqwestTransport> {
	/// Creates an authorizer backed by its own default reqwest transport.
	pub fn new(options: AuthorizerOptions) -> Result<Self> {
		Self::with_transport(options, ReqwestTransport::new()?)
	}
}
impl<T> Authorizer for OAuth2Authorizer<T>
where
	T: ?Sized + Transport,
{
	fn get_token(&self, cancel: CancellationToken) -> AuthorizerFuture<'_> {
		Box::pin(obs::observe(OpKind::Fetch, "get_token", async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => Err(Error::Cancelled),
				result = self.exchange(cancel.clone()) => result,
			}
		}))
	}
}
impl<T> Debug for OAuth2Authorizer<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Authorizer")
			.field("token_endpoint", &self.options.token_endpoint.as_str())
			.field("client_id", &self.options.client_id)
			.field("grant", &self.options.grant.as_str())
			.field("client_secret_set", &self.options.client_secret.is_some())
			.finish()
	}
}

fn map_token_response(response: &BasicTokenResponse) -> Result<Token> {
	let scope = response
		.scopes()
		.map(|scopes| {
			ScopeSet::new(
				scopes.iter().map(|scope| scope.as_str()).filter(|scope| !scope.is_empty()),
			)
		})
		.transpose()
		.map_err(ConfigError::from)?;

	Ok(Token {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		token_type: response.token_type().as_ref().to_owned(),
		refresh_token: response
			.refresh_token()
			.map(|refresh| TokenSecret::new(refresh.secret().to_owned())),
		scope,
		expires_in: response.expires_in().and_then(|ttl| Duration::try_from(ttl).ok()),
		issued_at: OffsetDateTime::now_utc(),
	})
}

fn map_request_error(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<Error>>,
) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => AuthFetchError::Rejected {
			error: response.error().as_ref().to_owned(),
			description: response.error_description().cloned(),
			status,
		}
		.into(),
		RequestTokenError::Request(error) => map_http_client_error(status, error),
		RequestTokenError::Parse(source, _body) => AuthFetchError::Parse { source, status }.into(),
		RequestTokenError::Other(message) => AuthFetchError::Endpoint { message, status }.into(),
	}
}

fn map_http_client_error(status: Option<u16>, err: HttpClientError<Error>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => *inner,
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => AuthFetchError::Endpoint { message, status }.into(),
		_ => AuthFetchError::Endpoint {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::transport::TransportFuture;

	struct Unreachable;
	impl Transport for Unreachable {
		fn send(&self, _request: HttpRequest, _cancel: CancellationToken) -> TransportFuture<'_> {
			Box::pin(std::future::pending())
		}
	}

	fn options() -> AuthorizerOptions {
		AuthorizerOptions::new(
			Url::parse("https://auth.example.com/token").expect("Endpoint fixture should parse."),
			"svc",
		)
		.with_client_secret("secret")
	}

	#[test]
	fn construction_validates_options() {
		let err = OAuth2Authorizer::<Unreachable>::with_transport(
			AuthorizerOptions::new(
				Url::parse("https://auth.example.com/token")
					.expect("Endpoint fixture should parse."),
				"",
			),
			Unreachable,
		)
		.expect_err("Empty client identifiers must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidOptions { .. })));
	}

	#[test]
	fn debug_output_hides_client_secret() {
		let authorizer = OAuth2Authorizer::<Unreachable>::with_transport(options(), Unreachable)
			.expect("Valid options should build an authorizer.");
		let rendered = format!("{authorizer:?}");

		assert!(rendered.contains("client_secret_set: true"));
		assert!(!rendered.contains("\"secret\""));
	}

	#[tokio::test]
	async fn cancellation_aborts_a_hanging_exchange() {
		let authorizer = OAuth2Authorizer::<Unreachable>::with_transport(options(), Unreachable)
			.expect("Valid options should build an authorizer.");
		let cancel = CancellationToken::new();
		let pending = authorizer.get_token(cancel.clone());

		cancel.cancel();

		let err = pending.await.expect_err("Cancelled exchanges must not produce a token.");

		assert!(err.is_cancelled());
	}

	#[test]
	fn http_client_errors_unwrap_transport_failures() {
		let err =
			map_http_client_error(Some(503), HttpClientError::Reqwest(Box::new(Error::Cancelled)));

		assert!(err.is_cancelled());

		let err = map_http_client_error(Some(502), HttpClientError::Other("bad gateway".into()));

		assert!(matches!(
			err,
			Error::AuthFetch(AuthFetchError::Endpoint { status: Some(502), .. })
		));
	}
}
