//! Interceptor-level error types shared by the authorizer, transports, and the core.

// self
use crate::_prelude::*;

/// Interceptor-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// An unauthorized response is never an error; it is handed back to the caller as a
/// regular response once the single refresh-and-retry attempt has been spent.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The authorizer failed to produce a token.
	#[error(transparent)]
	AuthFetch(#[from] AuthFetchError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The caller's cancellation signal fired before the operation completed.
	#[error("Operation was cancelled by the caller.")]
	Cancelled,
}
impl Error {
	/// Returns `true` when the error stems from the caller's cancellation signal.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Failures raised while fetching a token from the token endpoint.
#[derive(Debug, ThisError)]
pub enum AuthFetchError {
	/// Token endpoint answered with an OAuth error payload.
	#[error("Token endpoint rejected the request with `{error}`.")]
	Rejected {
		/// OAuth `error` code (e.g., `invalid_client`).
		error: String,
		/// Optional `error_description` supplied by the provider.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl AuthFetchError {
	/// HTTP status code observed while fetching, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::Parse { status, .. }
			| Self::Endpoint { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] HttpError),
	/// Access token cannot be rendered as a header value.
	#[error("Access token contains bytes that are not valid in an HTTP header.")]
	InvalidHeader(#[from] InvalidHeaderValue),
	/// Token endpoint URL cannot be used by the OAuth client.
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Scopes in the options or in a token response cannot be normalized.
	#[error("Scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeError),
	/// Authorizer options failed validation.
	#[error("Authorizer options are invalid: {reason}.")]
	InvalidOptions {
		/// What was wrong with the options.
		reason: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
