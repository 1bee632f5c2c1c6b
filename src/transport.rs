//! Transport capability wrapped by the interceptor.
//!
//! A [`Transport`] delivers one HTTP request and resolves with whatever response the
//! server produced; only connectivity failures surface as errors. Requests and responses
//! are the `http` types over `Vec<u8>` bodies re-exported by `oauth2`, so the same
//! transport can carry both API traffic and token-endpoint calls.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Delivers requests to a server.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by every
/// concurrent caller without extra synchronization. They should stop waiting and return
/// [`Error::Cancelled`] once `cancel` fires.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the server's response.
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_>;
}
impl<T> Transport for Arc<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
		(**self).send(request, cancel)
	}
}

/// Copies method, URI, version, headers, and body of `request` so it can be sent again.
///
/// Extensions are not carried over.
pub fn duplicate_request(request: &HttpRequest) -> HttpRequest {
	let mut copy = HttpRequest::new(request.body().clone());

	*copy.method_mut() = request.method().clone();
	*copy.uri_mut() = request.uri().clone();
	*copy.version_mut() = request.version();
	*copy.headers_mut() = request.headers().clone();

	copy
}

/// Default transport backed by a [`ReqwestClient`].
///
/// The interceptor creates one at construction time when no transport is injected and
/// releases it on drop together with its connection pool.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with reqwest's default client settings.
	///
	/// Fails with [`ConfigError::HttpClientBuild`](crate::error::ConfigError::HttpClientBuild)
	/// when the TLS backend or system configuration cannot be initialized.
	pub fn new() -> Result<Self> {
		Self::from_builder(ReqwestClient::builder())
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport from a configured reqwest builder.
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
		let client = builder.build().map_err(crate::error::ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Returns the wrapped reqwest client.
	pub fn client(&self) -> &ReqwestClient {
		&self.0
	}

	async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse> {
		let request = reqwest::Request::try_from(request).map_err(map_reqwest_error)?;
		let response = self.0.execute(request).await.map_err(map_reqwest_error)?;
		let status = response.status();
		let version = response.version();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(map_reqwest_error)?;
		let mut converted = HttpResponse::new(body.to_vec());

		*converted.status_mut() = status;
		*converted.version_mut() = version;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
		Box::pin(async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => Err(Error::Cancelled),
				result = self.round_trip(request) => result,
			}
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return crate::error::ConfigError::http_client_build(err).into();
	}

	crate::error::TransportError::from(err).into()
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::Request;
	// self
	use super::*;

	#[test]
	fn duplicate_request_copies_every_part() {
		let original = Request::builder()
			.method("POST")
			.uri("https://api.example.com/v1/items?page=2")
			.header("x-trace", "abc")
			.header(AUTHORIZATION, "Bearer T1")
			.body(b"{\"name\":\"widget\"}".to_vec())
			.expect("Request fixture should build.");
		let copy = duplicate_request(&original);

		assert_eq!(copy.method(), original.method());
		assert_eq!(copy.uri(), original.uri());
		assert_eq!(copy.version(), original.version());
		assert_eq!(copy.headers(), original.headers());
		assert_eq!(copy.body(), original.body());
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_transport_honors_prior_cancellation() {
		let transport = ReqwestTransport::new().expect("Default reqwest client should build.");
		let cancel = CancellationToken::new();

		cancel.cancel();

		let request = Request::builder()
			.uri("http://127.0.0.1:9/unreachable")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let err = transport
			.send(request, cancel)
			.await
			.expect_err("A cancelled signal must short-circuit the round trip.");

		assert!(err.is_cancelled());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_builder_failures_surface_as_config_errors() {
		let builder = ReqwestClient::builder().user_agent("bad\nagent");
		let err = ReqwestTransport::from_builder(builder)
			.expect_err("An invalid user agent must fail the build.");

		assert!(matches!(err, Error::Config(crate::error::ConfigError::HttpClientBuild { .. })));
	}
}
