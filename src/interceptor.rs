//! Bearer-token interceptor with a single cached token and one-shot 401 recovery.
//!
//! [`RequestInterceptor`] wraps an inner [`Transport`]. Each outbound request without an
//! `Authorization` header gets the cached token attached (fetching one first when the cache
//! is empty). When the server answers `401 Unauthorized`, the interceptor fetches a replacement
//! token and resends a copy of the original request exactly once.
//!
//! All token work for an interceptor is serialized behind its [`TokenCache`] lock, so at
//! most one [`Authorizer::get_token`] call is in flight per interceptor. The lock is never
//! held while a request is forwarded. Cancellation observed at a token step resolves that
//! step to "no token" rather than an error; the request then proceeds unauthenticated and
//! the inner transport decides what a cancelled signal means for it.

mod cache;
mod stats;

pub use cache::TokenCache;
pub use stats::InterceptorMetrics;

// self
use crate::{
	_prelude::*,
	auth::Token,
	authorizer::{Authorizer, AuthorizerOptions, OAuth2Authorizer},
	obs::{self, OpKind},
	transport::{self, Transport, TransportFuture},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

/// Interceptor over the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestInterceptor = RequestInterceptor<ReqwestTransport>;

/// Outbound request stage that authorizes requests with a cached bearer token.
///
/// Clones share the transport, the authorizer, the token cache, and the metrics.
pub struct RequestInterceptor<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	authorizer: Arc<dyn Authorizer>,
	cache: Arc<TokenCache>,
	metrics: Arc<InterceptorMetrics>,
}
impl<T> RequestInterceptor<T>
where
	T: ?Sized + Transport,
{
	/// Wraps `transport`, obtaining tokens from `authorizer`.
	///
	/// The authorizer must not route its own token requests back through this interceptor.
	pub fn with_transport(transport: impl Into<Arc<T>>, authorizer: Arc<dyn Authorizer>) -> Self {
		Self {
			transport: transport.into(),
			authorizer,
			cache: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Wraps `transport` and builds an [`OAuth2Authorizer`] that sends token requests
	/// through the same transport.
	pub fn from_options(transport: impl Into<Arc<T>>, options: AuthorizerOptions) -> Result<Self> {
		let transport = transport.into();
		let authorizer = OAuth2Authorizer::<T>::with_transport(options, transport.clone())?;

		Ok(Self::with_transport(transport, Arc::new(authorizer)))
	}

	/// Replaces the token cache, e.g. to share one token between several interceptors.
	pub fn with_cache(mut self, cache: Arc<TokenCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Returns the wrapped transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Returns the token cache.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Returns the counters for this interceptor.
	pub fn metrics(&self) -> &InterceptorMetrics {
		&self.metrics
	}

	/// Returns a copy of the cached token, if any.
	pub async fn cached_token(&self) -> Option<Token> {
		self.cache.snapshot().await
	}

	/// Authorizes and forwards `request`, retrying once with a fresh token on `401`.
	///
	/// A request that already carries an `Authorization` header is forwarded unchanged.
	/// Responses other than `401` are returned as-is, as is the original `401` when no new
	/// token can be obtained. Authorizer and transport failures are returned unchanged.
	pub async fn send(
		&self,
		mut request: HttpRequest,
		cancel: CancellationToken,
	) -> Result<HttpResponse> {
		const KIND: OpKind = OpKind::Send;

		obs::observe(KIND, "send", async move {
			let token = if request.headers().contains_key(AUTHORIZATION) {
				None
			} else {
				self.ensure_token(&cancel).await?
			};

			if let Some(token) = token {
				request.headers_mut().insert(AUTHORIZATION, token.bearer_header()?);
			}

			// The transport consumes the request, so the retry copy is taken before sending.
			// This clones the headers and body of every request, not just those that get a 401.
			let mut retry = transport::duplicate_request(&request);
			let response = self.transport.send(request, cancel.clone()).await?;

			if response.status() != StatusCode::UNAUTHORIZED {
				return Ok(response);
			}

			let Some(token) = self.force_refresh(&cancel).await? else {
				obs::note(KIND, "no replacement token; returning unauthorized response");

				return Ok(response);
			};

			self.metrics.record_unauthorized_retry();
			obs::note(KIND, "retrying unauthorized request with a refreshed token");
			retry.headers_mut().insert(AUTHORIZATION, token.bearer_header()?);

			self.transport.send(retry, cancel).await
		})
		.await
	}

	/// Returns the cached token, fetching one when the cache is empty.
	///
	/// Resolves to `Ok(None)` when `cancel` fires before the lock is taken or while the
	/// authorizer is working; the cache is left untouched in that case.
	pub async fn ensure_token(&self, cancel: &CancellationToken) -> Result<Option<Token>> {
		const KIND: OpKind = OpKind::EnsureToken;

		obs::observe(KIND, "ensure_token", async {
			let Some(mut slot) = self.cache.acquire(cancel).await else {
				return Ok(self.abandon(KIND));
			};

			if let Some(token) = &*slot {
				self.metrics.record_cache_hit();
				obs::note(KIND, "reusing cached token");

				return Ok(Some(token.clone()));
			}

			let fetched = self.fetch(KIND, cancel).await?;

			if let Some(token) = &fetched {
				*slot = Some(token.clone());
			}

			Ok(fetched)
		})
		.await
	}

	/// Fetches a new token unconditionally and replaces the cached one.
	///
	/// Callers that queued behind another refresh still fetch their own token. Resolves to
	/// `Ok(None)` on cancellation, leaving the cache untouched; on authorizer failure the
	/// previous token also stays cached.
	pub async fn force_refresh(&self, cancel: &CancellationToken) -> Result<Option<Token>> {
		const KIND: OpKind = OpKind::ForceRefresh;

		obs::observe(KIND, "force_refresh", async {
			let Some(mut slot) = self.cache.acquire(cancel).await else {
				return Ok(self.abandon(KIND));
			};
			let fetched = self.fetch(KIND, cancel).await?;

			if let Some(token) = &fetched {
				*slot = Some(token.clone());
			}

			Ok(fetched)
		})
		.await
	}

	// Must be called with the cache lock held.
	async fn fetch(&self, kind: OpKind, cancel: &CancellationToken) -> Result<Option<Token>> {
		self.metrics.record_fetch();
		obs::note(kind, "fetching token from authorizer");

		match self.authorizer.get_token(cancel.clone()).await {
			Ok(token) => Ok(Some(token)),
			Err(Error::Cancelled) => Ok(self.abandon(kind)),
			Err(err) => {
				self.metrics.record_fetch_failure();

				Err(err)
			},
		}
	}

	fn abandon(&self, kind: OpKind) -> Option<Token> {
		self.metrics.record_cancellation();
		obs::note(kind, "token operation cancelled");

		None
	}
}
#[cfg(feature = "reqwest")]
impl RequestInterceptor<ReqwestTransport> {
	/// Creates an interceptor that owns a default reqwest transport and uses it for both
	/// API traffic and token requests.
	pub fn new(options: AuthorizerOptions) -> Result<Self> {
		Self::from_options(ReqwestTransport::new()?, options)
	}

	/// Creates an interceptor that owns a default reqwest transport for API traffic while
	/// token requests go through `authorizer_transport`.
	pub fn with_authorizer_transport<A>(
		options: AuthorizerOptions,
		authorizer_transport: impl Into<Arc<A>>,
	) -> Result<Self>
	where
		A: ?Sized + Transport,
	{
		let authorizer = OAuth2Authorizer::<A>::with_transport(options, authorizer_transport)?;

		Ok(Self::with_transport(ReqwestTransport::new()?, Arc::new(authorizer)))
	}
}
impl<T> Clone for RequestInterceptor<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			authorizer: self.authorizer.clone(),
			cache: self.cache.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<T> Debug for RequestInterceptor<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestInterceptor").field("metrics", &self.metrics).finish_non_exhaustive()
	}
}
impl<T> Transport for RequestInterceptor<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
		Box::pin(RequestInterceptor::send(self, request, cancel))
	}
}
