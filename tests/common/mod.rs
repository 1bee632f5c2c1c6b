//! Shared doubles for the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	io,
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_interceptor::{
	Authorizer, CancellationToken, Transport,
	auth::Token,
	authorizer::AuthorizerFuture,
	error::{AuthFetchError, Error, TransportError},
	oauth2::{
		HttpRequest, HttpResponse,
		http::{Request, StatusCode, header::AUTHORIZATION},
	},
	transport::TransportFuture,
};

/// Builds a bodyless `GET` request for the protected API.
pub fn api_request(uri: &str) -> HttpRequest {
	Request::builder().uri(uri).body(Vec::new()).expect("API request fixture should build.")
}

/// Transport double that answers with scripted statuses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
	statuses: Mutex<VecDeque<StatusCode>>,
	seen: Mutex<Vec<Option<String>>>,
	bodies: Mutex<Vec<Vec<u8>>>,
	latency: Option<Duration>,
	fail_with_network_error: bool,
	cancel_on_unauthorized: bool,
}
impl ScriptedTransport {
	/// Answers with the provided statuses in order, then `200 OK` forever.
	pub fn with_statuses(statuses: impl IntoIterator<Item = StatusCode>) -> Self {
		Self { statuses: Mutex::new(statuses.into_iter().collect()), ..Default::default() }
	}

	/// Answers `401 Unauthorized` to everything.
	pub fn always_unauthorized() -> Self {
		Self::with_statuses(std::iter::repeat_n(StatusCode::UNAUTHORIZED, 64))
	}

	/// Fails every send with a network error.
	pub fn offline() -> Self {
		Self { fail_with_network_error: true, ..Default::default() }
	}

	/// Delays every response.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);

		self
	}

	/// Cancels the caller's signal whenever it answers `401 Unauthorized`.
	pub fn cancelling_on_unauthorized(mut self) -> Self {
		self.cancel_on_unauthorized = true;

		self
	}

	/// Returns the `Authorization` header of every request sent so far.
	pub fn authorization_headers(&self) -> Vec<Option<String>> {
		self.seen.lock().clone()
	}

	/// Returns how many requests reached the transport.
	pub fn sends(&self) -> usize {
		self.seen.lock().len()
	}

	/// Returns the body of every request sent so far.
	pub fn bodies(&self) -> Vec<Vec<u8>> {
		self.bodies.lock().clone()
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
		let header = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(ToOwned::to_owned);

		self.seen.lock().push(header);
		self.bodies.lock().push(request.into_body());

		let status = self.statuses.lock().pop_front().unwrap_or(StatusCode::OK);

		if status == StatusCode::UNAUTHORIZED && self.cancel_on_unauthorized {
			cancel.cancel();
		}

		Box::pin(async move {
			if let Some(latency) = self.latency {
				tokio::time::sleep(latency).await;
			}
			if self.fail_with_network_error {
				let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");

				return Err(Error::from(TransportError::network(refused)));
			}

			let mut response = HttpResponse::new(Vec::new());

			*response.status_mut() = status;

			Ok(response)
		})
	}
}

/// Authorizer double that issues `T1`, `T2`, ... and counts its calls.
#[derive(Default)]
pub struct ScriptedAuthorizer {
	calls: AtomicUsize,
	in_flight: AtomicUsize,
	max_in_flight: AtomicUsize,
	failures: Mutex<VecDeque<Error>>,
	delay: Option<Duration>,
}
impl ScriptedAuthorizer {
	/// Waits `delay` before answering each call, honoring cancellation while waiting.
	pub fn with_delay(delay: Duration) -> Self {
		Self { delay: Some(delay), ..Default::default() }
	}

	/// Fails the next call with `error`.
	pub fn fail_next(self, error: Error) -> Self {
		self.failures.lock().push_back(error);

		self
	}

	/// Returns how many times `get_token` was called.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Returns the highest number of `get_token` calls that ran at the same time.
	pub fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}
}
impl Authorizer for ScriptedAuthorizer {
	fn get_token(&self, cancel: CancellationToken) -> AuthorizerFuture<'_> {
		let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
		let failure = self.failures.lock().pop_front();

		Box::pin(async move {
			let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

			self.max_in_flight.fetch_max(running, Ordering::SeqCst);

			let result = async move {
				if let Some(delay) = self.delay {
					tokio::select! {
						biased;
						_ = cancel.cancelled() => return Err(Error::Cancelled),
						_ = tokio::time::sleep(delay) => {},
					}
				}
				if let Some(err) = failure {
					return Err(err);
				}

				Ok(Token::bearer(format!("T{n}")))
			}
			.await;

			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			result
		})
	}
}

/// Forwards to an inner transport and counts the requests it carried.
pub struct CountingTransport<T> {
	inner: T,
	sends: AtomicUsize,
}
impl<T> CountingTransport<T>
where
	T: Transport,
{
	/// Wraps `inner`.
	pub fn new(inner: T) -> Self {
		Self { inner, sends: AtomicUsize::new(0) }
	}

	/// Returns how many requests went through this transport.
	pub fn sends(&self) -> usize {
		self.sends.load(Ordering::SeqCst)
	}
}
impl<T> Transport for CountingTransport<T>
where
	T: Transport,
{
	fn send(&self, request: HttpRequest, cancel: CancellationToken) -> TransportFuture<'_> {
		self.sends.fetch_add(1, Ordering::SeqCst);
		self.inner.send(request, cancel)
	}
}

/// Convenience error for authorizer failures.
pub fn endpoint_down() -> Error {
	AuthFetchError::Endpoint { message: "token endpoint unavailable".into(), status: Some(503) }
		.into()
}
