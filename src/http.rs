//! Bridges [`Transport`] into the `oauth2` crate's HTTP client contract.
//!
//! Token-endpoint calls are made through [`TransportHttpClient`], which adapts any
//! [`Transport`] into an [`AsyncHttpClient`]. Because the adapter talks to the inner
//! transport directly, token requests never pass back through the interceptor and never
//! receive a bearer header of their own. Each handle carries a [`ResponseStatusSlot`] so
//! a failed exchange can be classified with the HTTP status the endpoint answered with.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
// self
use crate::{_prelude::*, transport::Transport};

/// Thread-safe slot holding the HTTP status of the most recent token-endpoint response.
///
/// The authorizer creates a fresh slot for each token request and reads it immediately
/// after `oauth2` resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseStatusSlot(Arc<Mutex<Option<u16>>>);
impl ResponseStatusSlot {
	/// Stores the status for the current request.
	pub fn store(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Returns the captured status, if any, clearing the slot.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] handle that sends token requests through a [`Transport`].
pub struct TransportHttpClient<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	slot: ResponseStatusSlot,
	cancel: CancellationToken,
}
impl<T> TransportHttpClient<T>
where
	T: ?Sized + Transport,
{
	/// Creates a handle that records statuses in `slot` and forwards `cancel` to the
	/// transport.
	pub fn new(transport: Arc<T>, slot: ResponseStatusSlot, cancel: CancellationToken) -> Self {
		Self { transport, slot, cancel }
	}
}
impl<'c, T> AsyncHttpClient<'c> for TransportHttpClient<T>
where
	T: ?Sized + Transport,
{
	type Error = HttpClientError<Error>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response =
				self.transport.send(request, self.cancel.clone()).await.map_err(Box::new)?;

			self.slot.store(response.status().as_u16());

			Ok(response)
		})
	}
}
impl<T> Debug for TransportHttpClient<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TransportHttpClient")
			.field("slot", &self.slot)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}
