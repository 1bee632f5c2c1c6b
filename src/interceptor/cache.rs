//! Single-slot token cache guarded by an async lock.

// self
use crate::{_prelude::*, auth::Token};

/// Owned token state shared by every clone of an interceptor.
///
/// The slot is either empty or holds exactly one [`Token`], and it is only ever replaced
/// as a whole. Every read-modify-write goes through one async lock, so token fetches for a
/// given cache are totally ordered.
#[derive(Debug, Default)]
pub struct TokenCache {
	slot: AsyncMutex<Option<Token>>,
}
impl TokenCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a cache already populated with `token`.
	pub fn with_token(token: Token) -> Self {
		Self { slot: AsyncMutex::new(Some(token)) }
	}

	/// Returns a copy of the cached token, waiting for any in-flight fetch to finish.
	pub async fn snapshot(&self) -> Option<Token> {
		self.slot.lock().await.clone()
	}

	/// Acquires exclusive access to the slot unless `cancel` fires first.
	///
	/// Cancellation is checked again once the lock is held, so a caller cancelled while
	/// queued behind another fetch gives the lock straight back.
	pub(crate) async fn acquire(
		&self,
		cancel: &CancellationToken,
	) -> Option<AsyncMutexGuard<'_, Option<Token>>> {
		let guard = tokio::select! {
			biased;
			_ = cancel.cancelled() => return None,
			guard = self.slot.lock() => guard,
		};

		if cancel.is_cancelled() {
			return None;
		}

		Some(guard)
	}
}
