// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how an interceptor obtained its tokens.
#[derive(Debug, Default)]
pub struct InterceptorMetrics {
	cache_hits: AtomicU64,
	fetches: AtomicU64,
	fetch_failures: AtomicU64,
	unauthorized_retries: AtomicU64,
	cancellations: AtomicU64,
}
impl InterceptorMetrics {
	/// Returns how many token lookups were served from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns how many times the authorizer was called.
	pub fn fetches(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}

	/// Returns how many authorizer calls failed (cancellations excluded).
	pub fn fetch_failures(&self) -> u64 {
		self.fetch_failures.load(Ordering::Relaxed)
	}

	/// Returns how many requests were resent after an unauthorized response.
	pub fn unauthorized_retries(&self) -> u64 {
		self.unauthorized_retries.load(Ordering::Relaxed)
	}

	/// Returns how many token operations were abandoned because of cancellation.
	pub fn cancellations(&self) -> u64 {
		self.cancellations.load(Ordering::Relaxed)
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fetch(&self) {
		self.fetches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fetch_failure(&self) {
		self.fetch_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_unauthorized_retry(&self) {
		self.unauthorized_retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cancellation(&self) {
		self.cancellations.fetch_add(1, Ordering::Relaxed);
	}
}
