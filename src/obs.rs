//! Optional observability helpers for token operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_interceptor.op` with the `op`
//!   (operation) and `stage` (call site) fields, plus debug events for cache hits, token
//!   fetches, and unauthorized retries, plus a warn event whenever an operation fails.
//! - Enable `metrics` to increment the `oauth2_interceptor_op_total` counter for every
//!   attempt/success/cancellation/failure, labeled by `op` + `outcome`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Operations observed by the interceptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Full request pipeline (token, forward, optional retry).
	Send,
	/// Cached-or-fetch token lookup.
	EnsureToken,
	/// Unconditional token refresh after an unauthorized response.
	ForceRefresh,
	/// Token-endpoint exchange performed by the built-in authorizer.
	Fetch,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Send => "send",
			OpKind::EnsureToken => "ensure_token",
			OpKind::ForceRefresh => "force_refresh",
			OpKind::Fetch => "fetch",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// The caller's cancellation signal ended the operation.
	Cancelled,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Cancelled => "cancelled",
			OpOutcome::Failure => "failure",
		}
	}

	/// Classifies a finished operation.
	pub fn from_result<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => OpOutcome::Success,
			Err(Error::Cancelled) => OpOutcome::Cancelled,
			Err(_) => OpOutcome::Failure,
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
