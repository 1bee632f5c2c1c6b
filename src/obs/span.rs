// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome, record_op_outcome},
};

/// Runs `fut` as one observed operation.
///
/// With the `tracing` feature the future executes inside an `oauth2_interceptor.op` span
/// carrying `op` and `stage` fields. The attempt and the final outcome are always handed to
/// [`record_op_outcome`].
pub async fn observe<F, T>(kind: OpKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	record_op_outcome(kind, OpOutcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(tracing::info_span!("oauth2_interceptor.op", op = kind.as_str(), stage))
			.await
	};
	#[cfg(not(feature = "tracing"))]
	let result = {
		let _ = stage;

		fut.await
	};
	let outcome = OpOutcome::from_result(&result);

	#[cfg(feature = "tracing")]
	{
		if let Err(err) = &result {
			tracing::warn!(
				op = kind.as_str(),
				outcome = outcome.as_str(),
				error = %err,
				"operation failed"
			);
		}
	}

	record_op_outcome(kind, outcome);

	result
}

/// Emits a debug event in the current span.
pub fn note(kind: OpKind, message: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(op = kind.as_str(), "{message}");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, message);
}
