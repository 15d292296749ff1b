// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for login chain runs.
///
/// Only runs of the chain are counted; an `ensure_fresh` call served from the store does
/// not touch these counters.
#[derive(Debug, Default)]
pub struct LoginMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl LoginMetrics {
	/// Returns the total number of login chain runs.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of chains that stored a credential.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of chains aborted by a failing step.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
