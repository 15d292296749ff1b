//! Freshness policy deciding when the login chain must run again.

// self
use crate::{_prelude::*, error::ConfigError};

/// Verdict returned by [`FreshnessPolicy::evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
	/// The credential outlives the safety margin.
	Fresh,
	/// No credential exists, or it expires within the safety margin.
	Stale,
}

/// Refreshes credentials a fixed margin before they expire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreshnessPolicy {
	margin: Duration,
}
impl FreshnessPolicy {
	/// Margin applied by [`FreshnessPolicy::default`].
	pub const DEFAULT_MARGIN: Duration = Duration::minutes(5);

	/// Creates a policy with the provided margin, which must be strictly positive.
	pub fn new(margin: Duration) -> Result<Self, ConfigError> {
		if margin.is_positive() {
			Ok(Self { margin })
		} else {
			Err(ConfigError::NonPositiveFreshnessMargin)
		}
	}

	/// Returns the configured margin.
	pub fn margin(&self) -> Duration {
		self.margin
	}

	/// Classifies a credential expiry relative to `now`.
	pub fn evaluate(&self, expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Freshness {
		if is_stale(expires_at, now, self.margin) { Freshness::Stale } else { Freshness::Fresh }
	}
}
impl Default for FreshnessPolicy {
	fn default() -> Self {
		Self { margin: Self::DEFAULT_MARGIN }
	}
}

/// Returns `true` if no expiry exists or `expires_at - margin <= now`.
pub fn is_stale(expires_at: Option<OffsetDateTime>, now: OffsetDateTime, margin: Duration) -> bool {
	match expires_at {
		None => true,
		Some(expires_at) => expires_at - margin <= now,
	}
}
