//! Per-request tracing identifiers.

// self
use crate::_prelude::*;

/// 16-character uppercase hexadecimal id sent as `clientrequestid` on every vendor call.
///
/// Carries no cryptographic meaning; it only lets upstream logs correlate a request.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);
impl CorrelationId {
	/// Character count of every generated id.
	pub const LEN: usize = 16;

	/// Generates a fresh id from the thread-local RNG.
	pub fn generate() -> Self {
		Self(format!("{:016X}", rand::random::<u64>()))
	}

	/// Returns the id as sent on the wire.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns `true` when `value` has the shape of a generated id.
	pub fn is_well_formed(value: &str) -> bool {
		value.len() == Self::LEN
			&& value.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
	}
}
impl Debug for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CorrelationId({})", self.0)
	}
}
impl Display for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
