//! Single-use token granted by PIN step-up authentication.

// self
use crate::{_prelude::*, auth::Secret};

/// Token authorizing exactly one command submission.
///
/// Not `Clone`: the command request builder consumes it, so a token cannot
/// outlive the `command()` call that obtained it.
#[derive(PartialEq, Eq)]
pub struct StepUpToken(Secret);
impl StepUpToken {
	/// Wraps a token returned by the PIN endpoint.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Secret::new(value))
	}

	/// Consumes the token, yielding the wire value.
	pub fn into_inner(self) -> String {
		self.0.expose().to_owned()
	}
}
impl Debug for StepUpToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StepUpToken(<redacted>)")
	}
}
