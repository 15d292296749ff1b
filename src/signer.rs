//! Request signing contracts and the SigV4 implementation used for vehicle API calls.

mod sigv4;

pub use sigv4::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Describes how to authenticate an outbound request without touching its body.
///
/// Signers are immutable once built; the client swaps in a new instance after each
/// successful login instead of mutating the current one.
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Adds authentication headers to `request` as of `instant`.
	fn sign(&self, request: &mut ReqwestRequest, instant: OffsetDateTime)
	-> Result<(), ConfigError>;
}
