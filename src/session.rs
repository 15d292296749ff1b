//! Single-owner mutable context shared by every client call.

// self
use crate::{_prelude::*, http::ReqwestHttpClient, store::CredentialStore};

/// Transport, credential state, and login guard for one account.
///
/// The HTTP client keeps the identity provider's cookies for the life of the session. The
/// guard serializes login chains so two concurrent refreshes never overwrite each other.
#[derive(Debug)]
pub struct Session {
	http: ReqwestHttpClient,
	store: CredentialStore,
	guard: AsyncMutex<()>,
}
impl Session {
	/// Creates an empty session over `http`.
	pub fn new(http: ReqwestHttpClient) -> Self {
		Self { http, store: CredentialStore::default(), guard: AsyncMutex::new(()) }
	}

	/// Transport shared by the login chain and the vehicle API.
	pub fn http(&self) -> &ReqwestHttpClient {
		&self.http
	}

	/// Current credential state.
	pub fn store(&self) -> &CredentialStore {
		&self.store
	}

	pub(crate) fn guard(&self) -> &AsyncMutex<()> {
		&self.guard
	}
}
