//! In-process credential store holding the active signer and the account it belongs to.

// self
use crate::{
	_prelude::*,
	auth::{AccountUid, FreshnessPolicy, is_stale},
	signer::SigV4Signer,
};

/// Result of one successful login chain: the account UID and the signer built for it.
#[derive(Clone, Debug)]
pub struct StoredCredential {
	/// Account UID returned by the identity provider.
	pub uid: AccountUid,
	/// Immutable signer shared by every call until the next login.
	pub signer: Arc<SigV4Signer>,
}
impl StoredCredential {
	/// Pairs a UID with a freshly built signer.
	pub fn new(uid: AccountUid, signer: SigV4Signer) -> Self {
		Self { uid, signer: Arc::new(signer) }
	}

	/// Expiry of the credential behind the signer.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.signer.credential().expires_at
	}
}

/// Thread-safe holder for the current [`StoredCredential`].
///
/// Replacement is a single write, so readers observe either the previous login's UID and
/// signer or the new ones, never a mix.
#[derive(Debug, Default)]
pub struct CredentialStore(RwLock<Option<StoredCredential>>);
impl CredentialStore {
	/// Returns a cheap clone of the current entry, if any.
	pub fn snapshot(&self) -> Option<StoredCredential> {
		self.0.read().clone()
	}

	/// Expiry of the current entry, if any.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.0.read().as_ref().map(StoredCredential::expires_at)
	}

	/// Installs the result of a successful login, returning the entry it replaced.
	pub fn replace(&self, entry: StoredCredential) -> Option<StoredCredential> {
		self.0.write().replace(entry)
	}

	/// Returns `true` if no credential exists or it expires within `margin` of `now`.
	pub fn is_stale(&self, now: OffsetDateTime, margin: Duration) -> bool {
		is_stale(self.expires_at(), now, margin)
	}

	/// Returns the current entry only when `policy` still considers it fresh.
	pub fn fresh(&self, now: OffsetDateTime, policy: &FreshnessPolicy) -> Option<StoredCredential> {
		self.snapshot().filter(|entry| !is_stale(Some(entry.expires_at()), now, policy.margin()))
	}
}
