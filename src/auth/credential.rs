//! Temporary cloud credential issued by the federation service, plus its builder.

// self
use crate::{_prelude::*, auth::Secret};

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access key id was provided.
	#[error("Access key id is required.")]
	MissingAccessKeyId,
	/// Issued when no secret key was provided.
	#[error("Secret key is required.")]
	MissingSecretKey,
	/// Issued when no session token was provided.
	#[error("Session token is required.")]
	MissingSessionToken,
	/// Issued when no expiry was configured.
	#[error("Expiry is required.")]
	MissingExpiry,
}

/// Fully populated temporary credential.
///
/// Only [`CredentialBuilder::build`] creates values, so a credential is either absent or has
/// every field set.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	/// Temporary access key id; safe to log.
	pub access_key_id: String,
	/// Temporary secret key used to derive signing keys.
	pub secret_key: Secret,
	/// Session token attached to every signed request.
	pub session_token: Secret,
	/// Instant after which the federation service rejects the credential.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Returns a builder for assembling a credential from a federation response.
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::default()
	}

	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_key_id", &self.access_key_id)
			.field("secret_key", &self.secret_key)
			.field("session_token", &self.session_token)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
	access_key_id: Option<String>,
	secret_key: Option<Secret>,
	session_token: Option<Secret>,
	expires_at: Option<OffsetDateTime>,
}
impl CredentialBuilder {
	/// Provides the access key id.
	pub fn access_key_id(mut self, value: impl Into<String>) -> Self {
		self.access_key_id = Some(value.into());

		self
	}

	/// Provides the secret key.
	pub fn secret_key(mut self, value: impl Into<String>) -> Self {
		self.secret_key = Some(Secret::new(value));

		self
	}

	/// Provides the session token.
	pub fn session_token(mut self, value: impl Into<String>) -> Self {
		self.session_token = Some(Secret::new(value));

		self
	}

	/// Sets the absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Consumes the builder and produces a [`Credential`]; empty strings count as missing.
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_key_id = self
			.access_key_id
			.filter(|value| !value.is_empty())
			.ok_or(CredentialBuilderError::MissingAccessKeyId)?;
		let secret_key = self
			.secret_key
			.filter(|value| !value.is_empty())
			.ok_or(CredentialBuilderError::MissingSecretKey)?;
		let session_token = self
			.session_token
			.filter(|value| !value.is_empty())
			.ok_or(CredentialBuilderError::MissingSessionToken)?;
		let expires_at = self.expires_at.ok_or(CredentialBuilderError::MissingExpiry)?;

		Ok(Credential { access_key_id, secret_key, session_token, expires_at })
	}
}
