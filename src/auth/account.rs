//! Account material supplied by the application: login identity, password, and command PIN.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Login identity plus the PIN used for command step-up.
#[derive(Clone)]
pub struct AccountCredentials {
	/// Login identifier (usually the account e-mail).
	pub login_id: String,
	/// Account password sent to the identity provider.
	pub password: Secret,
	/// Command PIN sent to the step-up endpoint.
	pub pin: Secret,
}
impl AccountCredentials {
	/// Bundles the account material.
	pub fn new(
		login_id: impl Into<String>,
		password: impl Into<Secret>,
		pin: impl Into<Secret>,
	) -> Self {
		Self { login_id: login_id.into(), password: password.into(), pin: pin.into() }
	}

	/// PIN in the wire format the step-up endpoint expects.
	///
	/// This is base64 encoding only; the PIN is readable by anyone who sees the request body.
	pub fn encoded_pin(&self) -> String {
		STANDARD.encode(self.pin.expose().as_bytes())
	}
}
impl Debug for AccountCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccountCredentials")
			.field("login_id", &self.login_id)
			.field("password", &self.password)
			.field("pin", &self.pin)
			.finish()
	}
}
