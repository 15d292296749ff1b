//! Brand descriptors: endpoints, API keys, and region for one vehicle marque.
//!
//! A [`Brand`] is validated configuration data the client only reads. Construct it through
//! [`Brand::builder`], which enforces HTTPS endpoints (plain HTTP is tolerated for loopback
//! hosts so local mocks work) and non-empty keys.

pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Endpoint set declared by a brand descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEndpoints {
	/// Identity provider base URL (bootstrap, login, JWT exchange).
	pub login: Url,
	/// Manufacturer token-vending endpoint (full URL).
	pub token: Url,
	/// Vehicle data API base URL.
	pub api: Url,
	/// PIN step-up API base URL.
	pub auth: Url,
	/// Identity-pool federation service endpoint (full URL).
	pub identity: Url,
}

/// Immutable brand descriptor consumed by the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
	/// Human-readable brand label, used in spans.
	pub name: String,
	/// Cloud region used for request signing and the default identity endpoint.
	pub region: String,
	/// Identity provider API key.
	pub login_api_key: String,
	/// Vehicle API key sent as `x-api-key` on token vending, reads, and commands.
	pub api_key: String,
	/// API key sent as `x-api-key` on PIN step-up.
	pub auth_api_key: String,
	/// Endpoint definitions.
	pub endpoints: BrandEndpoints,
}
impl Brand {
	/// Creates a new builder for the provided brand label and region.
	pub fn builder(name: impl Into<String>, region: impl Into<String>) -> BrandBuilder {
		BrandBuilder::new(name, region)
	}

	/// Joins an identity-provider method (e.g. `accounts.login`) onto the login base URL.
	pub fn login_endpoint(&self, method: &str) -> Result<Url, ConfigError> {
		join(&self.endpoints.login, &format!("/{method}"))
	}

	/// Joins a versioned path onto the vehicle API base URL.
	pub fn api_endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.endpoints.api, path)
	}

	/// Joins a versioned path onto the PIN step-up base URL.
	pub fn auth_endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.endpoints.auth, path)
	}
}

/// Default identity-pool federation endpoint for a region.
pub fn default_identity_endpoint(region: &str) -> Result<Url, ConfigError> {
	let raw = format!("https://cognito-identity.{region}.amazonaws.com/");

	Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { path: raw, source })
}

fn join(base: &Url, path: &str) -> Result<Url, ConfigError> {
	let raw = format!("{}{path}", base.as_str().trim_end_matches('/'));

	Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
}
