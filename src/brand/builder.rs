//! Builder and validation for [`Brand`] descriptors.

// self
use crate::{
	_prelude::*,
	brand::{self, Brand, BrandEndpoints},
	error::ConfigError,
};

/// Errors raised while constructing or validating brand descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum BrandError {
	/// A required endpoint was not configured.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// A required key or label was empty.
	#[error("Brand field `{field}` cannot be empty.")]
	EmptyField {
		/// Name of the empty field.
		field: &'static str,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The default identity endpoint could not be derived from the region.
	#[error("Region `{region}` does not yield a valid identity endpoint.")]
	InvalidRegion {
		/// Region that was supplied.
		region: String,
	},
}

/// Builder for [`Brand`] values.
#[derive(Debug)]
pub struct BrandBuilder {
	/// Brand label.
	pub name: String,
	/// Cloud region.
	pub region: String,
	/// Identity provider API key.
	pub login_api_key: String,
	/// Vehicle API key.
	pub api_key: String,
	/// PIN step-up API key.
	pub auth_api_key: String,
	/// Identity provider base URL.
	pub login_endpoint: Option<Url>,
	/// Token-vending endpoint.
	pub token_endpoint: Option<Url>,
	/// Vehicle API base URL.
	pub api_endpoint: Option<Url>,
	/// PIN step-up base URL.
	pub auth_endpoint: Option<Url>,
	/// Federation endpoint override; derived from the region when unset.
	pub identity_endpoint: Option<Url>,
}
impl BrandBuilder {
	/// Creates a new builder seeded with the provided label and region.
	pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			region: region.into(),
			login_api_key: String::new(),
			api_key: String::new(),
			auth_api_key: String::new(),
			login_endpoint: None,
			token_endpoint: None,
			api_endpoint: None,
			auth_endpoint: None,
			identity_endpoint: None,
		}
	}

	/// Sets the identity provider API key.
	pub fn login_api_key(mut self, key: impl Into<String>) -> Self {
		self.login_api_key = key.into();

		self
	}

	/// Sets the vehicle API key.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = key.into();

		self
	}

	/// Sets the PIN step-up API key.
	pub fn auth_api_key(mut self, key: impl Into<String>) -> Self {
		self.auth_api_key = key.into();

		self
	}

	/// Sets the identity provider base URL.
	pub fn login_endpoint(mut self, url: Url) -> Self {
		self.login_endpoint = Some(url);

		self
	}

	/// Sets the token-vending endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the vehicle API base URL.
	pub fn api_endpoint(mut self, url: Url) -> Self {
		self.api_endpoint = Some(url);

		self
	}

	/// Sets the PIN step-up base URL.
	pub fn auth_endpoint(mut self, url: Url) -> Self {
		self.auth_endpoint = Some(url);

		self
	}

	/// Overrides the identity-pool federation endpoint.
	pub fn identity_endpoint(mut self, url: Url) -> Self {
		self.identity_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<Brand, BrandError> {
		let login =
			self.login_endpoint.ok_or(BrandError::MissingEndpoint { endpoint: "login" })?;
		let token =
			self.token_endpoint.ok_or(BrandError::MissingEndpoint { endpoint: "token" })?;
		let api = self.api_endpoint.ok_or(BrandError::MissingEndpoint { endpoint: "api" })?;
		let auth = self.auth_endpoint.ok_or(BrandError::MissingEndpoint { endpoint: "auth" })?;
		let identity = match self.identity_endpoint {
			Some(url) => url,
			None => brand::default_identity_endpoint(&self.region).map_err(
				|_: ConfigError| BrandError::InvalidRegion { region: self.region.clone() },
			)?,
		};
		let brand = Brand {
			name: self.name,
			region: self.region,
			login_api_key: self.login_api_key,
			api_key: self.api_key,
			auth_api_key: self.auth_api_key,
			endpoints: BrandEndpoints { login, token, api, auth, identity },
		};

		brand.validate()?;

		Ok(brand)
	}
}

impl Brand {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), BrandError> {
		validate_field("name", &self.name)?;
		validate_field("region", &self.region)?;
		validate_field("login_api_key", &self.login_api_key)?;
		validate_field("api_key", &self.api_key)?;
		validate_field("auth_api_key", &self.auth_api_key)?;
		validate_endpoint("login", &self.endpoints.login)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("api", &self.endpoints.api)?;
		validate_endpoint("auth", &self.endpoints.auth)?;
		validate_endpoint("identity", &self.endpoints.identity)?;

		Ok(())
	}
}

fn validate_field(field: &'static str, value: &str) -> Result<(), BrandError> {
	if value.trim().is_empty() { Err(BrandError::EmptyField { field }) } else { Ok(()) }
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), BrandError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ => Err(BrandError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse brand fixture URL.")
	}

	fn complete(endpoint: &str) -> BrandBuilder {
		Brand::builder("fiat", "eu-west-1")
			.login_api_key("login-key")
			.api_key("api-key")
			.auth_api_key("auth-key")
			.login_endpoint(url(endpoint))
			.token_endpoint(url(endpoint))
			.api_endpoint(url(endpoint))
			.auth_endpoint(url(endpoint))
	}

	#[test]
	fn rejects_insecure_remote_endpoints() {
		let err = complete("http://api.example.com")
			.build()
			.expect_err("Plain HTTP to a remote host must be rejected.");

		assert!(matches!(err, BrandError::InsecureEndpoint { endpoint: "login", .. }));
	}

	#[test]
	fn loopback_http_is_allowed_for_local_mocks() {
		let brand = complete("http://127.0.0.1:8080")
			.identity_endpoint(url("http://localhost:8081/"))
			.build()
			.expect("Loopback endpoints should be accepted.");

		assert_eq!(brand.endpoints.identity.as_str(), "http://localhost:8081/");
	}

	#[test]
	fn rejects_missing_endpoints_and_empty_keys() {
		let err = Brand::builder("fiat", "eu-west-1")
			.login_api_key("login-key")
			.build()
			.expect_err("Builder should reject missing endpoints.");

		assert_eq!(err, BrandError::MissingEndpoint { endpoint: "login" });

		let err = complete("https://api.example.com")
			.auth_api_key(" ")
			.build()
			.expect_err("Builder should reject blank keys.");

		assert_eq!(err, BrandError::EmptyField { field: "auth_api_key" });
	}
}
