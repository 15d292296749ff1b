//! Client-level error types shared across the login chain, step-up, and vehicle calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Each login step owns a dedicated variant so callers can tell "wrong credentials" from
/// "upstream outage" without string matching.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream answered with something the client cannot interpret.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),

	/// Identity provider rejected the client API key during bootstrap.
	#[error("Identity bootstrap failed: {0}.")]
	BootstrapFailed(IdentityFailure),
	/// Identity provider rejected the account credentials.
	#[error("Account login failed: {0}.")]
	LoginFailed(IdentityFailure),
	/// Identity provider refused to mint an identity assertion.
	#[error("JWT exchange failed: {0}.")]
	JwtExchangeFailed(IdentityFailure),
	/// Token vending or federated credential issuance failed.
	#[error("Credential issuance failed during {stage}: {message}.")]
	CredentialIssuanceFailed {
		/// Which half of the issuance hop failed.
		stage: IssuanceStage,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Upstream- or client-supplied diagnostic.
		message: String,
	},
	/// PIN step-up authentication did not yield a token.
	#[error("PIN authentication failed.")]
	PinAuthFailed {
		/// HTTP status code returned by the PIN endpoint.
		status: u16,
	},
	/// Command endpoint did not acknowledge the command as pending.
	#[error("Command queuing failed: {message}.")]
	CommandRejected {
		/// Server diagnostic, or `unknown error` when none was supplied.
		message: String,
	},
}
impl Error {
	/// Returns `true` when the failure stems from rejected account material (credentials, PIN)
	/// rather than from the network or upstream health.
	pub fn is_auth_failure(&self) -> bool {
		matches!(
			self,
			Self::BootstrapFailed(_)
				| Self::LoginFailed(_) | Self::JwtExchangeFailed(_)
				| Self::PinAuthFailed { .. }
		)
	}

	/// Returns `true` when retrying the whole operation later may succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Protocol(ProtocolError::UnexpectedStatus { status, .. }) => *status >= 500,
			Self::CredentialIssuanceFailed { status: Some(status), .. } => *status >= 500,
			_ => false,
		}
	}
}

/// Diagnostic carried by identity-provider step failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityFailure {
	/// Application-level `statusCode` reported in the response envelope, if any.
	pub status_code: Option<i64>,
	/// Provider-supplied error message, or a client-side description.
	pub message: String,
}
impl IdentityFailure {
	/// Builds a failure from an envelope status code and message.
	pub fn new(status_code: Option<i64>, message: impl Into<String>) -> Self {
		Self { status_code, message: message.into() }
	}
}
impl Display for IdentityFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self.status_code {
			Some(code) => write!(f, "status {code}, {}", self.message),
			None => f.write_str(&self.message),
		}
	}
}

/// Halves of the cloud credential issuance hop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssuanceStage {
	/// Manufacturer token endpoint exchanging the JWT for an identity-pool token.
	TokenVending,
	/// Identity-pool federation service exchanging the pool token for temporary keys.
	Federation,
}
impl IssuanceStage {
	/// Returns a stable label suitable for span or error fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IssuanceStage::TokenVending => "token_vending",
			IssuanceStage::Federation => "federation",
		}
	}
}
impl Display for IssuanceStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint path could not be joined onto a brand base URL.
	#[error("Endpoint `{path}` could not be built.")]
	InvalidEndpoint {
		/// Path that was being joined.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A header value contains characters HTTP does not allow.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
	},
	/// Freshness margins must be strictly positive.
	#[error("Freshness margin must be positive.")]
	NonPositiveFreshnessMargin,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{endpoint}`.")]
	Network {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Responses that arrived intact but do not match the documented envelope.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Endpoint returned a non-success HTTP status.
	#[error("`{endpoint}` returned HTTP {status}: {body_preview}.")]
	UnexpectedStatus {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
	/// Response body was not the JSON shape the endpoint documents.
	#[error("`{endpoint}` returned malformed JSON.")]
	MalformedJson {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response parsed but lacked a required field.
	#[error("`{endpoint}` response is missing `{field}`.")]
	MissingField {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Name of the missing field.
		field: &'static str,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identity_failures_render_status_and_message() {
		let err = Error::LoginFailed(IdentityFailure::new(Some(403), "Invalid LoginID"));

		assert_eq!(err.to_string(), "Account login failed: status 403, Invalid LoginID.");
		assert!(err.is_auth_failure());
		assert!(!err.is_transient());
	}

	#[test]
	fn upstream_outages_are_transient_not_auth_failures() {
		let err = Error::from(ProtocolError::UnexpectedStatus {
			endpoint: "vehicle_status",
			status: 503,
			body_preview: "maintenance".into(),
		});

		assert!(err.is_transient());
		assert!(!err.is_auth_failure());

		let err = Error::CredentialIssuanceFailed {
			stage: IssuanceStage::Federation,
			status: Some(400),
			message: "NotAuthorizedException".into(),
		};

		assert!(!err.is_transient());
		assert_eq!(
			err.to_string(),
			"Credential issuance failed during federation: NotAuthorizedException."
		);
	}

	#[test]
	fn command_rejection_carries_diagnostic() {
		let err = Error::CommandRejected { message: "vehicle offline".into() };

		assert_eq!(err.to_string(), "Command queuing failed: vehicle offline.");
	}
}
