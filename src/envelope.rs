//! Typed response envelopes for every upstream endpoint.
//!
//! Upstream documents carry success and failure in loosely typed fields (`statusCode`,
//! `token`, `responseStatus`). Each endpoint gets a tagged outcome here so call sites match
//! exhaustively instead of probing raw maps.

// crates.io
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::StepUpToken,
	error::{IdentityFailure, ProtocolError},
	http::HttpResponse,
};

/// Marker used when an upstream failure carries no diagnostic.
pub const UNKNOWN_ERROR: &str = "unknown error";

const IDENTITY_SUCCESS: i64 = 200;
const COMMAND_PENDING: &str = "pending";

/// Outcome of an identity-provider call, keyed on the envelope `statusCode`.
#[derive(Debug)]
pub enum IdentityOutcome<T> {
	/// `statusCode == 200`; the payload decoded as `T`.
	Ok(T),
	/// Any other (or missing) `statusCode`.
	Err(IdentityFailure),
}

/// Outcome of PIN step-up authentication.
#[derive(Debug)]
pub enum PinAuthOutcome {
	/// The endpoint granted a single-use token.
	Granted(StepUpToken),
	/// The response carried no usable `token`.
	Denied,
}

/// Outcome of a command submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
	/// The command was queued for the vehicle.
	Pending {
		/// Upstream correlation id for the queued command, when echoed.
		correlation_id: Option<String>,
	},
	/// Anything but `responseStatus == "pending"`.
	Rejected {
		/// `debugMsg` from the response, or [`UNKNOWN_ERROR`].
		message: String,
	},
}

#[derive(Deserialize)]
struct IdentityStatus {
	#[serde(rename = "statusCode")]
	status_code: Option<i64>,
	#[serde(rename = "errorMessage")]
	error_message: Option<String>,
	#[serde(rename = "errorDetails")]
	error_details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BootstrapPayload {}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginPayload {
	#[serde(rename = "UID")]
	pub(crate) uid: Option<String>,
	#[serde(rename = "sessionInfo")]
	pub(crate) session_info: Option<SessionInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionInfo {
	pub(crate) login_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JwtPayload {
	pub(crate) id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenVendingPayload {
	#[serde(rename = "IdentityId")]
	pub(crate) identity_id: Option<String>,
	#[serde(rename = "Token")]
	pub(crate) token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FederationPayload {
	#[serde(rename = "Credentials")]
	pub(crate) credentials: Option<FederatedCredentials>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FederatedCredentials {
	#[serde(rename = "AccessKeyId")]
	pub(crate) access_key_id: Option<String>,
	#[serde(rename = "SecretKey")]
	pub(crate) secret_key: Option<String>,
	#[serde(rename = "SessionToken")]
	pub(crate) session_token: Option<String>,
	#[serde(rename = "Expiration")]
	pub(crate) expiration: Option<Expiration>,
}

/// Federation services emit epoch seconds; some proxies re-encode them as RFC 3339.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Expiration {
	Epoch(f64),
	Text(String),
}
impl Expiration {
	pub(crate) fn to_datetime(&self) -> Option<OffsetDateTime> {
		match self {
			Self::Epoch(secs) if secs.is_finite() =>
				OffsetDateTime::from_unix_timestamp(secs.trunc() as i64).ok(),
			Self::Epoch(_) => None,
			Self::Text(raw) => OffsetDateTime::parse(raw, &Rfc3339).ok(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceFault {
	#[serde(rename = "__type")]
	pub(crate) kind: Option<String>,
	#[serde(alias = "Message")]
	pub(crate) message: Option<String>,
}
impl ServiceFault {
	/// Renders `kind: message`, falling back to whichever half is present.
	pub(crate) fn describe(&self) -> String {
		match (self.kind.as_deref(), self.message.as_deref()) {
			(Some(kind), Some(message)) => format!("{kind}: {message}"),
			(Some(only), None) | (None, Some(only)) => only.to_owned(),
			(None, None) => UNKNOWN_ERROR.to_owned(),
		}
	}
}

#[derive(Deserialize)]
struct PinAuthPayload {
	token: Option<String>,
}

#[derive(Deserialize)]
struct CommandPayload {
	#[serde(rename = "responseStatus")]
	response_status: Option<String>,
	#[serde(rename = "debugMsg")]
	debug_msg: Option<String>,
	#[serde(rename = "correlationId")]
	correlation_id: Option<String>,
}

#[derive(Deserialize)]
struct VehicleListPayload {
	vehicles: Option<Vec<Value>>,
}

/// Decodes a JSON body, reporting the failing path on error.
pub(crate) fn decode<T>(endpoint: &'static str, body: &[u8]) -> Result<T, ProtocolError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ProtocolError::MalformedJson { endpoint, source })
}

/// Decodes an identity-provider envelope; only `statusCode == 200` yields a payload.
pub(crate) fn identity<T>(
	endpoint: &'static str,
	response: &HttpResponse,
) -> Result<IdentityOutcome<T>, ProtocolError>
where
	T: DeserializeOwned,
{
	let status = decode::<IdentityStatus>(endpoint, &response.body)?;

	if status.status_code == Some(IDENTITY_SUCCESS) {
		return decode(endpoint, &response.body).map(IdentityOutcome::Ok);
	}

	let message = status
		.error_details
		.filter(|details| !details.is_empty())
		.or(status.error_message)
		.unwrap_or_else(|| UNKNOWN_ERROR.to_owned());

	Ok(IdentityOutcome::Err(IdentityFailure::new(status.status_code, message)))
}

/// Returns `true` when the body is an identity-provider envelope with a `statusCode`.
pub(crate) fn carries_identity_status(response: &HttpResponse) -> bool {
	serde_json::from_slice::<IdentityStatus>(&response.body)
		.is_ok_and(|status| status.status_code.is_some())
}

/// Decodes a PIN step-up response; an absent or empty `token` means denial.
pub(crate) fn pin_auth(response: &HttpResponse) -> Result<PinAuthOutcome, ProtocolError> {
	let payload = decode::<PinAuthPayload>("pin_authenticate", &response.body)?;

	Ok(match payload.token.filter(|token| !token.is_empty()) {
		Some(token) => PinAuthOutcome::Granted(StepUpToken::new(token)),
		None => PinAuthOutcome::Denied,
	})
}

/// Decodes a command response; only `responseStatus == "pending"` counts as accepted.
pub(crate) fn command(response: &HttpResponse) -> Result<CommandOutcome, ProtocolError> {
	let payload = decode::<CommandPayload>("command", &response.body)?;

	Ok(match payload.response_status.as_deref() {
		Some(COMMAND_PENDING) => CommandOutcome::Pending { correlation_id: payload.correlation_id },
		_ => CommandOutcome::Rejected {
			message: payload.debug_msg.unwrap_or_else(|| UNKNOWN_ERROR.to_owned()),
		},
	})
}

/// Extracts the `vehicles` array from the list endpoint.
pub(crate) fn vehicle_list(response: &HttpResponse) -> Result<Vec<Value>, ProtocolError> {
	decode::<VehicleListPayload>("list_vehicles", &response.body)?
		.vehicles
		.ok_or(ProtocolError::MissingField { endpoint: "list_vehicles", field: "vehicles" })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn ok(body: &str) -> HttpResponse {
		HttpResponse { status: 200, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn identity_envelope_requires_status_200() {
		let outcome = identity::<JwtPayload>("jwt", &ok(r#"{"statusCode":200,"id_token":"jwt"}"#))
			.expect("Valid envelope should decode.");

		assert!(matches!(
			outcome,
			IdentityOutcome::Ok(JwtPayload { id_token: Some(ref token) }) if token == "jwt"
		));

		let outcome = identity::<JwtPayload>(
			"jwt",
			&ok(r#"{"statusCode":403,"errorMessage":"Invalid LoginID","errorDetails":""}"#),
		)
		.expect("Failure envelope should decode.");

		assert!(matches!(
			outcome,
			IdentityOutcome::Err(ref failure)
				if failure.status_code == Some(403) && failure.message == "Invalid LoginID"
		));

		let outcome = identity::<BootstrapPayload>("bootstrap", &ok("{}"))
			.expect("Envelope without statusCode should decode.");

		assert!(matches!(
			outcome,
			IdentityOutcome::Err(ref failure)
				if failure.status_code.is_none() && failure.message == UNKNOWN_ERROR
		));
	}

	#[test]
	fn identity_status_detection_ignores_non_envelopes() {
		let envelope = HttpResponse {
			status: 403,
			body: br#"{"statusCode":403,"errorDetails":"invalid loginID or password"}"#.to_vec(),
		};

		assert!(carries_identity_status(&envelope));
		assert!(!carries_identity_status(&HttpResponse {
			status: 502,
			body: b"<html>Bad Gateway</html>".to_vec(),
		}));
		assert!(!carries_identity_status(&HttpResponse {
			status: 503,
			body: br#"{"message":"Service Unavailable"}"#.to_vec(),
		}));
	}

	#[test]
	fn malformed_json_reports_path() {
		let err = identity::<LoginPayload>("login", &ok(r#"{"statusCode":"two hundred"}"#))
			.expect_err("A string status code is malformed.");

		match err {
			ProtocolError::MalformedJson { endpoint, source } => {
				assert_eq!(endpoint, "login");
				assert_eq!(source.path().to_string(), "statusCode");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn command_outcomes_follow_response_status() {
		assert_eq!(
			command(&ok(r#"{"responseStatus":"pending","correlationId":"c-1"}"#))
				.expect("Pending response should decode."),
			CommandOutcome::Pending { correlation_id: Some("c-1".into()) }
		);
		assert_eq!(
			command(&ok(r#"{"responseStatus":"failed","debugMsg":"vehicle offline"}"#))
				.expect("Failed response should decode."),
			CommandOutcome::Rejected { message: "vehicle offline".into() }
		);
		assert_eq!(
			command(&ok("{}")).expect("Empty response should decode."),
			CommandOutcome::Rejected { message: UNKNOWN_ERROR.into() }
		);
	}

	#[test]
	fn pin_auth_without_token_is_denied() {
		assert!(matches!(pin_auth(&ok("{}")), Ok(PinAuthOutcome::Denied)));
		assert!(matches!(pin_auth(&ok(r#"{"token":""}"#)), Ok(PinAuthOutcome::Denied)));
		assert!(matches!(pin_auth(&ok(r#"{"token":"t-1"}"#)), Ok(PinAuthOutcome::Granted(_))));
	}

	#[test]
	fn expiration_accepts_epoch_and_rfc3339() {
		let epoch: Expiration =
			serde_json::from_str("1735693200.0").expect("Epoch expiration should decode.");
		let text: Expiration = serde_json::from_str("\"2025-01-01T01:00:00Z\"")
			.expect("RFC 3339 expiration should decode.");

		assert_eq!(epoch.to_datetime(), text.to_datetime());
		assert!(epoch.to_datetime().is_some());
	}

	#[test]
	fn vehicle_list_requires_vehicles_field() {
		assert_eq!(
			vehicle_list(&ok(r#"{"vehicles":[{"vin":"V1"}]}"#))
				.expect("List should decode.")
				.len(),
			1
		);
		assert!(matches!(
			vehicle_list(&ok(r#"{"userid":"u"}"#)),
			Err(ProtocolError::MissingField { field: "vehicles", .. })
		));
	}
}
