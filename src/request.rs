//! Typed request builders, one per upstream endpoint.
//!
//! Each builder takes only the fields specific to its call and applies the fixed identity
//! parameters or vendor headers itself, so a call site documents the whole contract of the
//! request it sends. Builders never sign; the client signs the returned request when the
//! endpoint requires it.

// std
use std::collections::BTreeMap;
// crates.io
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::{AccountCredentials, AccountUid, CorrelationId, Secret, StepUpToken, Vin},
	brand::Brand,
	command::Command,
	error::ConfigError,
};

const SDK_BUILD: &str = "12234";
const LOGIN_SESSION_EXPIRATION_SECS: &str = "300";
const LOGIN_INCLUDE: &str = "profile,data,emails,subscriptions,preferences";
const JWT_FIELDS: &str =
	"profile.firstName,profile.lastName,profile.email,country,locale,data.disclaimerCodeGSDP";
const FEDERATION_TARGET: &str = "AWSCognitoIdentityService.GetCredentialsForIdentity";
const FEDERATION_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const FEDERATION_LOGIN_PROVIDER: &str = "cognito-identity.amazonaws.com";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Vehicle documents exposed by the read-only vehicle API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VehicleResource {
	/// Every vehicle attached to the account.
	List,
	/// Detailed vehicle info and status.
	Vehicle(Vin),
	/// Remote-operation status (locks, climate, etc.).
	RemoteStatus(Vin),
	/// Last reported location.
	LastKnownLocation(Vin),
}
impl VehicleResource {
	/// Stable label used in spans and errors.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::List => "list_vehicles",
			Self::Vehicle(_) => "get_vehicle",
			Self::RemoteStatus(_) => "get_vehicle_status",
			Self::LastKnownLocation(_) => "get_vehicle_location",
		}
	}

	/// Versioned path for the resource under the account `uid`.
	pub fn path(&self, uid: &AccountUid) -> String {
		match self {
			Self::List => format!("/v4/accounts/{uid}/vehicles"),
			Self::Vehicle(vin) => format!("/v2/accounts/{uid}/vehicles/{vin}/status"),
			Self::RemoteStatus(vin) => format!("/v1/accounts/{uid}/vehicles/{vin}/remote/status"),
			Self::LastKnownLocation(vin) =>
				format!("/v1/accounts/{uid}/vehicles/{vin}/location/lastknown"),
		}
	}

	fn query(&self) -> &'static [(&'static str, &'static str)] {
		match self {
			Self::List => &[("stage", "ALL")],
			_ => &[],
		}
	}
}

#[derive(Serialize)]
struct TokenVendingBody<'a> {
	gigya_token: &'a str,
}

#[derive(Serialize)]
struct FederationBody<'a> {
	#[serde(rename = "IdentityId")]
	identity_id: &'a str,
	#[serde(rename = "Logins")]
	logins: BTreeMap<&'static str, &'a str>,
}

#[derive(Serialize)]
struct PinBody {
	pin: String,
}

#[derive(Serialize)]
struct CommandBody<'a> {
	command: &'a str,
	#[serde(rename = "pinAuth")]
	pin_auth: String,
}

/// `GET accounts.webSdkBootstrap`: confirms the identity-provider API key.
pub fn bootstrap(client: &ReqwestClient, brand: &Brand) -> Result<ReqwestRequest> {
	let url = brand.login_endpoint("accounts.webSdkBootstrap")?;

	build(client.get(url).query(&[("apiKey", brand.login_api_key.as_str())]))
}

/// `POST accounts.login`: exchanges account credentials for a UID and login token.
pub fn account_login(
	client: &ReqwestClient,
	brand: &Brand,
	account: &AccountCredentials,
) -> Result<ReqwestRequest> {
	let url = brand.login_endpoint("accounts.login")?;
	let mut params = identity_params(brand);

	params.extend([
		("loginID", account.login_id.as_str()),
		("password", account.password.expose()),
		("sessionExpiration", LOGIN_SESSION_EXPIRATION_SECS),
		("include", LOGIN_INCLUDE),
	]);

	build(client.post(url).query(&params))
}

/// `POST accounts.getJWT`: exchanges the login token for a signed identity assertion.
pub fn jwt_exchange(
	client: &ReqwestClient,
	brand: &Brand,
	login_token: &Secret,
) -> Result<ReqwestRequest> {
	let url = brand.login_endpoint("accounts.getJWT")?;
	let mut params = identity_params(brand);

	params.extend([("login_token", login_token.expose()), ("fields", JWT_FIELDS)]);

	build(client.post(url).query(&params))
}

/// `POST` to the manufacturer token endpoint: trades the identity assertion for an
/// identity-pool id and federation token.
pub fn token_vending(
	client: &ReqwestClient,
	brand: &Brand,
	id_token: &Secret,
	correlation: &CorrelationId,
) -> Result<ReqwestRequest> {
	let headers = vendor_headers(&brand.api_key, correlation)?;

	build(
		client
			.post(brand.endpoints.token.clone())
			.headers(headers)
			.json(&TokenVendingBody { gigya_token: id_token.expose() }),
	)
}

/// `GetCredentialsForIdentity` against the identity-pool federation service.
pub fn federation(
	client: &ReqwestClient,
	brand: &Brand,
	identity_id: &str,
	token: &Secret,
) -> Result<ReqwestRequest> {
	let body = FederationBody {
		identity_id,
		logins: BTreeMap::from([(FEDERATION_LOGIN_PROVIDER, token.expose())]),
	};

	build(
		client
			.post(brand.endpoints.identity.clone())
			.header("x-amz-target", FEDERATION_TARGET)
			.header(CONTENT_TYPE, FEDERATION_CONTENT_TYPE)
			.json(&body),
	)
}

/// Signed-ready `GET` for one vehicle document.
pub fn vehicle_read(
	client: &ReqwestClient,
	brand: &Brand,
	uid: &AccountUid,
	resource: &VehicleResource,
	correlation: &CorrelationId,
) -> Result<ReqwestRequest> {
	let url = brand.api_endpoint(&resource.path(uid))?;
	let headers = json_headers(&brand.api_key, correlation)?;
	let mut builder = client.get(url).headers(headers);

	if !resource.query().is_empty() {
		builder = builder.query(resource.query());
	}

	build(builder)
}

/// Signed-ready PIN step-up `POST`, authenticated with the brand's auth API key.
pub fn pin_authenticate(
	client: &ReqwestClient,
	brand: &Brand,
	uid: &AccountUid,
	account: &AccountCredentials,
	correlation: &CorrelationId,
) -> Result<ReqwestRequest> {
	let url = brand.auth_endpoint(&format!("/v1/accounts/{uid}/ignite/pin/authenticate"))?;
	let headers = json_headers(&brand.auth_api_key, correlation)?;

	build(client.post(url).headers(headers).json(&PinBody { pin: account.encoded_pin() }))
}

/// Signed-ready command `POST`; consumes the step-up token so it cannot be reused.
pub fn command(
	client: &ReqwestClient,
	brand: &Brand,
	uid: &AccountUid,
	vin: &Vin,
	command: &Command,
	token: StepUpToken,
	correlation: &CorrelationId,
) -> Result<ReqwestRequest> {
	let url = brand.api_endpoint(&format!("/v1/accounts/{uid}/vehicles/{vin}/{}", command.path()))?;
	let headers = json_headers(&brand.api_key, correlation)?;
	let body = CommandBody { command: command.name(), pin_auth: token.into_inner() };

	build(client.post(url).headers(headers).json(&body))
}

fn identity_params(brand: &Brand) -> Vec<(&'static str, &str)> {
	vec![
		("targetEnv", "jssdk"),
		("loginMode", "standard"),
		("sdk", "js_latest"),
		("authMode", "cookie"),
		("sdkBuild", SDK_BUILD),
		("format", "json"),
		("APIKey", brand.login_api_key.as_str()),
	]
}

/// Fixed vendor header set with the per-call API key and correlation id.
fn vendor_headers(api_key: &str, correlation: &CorrelationId) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::new();

	headers.insert(HeaderName::from_static("x-clientapp-name"), HeaderValue::from_static("CWP"));
	headers.insert(HeaderName::from_static("x-clientapp-version"), HeaderValue::from_static("1.0"));
	headers.insert(
		HeaderName::from_static("clientrequestid"),
		HeaderValue::from_str(correlation.as_str())
			.map_err(|_| ConfigError::InvalidHeader { name: "clientrequestid" })?,
	);
	headers.insert(
		HeaderName::from_static("x-api-key"),
		HeaderValue::from_str(api_key).map_err(|_| ConfigError::InvalidHeader { name: "x-api-key" })?,
	);
	headers.insert(HeaderName::from_static("locale"), HeaderValue::from_static("de_de"));
	headers.insert(HeaderName::from_static("x-originator-type"), HeaderValue::from_static("web"));

	Ok(headers)
}

fn json_headers(api_key: &str, correlation: &CorrelationId) -> Result<HeaderMap, ConfigError> {
	let mut headers = vendor_headers(api_key, correlation)?;

	headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

	Ok(headers)
}

fn build(builder: reqwest::RequestBuilder) -> Result<ReqwestRequest> {
	builder.build().map_err(|err| ConfigError::from(err).into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::Method;
	// self
	use super::*;

	fn brand() -> Brand {
		let url = |value: &str| Url::parse(value).expect("Failed to parse brand fixture URL.");

		Brand::builder("fiat", "eu-west-1")
			.login_api_key("login-key")
			.api_key("api-key")
			.auth_api_key("auth-key")
			.login_endpoint(url("https://login.example.com"))
			.token_endpoint(url("https://token.example.com/v1/token"))
			.api_endpoint(url("https://api.example.com"))
			.auth_endpoint(url("https://pin.example.com"))
			.build()
			.expect("Brand fixture should build.")
	}

	fn header<'a>(request: &'a ReqwestRequest, name: &str) -> Option<&'a str> {
		request.headers().get(name).and_then(|value| value.to_str().ok())
	}

	#[test]
	fn login_merges_identity_defaults_with_account_fields() {
		let client = ReqwestClient::new();
		let account = AccountCredentials::new("driver@example.com", "hunter2", "1234");
		let request =
			account_login(&client, &brand(), &account).expect("Login request should build.");
		let query = request.url().query_pairs().into_owned().collect::<BTreeMap<_, _>>();

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.url().path(), "/accounts.login");
		assert_eq!(query.get("targetEnv").map(String::as_str), Some("jssdk"));
		assert_eq!(query.get("sdkBuild").map(String::as_str), Some("12234"));
		assert_eq!(query.get("APIKey").map(String::as_str), Some("login-key"));
		assert_eq!(query.get("loginID").map(String::as_str), Some("driver@example.com"));
		assert_eq!(query.get("sessionExpiration").map(String::as_str), Some("300"));
	}

	#[test]
	fn vendor_calls_carry_the_fixed_header_set() {
		let client = ReqwestClient::new();
		let correlation = CorrelationId::generate();
		let request =
			token_vending(&client, &brand(), &Secret::new("jwt"), &correlation)
				.expect("Token vending request should build.");

		assert_eq!(header(&request, "x-clientapp-name"), Some("CWP"));
		assert_eq!(header(&request, "x-clientapp-version"), Some("1.0"));
		assert_eq!(header(&request, "clientrequestid"), Some(correlation.as_str()));
		assert_eq!(header(&request, "x-api-key"), Some("api-key"));
		assert_eq!(header(&request, "locale"), Some("de_de"));
		assert_eq!(header(&request, "x-originator-type"), Some("web"));

		let body = request.body().and_then(|b| b.as_bytes()).expect("Body should be buffered.");

		assert_eq!(body, br#"{"gigya_token":"jwt"}"#);
	}

	#[test]
	fn vehicle_paths_are_versioned_per_resource() {
		let client = ReqwestClient::new();
		let uid = AccountUid::new("uid-1").expect("UID fixture should be valid.");
		let vin = Vin::new("ZFA3120000J000001").expect("VIN fixture should be valid.");
		let list = vehicle_read(
			&client,
			&brand(),
			&uid,
			&VehicleResource::List,
			&CorrelationId::generate(),
		)
		.expect("List request should build.");

		assert_eq!(list.url().as_str(), "https://api.example.com/v4/accounts/uid-1/vehicles?stage=ALL");
		assert_eq!(header(&list, "content-type"), Some("application/json"));
		assert_eq!(
			VehicleResource::LastKnownLocation(vin.clone()).path(&uid),
			"/v1/accounts/uid-1/vehicles/ZFA3120000J000001/location/lastknown"
		);
		assert_eq!(
			VehicleResource::RemoteStatus(vin.clone()).path(&uid),
			"/v1/accounts/uid-1/vehicles/ZFA3120000J000001/remote/status"
		);
		assert_eq!(
			VehicleResource::Vehicle(vin).path(&uid),
			"/v2/accounts/uid-1/vehicles/ZFA3120000J000001/status"
		);
	}

	#[test]
	fn pin_and_command_use_their_own_keys() {
		let client = ReqwestClient::new();
		let brand = brand();
		let uid = AccountUid::new("uid-1").expect("UID fixture should be valid.");
		let vin = Vin::new("ZFA3120000J000001").expect("VIN fixture should be valid.");
		let account = AccountCredentials::new("driver@example.com", "hunter2", "1234");
		let pin = pin_authenticate(&client, &brand, &uid, &account, &CorrelationId::generate())
			.expect("PIN request should build.");

		assert_eq!(
			pin.url().as_str(),
			"https://pin.example.com/v1/accounts/uid-1/ignite/pin/authenticate"
		);
		assert_eq!(header(&pin, "x-api-key"), Some("auth-key"));
		assert_eq!(pin.body().and_then(|b| b.as_bytes()), Some(&br#"{"pin":"MTIzNA=="}"#[..]));

		let command = command(
			&client,
			&brand,
			&uid,
			&vin,
			&Command::LOCK_DOORS,
			StepUpToken::new("step-up"),
			&CorrelationId::generate(),
		)
		.expect("Command request should build.");

		assert_eq!(
			command.url().as_str(),
			"https://api.example.com/v1/accounts/uid-1/vehicles/ZFA3120000J000001/remote"
		);
		assert_eq!(header(&command, "x-api-key"), Some("api-key"));
		assert_eq!(
			command.body().and_then(|b| b.as_bytes()),
			Some(&br#"{"command":"RDL","pinAuth":"step-up"}"#[..])
		);
	}

	#[test]
	fn federation_uses_the_json_1_1_protocol() {
		let client = ReqwestClient::new();
		let request = federation(&client, &brand(), "eu-west-1:pool-id", &Secret::new("pool-token"))
			.expect("Federation request should build.");

		assert_eq!(request.url().as_str(), "https://cognito-identity.eu-west-1.amazonaws.com/");
		assert_eq!(header(&request, "x-amz-target"), Some(FEDERATION_TARGET));
		assert_eq!(header(&request, "content-type"), Some(FEDERATION_CONTENT_TYPE));

		let body: Value = serde_json::from_slice(
			request.body().and_then(|b| b.as_bytes()).expect("Body should be buffered."),
		)
		.expect("Federation body should be JSON.");

		assert_eq!(body["IdentityId"], "eu-west-1:pool-id");
		assert_eq!(body["Logins"]["cognito-identity.amazonaws.com"], "pool-token");
	}
}
