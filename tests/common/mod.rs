//! Shared fixtures for the mock-server integration tests.

#![allow(dead_code)]

// crates.io
use httpmock::{Mock, prelude::*};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use vehicle_cloud_client::{
	Client,
	auth::AccountCredentials,
	brand::Brand,
	http::ReqwestHttpClient,
};

pub const UID: &str = "uid-1";
pub const VIN: &str = "ZFA3120000J000001";
pub const PIN: &str = "1234";
pub const ENCODED_PIN: &str = "MTIzNA==";
pub const ACCESS_KEY_ID: &str = "ASIAEXAMPLE";
pub const SESSION_TOKEN: &str = "federated-session-token";

/// Handles for every step of the login chain.
pub struct LoginMocks<'a> {
	pub bootstrap: Mock<'a>,
	pub login: Mock<'a>,
	pub jwt: Mock<'a>,
	pub token: Mock<'a>,
	pub federation: Mock<'a>,
}

fn url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Mock endpoint should parse.")
}

pub fn brand(server: &MockServer) -> Brand {
	Brand::builder("fiat", "eu-west-1")
		.login_api_key("login-key")
		.api_key("api-key")
		.auth_api_key("auth-key")
		.login_endpoint(url(server, "/login"))
		.token_endpoint(url(server, "/token"))
		.api_endpoint(url(server, "/api"))
		.auth_endpoint(url(server, "/auth"))
		.identity_endpoint(url(server, "/identity"))
		.build()
		.expect("Mock brand should build.")
}

pub fn client(server: &MockServer) -> Client {
	Client::with_http_client(
		brand(server),
		AccountCredentials::new("driver@example.com", "hunter2", PIN),
		ReqwestHttpClient::new().expect("Default HTTP client should build."),
	)
}

pub async fn mount_bootstrap<'a>(server: &'a MockServer, body: serde_json::Value) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/login/accounts.webSdkBootstrap")
				.query_param("apiKey", "login-key");
			then.status(200).json_body(body);
		})
		.await
}

pub async fn mount_account_login<'a>(server: &'a MockServer, body: serde_json::Value) -> Mock<'a> {
	mount_account_login_with_status(server, 200, body).await
}

pub async fn mount_account_login_with_status<'a>(
	server: &'a MockServer,
	status: u16,
	body: serde_json::Value,
) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/login/accounts.login")
				.query_param("loginID", "driver@example.com")
				.query_param("password", "hunter2")
				.query_param("APIKey", "login-key")
				.query_param("sdkBuild", "12234");
			then.status(status).json_body(body);
		})
		.await
}

pub async fn mount_jwt<'a>(server: &'a MockServer, body: serde_json::Value) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/login/accounts.getJWT")
				.query_param("login_token", "login-token");
			then.status(200).json_body(body);
		})
		.await
}

/// Mounts a `getJWT` reply that is not an identity envelope, such as a gateway error page.
pub async fn mount_jwt_raw<'a>(server: &'a MockServer, status: u16, body: &str) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/login/accounts.getJWT");
			then.status(status).body(body);
		})
		.await
}

pub async fn mount_token<'a>(
	server: &'a MockServer,
	status: u16,
	body: serde_json::Value,
) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("x-api-key", "api-key")
				.header("x-clientapp-name", "CWP")
				.json_body(json!({ "gigya_token": "id-token" }));
			then.status(status).json_body(body);
		})
		.await
}

pub async fn mount_federation<'a>(
	server: &'a MockServer,
	status: u16,
	body: serde_json::Value,
) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity")
				.header("x-amz-target", "AWSCognitoIdentityService.GetCredentialsForIdentity")
				.json_body(json!({
					"IdentityId": "eu-west-1:identity",
					"Logins": { "cognito-identity.amazonaws.com": "pool-token" },
				}));
			then.status(status).json_body(body);
		})
		.await
}

pub fn federation_body(expires_in: Duration) -> serde_json::Value {
	let expiration = (OffsetDateTime::now_utc() + expires_in).unix_timestamp();

	json!({
		"IdentityId": "eu-west-1:identity",
		"Credentials": {
			"AccessKeyId": ACCESS_KEY_ID,
			"SecretKey": "federated-secret",
			"SessionToken": SESSION_TOKEN,
			"Expiration": expiration as f64,
		},
	})
}

/// Mounts a login chain where every step succeeds and credentials live for an hour.
pub async fn mount_login_chain(server: &MockServer) -> LoginMocks<'_> {
	mount_login_chain_expiring(server, Duration::hours(1)).await
}

pub async fn mount_login_chain_expiring(
	server: &MockServer,
	expires_in: Duration,
) -> LoginMocks<'_> {
	LoginMocks {
		bootstrap: mount_bootstrap(server, json!({ "statusCode": 200 })).await,
		login: mount_account_login(
			server,
			json!({
				"statusCode": 200,
				"UID": UID,
				"sessionInfo": { "login_token": "login-token" },
			}),
		)
		.await,
		jwt: mount_jwt(server, json!({ "statusCode": 200, "id_token": "id-token" })).await,
		token: mount_token(
			server,
			200,
			json!({ "IdentityId": "eu-west-1:identity", "Token": "pool-token" }),
		)
		.await,
		federation: mount_federation(server, 200, federation_body(expires_in)).await,
	}
}
