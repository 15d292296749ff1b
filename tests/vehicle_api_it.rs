mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use vehicle_cloud_client::{
	auth::Vin,
	error::{Error, ProtocolError},
};

fn vin() -> Vin {
	Vin::new(VIN).expect("VIN fixture should be valid.")
}

#[tokio::test]
async fn reads_are_signed_and_reuse_one_login() {
	let server = MockServer::start_async().await;
	let mocks = mount_login_chain(&server).await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/api/v4/accounts/{UID}/vehicles"))
				.query_param("stage", "ALL")
				.header("x-api-key", "api-key")
				.header("x-amz-security-token", SESSION_TOKEN)
				.header_exists("authorization")
				.header_exists("x-amz-date")
				.header_matches("clientrequestid", "^[0-9A-F]{16}$");
			then.status(200).json_body(json!({ "userid": UID, "vehicles": [{ "vin": VIN }] }));
		})
		.await;
	let location = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/api/v1/accounts/{UID}/vehicles/{VIN}/location/lastknown"))
				.header_exists("authorization");
			then.status(200).json_body(json!({ "latitude": 45.07, "longitude": 7.68 }));
		})
		.await;
	let client = client(&server);
	let vehicles = client.list_vehicles().await.expect("Vehicle list should load.");

	assert_eq!(vehicles, vec![json!({ "vin": VIN })]);

	let document =
		client.get_vehicle_location(&vin()).await.expect("Vehicle location should load.");

	assert_eq!(document["latitude"], json!(45.07));

	list.assert_async().await;
	location.assert_async().await;
	mocks.bootstrap.assert_calls_async(1).await;

	assert_eq!(client.login_metrics().attempts(), 1);
}

#[tokio::test]
async fn vehicle_status_documents_are_returned_whole() {
	let server = MockServer::start_async().await;

	mount_login_chain(&server).await;

	let status = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v2/accounts/{UID}/vehicles/{VIN}/status"));
			then.status(200).json_body(json!({ "evInfo": { "battery": { "stateOfCharge": 80 } } }));
		})
		.await;
	let remote = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v1/accounts/{UID}/vehicles/{VIN}/remote/status"));
			then.status(200).json_body(json!({ "doors": { "driver": { "status": "LOCKED" } } }));
		})
		.await;
	let client = client(&server);
	let vehicle = client.get_vehicle(&vin()).await.expect("Vehicle document should load.");
	let remote_status =
		client.get_vehicle_status(&vin()).await.expect("Remote status should load.");

	assert_eq!(vehicle["evInfo"]["battery"]["stateOfCharge"], json!(80));
	assert_eq!(remote_status["doors"]["driver"]["status"], json!("LOCKED"));

	status.assert_async().await;
	remote.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_hard_failure() {
	let server = MockServer::start_async().await;

	mount_login_chain(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v1/accounts/{UID}/vehicles/{VIN}/remote/status"));
			then.status(503).body("maintenance");
		})
		.await;

	let err = client(&server)
		.get_vehicle_status(&vin())
		.await
		.expect_err("A 503 should surface to the caller.");

	assert!(err.is_transient());
	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::UnexpectedStatus {
			endpoint: "get_vehicle_status",
			status: 503,
			ref body_preview,
		}) if body_preview == "maintenance"
	));
}

#[tokio::test]
async fn list_without_vehicles_field_is_rejected() {
	let server = MockServer::start_async().await;

	mount_login_chain(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v4/accounts/{UID}/vehicles"));
			then.status(200).json_body(json!({ "userid": UID }));
		})
		.await;

	let err = client(&server).list_vehicles().await.expect_err("Missing vehicles should fail.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::MissingField { field: "vehicles", .. })
	));
}

#[tokio::test]
async fn reads_fail_without_login_when_identity_rejects() {
	let server = MockServer::start_async().await;

	mount_bootstrap(&server, json!({ "statusCode": 403, "errorMessage": "Forbidden" })).await;

	let list = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/api/v4/accounts/{UID}/vehicles"));
			then.status(200).json_body(json!({ "vehicles": [] }));
		})
		.await;
	let err = client(&server).list_vehicles().await.expect_err("Login failure should surface.");

	assert!(matches!(err, Error::BootstrapFailed(_)));

	list.assert_calls_async(0).await;
}
