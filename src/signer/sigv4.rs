//! AWS Signature Version 4 request signing with temporary federated credentials.

// std
use std::collections::BTreeMap;
// crates.io
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use sha2::{Digest, Sha256};
use time::macros::format_description;
// self
use crate::{_prelude::*, auth::Credential, error::ConfigError, signer::RequestSigner};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const AMZ_DATE: &str = "x-amz-date";
const AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
const AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// Signs requests for an API Gateway-style service with a temporary [`Credential`].
#[derive(Clone)]
pub struct SigV4Signer {
	service: String,
	region: String,
	credential: Credential,
}
impl SigV4Signer {
	/// Service name vehicle API gateways expect.
	pub const DEFAULT_SERVICE: &'static str = "execute-api";

	/// Builds a signer for the provided service and region.
	pub fn new(
		service: impl Into<String>,
		region: impl Into<String>,
		credential: Credential,
	) -> Self {
		Self { service: service.into(), region: region.into(), credential }
	}

	/// Returns the credential backing this signer.
	pub fn credential(&self) -> &Credential {
		&self.credential
	}

	/// Returns the signing service name.
	pub fn service(&self) -> &str {
		&self.service
	}

	/// Returns the signing region.
	pub fn region(&self) -> &str {
		&self.region
	}

	fn credential_scope(&self, date_stamp: &str) -> String {
		format!("{date_stamp}/{}/{}/aws4_request", self.region, self.service)
	}
}
impl Debug for SigV4Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigV4Signer")
			.field("service", &self.service)
			.field("region", &self.region)
			.field("credential", &self.credential)
			.finish()
	}
}
impl RequestSigner for SigV4Signer {
	fn sign(
		&self,
		request: &mut ReqwestRequest,
		instant: OffsetDateTime,
	) -> Result<(), ConfigError> {
		let instant = instant.to_offset(time::UtcOffset::UTC);
		let amz_date = instant
			.format(format_description!("[year][month][day]T[hour][minute][second]Z"))
			.map_err(|_| ConfigError::InvalidHeader { name: AMZ_DATE })?;
		let date_stamp = amz_date[..8].to_owned();
		let payload_hash =
			hex_sha256(request.body().and_then(|body| body.as_bytes()).unwrap_or_default());
		let headers = request.headers_mut();

		headers.insert(AMZ_DATE, header_value(AMZ_DATE, &amz_date)?);
		headers.insert(
			AMZ_SECURITY_TOKEN,
			header_value(AMZ_SECURITY_TOKEN, self.credential.session_token.expose())?,
		);
		headers.insert(AMZ_CONTENT_SHA256, header_value(AMZ_CONTENT_SHA256, &payload_hash)?);

		let signed = signed_headers(request)?;
		let canonical = canonical_request(
			request.method().as_str(),
			request.url(),
			&signed,
			&payload_hash,
		);
		let scope = self.credential_scope(&date_stamp);
		let signature = signature(
			self.credential.secret_key.expose(),
			&date_stamp,
			&self.region,
			&self.service,
			&string_to_sign(&amz_date, &scope, &canonical),
		);
		let names = signed.keys().map(String::as_str).collect::<Vec<_>>().join(";");
		let authorization = format!(
			"{ALGORITHM} Credential={}/{scope}, SignedHeaders={names}, Signature={signature}",
			self.credential.access_key_id
		);

		request.headers_mut().insert(AUTHORIZATION, header_value("authorization", &authorization)?);

		Ok(())
	}
}

/// Collects `host`, `content-type`, and every `x-amz-*` header, keyed by lowercase name.
fn signed_headers(request: &ReqwestRequest) -> Result<BTreeMap<String, String>, ConfigError> {
	let url = request.url();
	let mut signed = BTreeMap::new();
	let host = match (url.host_str(), url.port()) {
		(Some(host), Some(port)) => format!("{host}:{port}"),
		(Some(host), None) => host.to_owned(),
		(None, _) => return Err(ConfigError::InvalidHeader { name: "host" }),
	};

	signed.insert("host".to_owned(), host);

	for (name, value) in request.headers() {
		let key = name.as_str();

		if key == CONTENT_TYPE.as_str() || key.starts_with("x-amz-") {
			let value = value.to_str().map_err(|_| ConfigError::InvalidHeader { name: "x-amz-*" })?;

			signed.insert(key.to_owned(), value.trim().to_owned());
		}
	}

	Ok(signed)
}

fn canonical_request(
	method: &str,
	url: &Url,
	signed: &BTreeMap<String, String>,
	payload_hash: &str,
) -> String {
	let path = if url.path().is_empty() { "/" } else { url.path() };
	let mut query = url
		.query_pairs()
		.map(|(key, value)| (uri_encode(&key), uri_encode(&value)))
		.collect::<Vec<_>>();

	query.sort();

	let query = query.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
	let headers = signed.iter().map(|(k, v)| format!("{k}:{v}\n")).collect::<String>();
	let names = signed.keys().map(String::as_str).collect::<Vec<_>>().join(";");

	format!("{method}\n{path}\n{query}\n{headers}\n{names}\n{payload_hash}")
}

fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
	format!("{ALGORITHM}\n{amz_date}\n{scope}\n{}", hex_sha256(canonical_request.as_bytes()))
}

fn signature(
	secret_key: &str,
	date_stamp: &str,
	region: &str,
	service: &str,
	string_to_sign: &str,
) -> String {
	let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date_stamp.as_bytes());
	let k_region = hmac_sha256(&k_date, region.as_bytes());
	let k_service = hmac_sha256(&k_region, service.as_bytes());
	let k_signing = hmac_sha256(&k_service, b"aws4_request");

	hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
	let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");

	mac.update(data);

	mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
	hex::encode(Sha256::digest(data))
}

/// Percent-encodes everything except RFC 3986 unreserved characters.
fn uri_encode(value: &str) -> String {
	let mut encoded = String::with_capacity(value.len());

	for byte in value.bytes() {
		match byte {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' =>
				encoded.push(byte as char),
			_ => encoded.push_str(&format!("%{byte:02X}")),
		}
	}

	encoded
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
	HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader { name })
}
