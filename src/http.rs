//! Transport primitives shared by the login chain and the vehicle API.
//!
//! The client never retries and never follows redirects; every request maps to exactly one
//! [`HttpResponse`] or one [`TransportError`]. Cookies set by the identity provider persist
//! for the lifetime of the [`ReqwestHttpClient`].

// std
use std::ops::Deref;
// crates.io
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

const BODY_PREVIEW_LIMIT: usize = 512;

/// Buffered response returned by [`ReqwestHttpClient::execute`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 preview of the body, truncated for error messages.
	pub fn body_preview(&self) -> String {
		let text = String::from_utf8_lossy(&self.body);

		match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
			Some((cut, _)) => format!("{}... ({} bytes)", &text[..cut], self.body.len()),
			None => text.into_owned(),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestHttpClient::new`] enables the cookie jar the identity provider relies on and
/// disables redirects. Custom clients passed to [`ReqwestHttpClient::with_client`] should do
/// the same; timeouts belong on that client as well.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds the default client with a persistent cookie store.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends `request` and buffers the response body.
	pub async fn execute(
		&self,
		endpoint: &'static str,
		request: ReqwestRequest,
	) -> Result<HttpResponse, TransportError> {
		let response = self
			.0
			.execute(request)
			.await
			.map_err(|err| TransportError::network(endpoint, err))?;
		let status = response.status().as_u16();
		let body =
			response.bytes().await.map_err(|err| TransportError::network(endpoint, err))?.to_vec();

		Ok(HttpResponse { status, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_long_bodies() {
		let response = HttpResponse { status: 502, body: vec![b'x'; BODY_PREVIEW_LIMIT + 10] };
		let preview = response.body_preview();

		assert!(!response.is_success());
		assert!(preview.ends_with(&format!("... ({} bytes)", BODY_PREVIEW_LIMIT + 10)));

		let short = HttpResponse { status: 200, body: b"{}".to_vec() };

		assert!(short.is_success());
		assert_eq!(short.body_preview(), "{}");
	}
}
