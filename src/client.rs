//! Authenticated client facade over one account session.
//!
//! [`Client`] owns the brand descriptor, the account material, and the [`Session`]. The login
//! chain lives in `login`, PIN step-up in `step_up`, and the public vehicle surface in
//! `vehicle` and `command`; each adds an `impl Client` block.

mod command;
mod login;
mod metrics;
mod step_up;
mod vehicle;

pub use command::CommandReceipt;
pub use metrics::LoginMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccountCredentials, AccountUid, FreshnessPolicy},
	brand::Brand,
	error::ProtocolError,
	http::{HttpResponse, ReqwestHttpClient},
	obs::{self, FlowKind, FlowOutcome},
	session::Session,
	signer::{RequestSigner, SigV4Signer},
	store::StoredCredential,
};

/// Vehicle cloud client bound to a single brand and account.
///
/// Every operation first makes sure the stored credential outlives the freshness margin,
/// rerunning the federated login chain when it does not. Concurrent callers share one login.
pub struct Client {
	brand: Brand,
	account: AccountCredentials,
	session: Session,
	freshness: FreshnessPolicy,
	signing_service: String,
	login_metrics: LoginMetrics,
}
impl Client {
	/// Creates a client with its own cookie-enabled reqwest transport.
	pub fn new(brand: Brand, account: AccountCredentials) -> Result<Self> {
		Ok(Self::with_http_client(brand, account, ReqwestHttpClient::new()?))
	}

	/// Creates a client over a caller-provided transport.
	pub fn with_http_client(
		brand: Brand,
		account: AccountCredentials,
		http: ReqwestHttpClient,
	) -> Self {
		Self {
			brand,
			account,
			session: Session::new(http),
			freshness: FreshnessPolicy::default(),
			signing_service: SigV4Signer::DEFAULT_SERVICE.to_owned(),
			login_metrics: LoginMetrics::default(),
		}
	}

	/// Replaces the freshness policy used by [`Client::ensure_fresh`].
	pub fn with_freshness_policy(mut self, policy: FreshnessPolicy) -> Self {
		self.freshness = policy;

		self
	}

	/// Overrides the SigV4 service name used for signers built after the next login.
	pub fn with_signing_service(mut self, service: impl Into<String>) -> Self {
		self.signing_service = service.into();

		self
	}

	/// Brand descriptor this client talks to.
	pub fn brand(&self) -> &Brand {
		&self.brand
	}

	/// Session state shared by every call.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Login chain counters.
	pub fn login_metrics(&self) -> &LoginMetrics {
		&self.login_metrics
	}

	/// Account UID from the last successful login.
	pub fn uid(&self) -> Option<AccountUid> {
		self.session.store().snapshot().map(|entry| entry.uid)
	}

	/// Expiry of the stored credential, if a login has succeeded.
	pub fn credential_expires_at(&self) -> Option<OffsetDateTime> {
		self.session.store().expires_at()
	}

	async fn send_signed(
		&self,
		endpoint: &'static str,
		entry: &StoredCredential,
		mut request: ReqwestRequest,
	) -> Result<HttpResponse> {
		entry.signer.sign(&mut request, OffsetDateTime::now_utc())?;

		Ok(self.session.http().execute(endpoint, request).await?)
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("brand", &self.brand.name)
			.field("account", &self.account)
			.field("freshness", &self.freshness)
			.field("signing_service", &self.signing_service)
			.field("logged_in", &self.session.store().snapshot().is_some())
			.finish()
	}
}

fn ensure_success(endpoint: &'static str, response: &HttpResponse) -> Result<(), ProtocolError> {
	if response.is_success() { Ok(()) } else { Err(unexpected_status(endpoint, response)) }
}

fn unexpected_status(endpoint: &'static str, response: &HttpResponse) -> ProtocolError {
	ProtocolError::UnexpectedStatus {
		endpoint,
		status: response.status,
		body_preview: response.body_preview(),
	}
}

fn record_outcome<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(err) => {
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
			obs::record_failure(kind, err);
		},
	}
}
