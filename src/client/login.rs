//! Federated login chain with single-flight refresh.
//!
//! The chain runs bootstrap → `accounts.login` → `accounts.getJWT` → token vending →
//! identity-pool federation, then swaps the account UID and a new signer into the store in
//! one write. Any failing step aborts the run and leaves the previous credential in place.

// self
use crate::{
	_prelude::*,
	auth::{AccountUid, CorrelationId, Credential, Freshness, Secret},
	client::{self, Client},
	envelope::{
		self, BootstrapPayload, Expiration, FederationPayload, IdentityOutcome, JwtPayload,
		LoginPayload, ServiceFault, TokenVendingPayload,
	},
	error::{IdentityFailure, IssuanceStage},
	http::HttpResponse,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	request,
	signer::SigV4Signer,
	store::StoredCredential,
};

const KIND: FlowKind = FlowKind::Login;

impl Client {
	/// Runs the full login chain unconditionally and stores the result.
	///
	/// Waits for any login already in flight, then logs in again regardless of freshness.
	pub async fn login(&self) -> Result<()> {
		let _singleflight = self.session.guard().lock().await;

		self.run_login().await.map(|_| ())
	}

	/// Makes sure the stored credential outlives the freshness margin, logging in if needed.
	///
	/// Concurrent callers that find the store stale share a single login run.
	pub async fn ensure_fresh(&self) -> Result<()> {
		self.fresh_credential().await.map(|_| ())
	}

	pub(crate) async fn fresh_credential(&self) -> Result<StoredCredential> {
		if let Some(entry) = self.session.store().fresh(OffsetDateTime::now_utc(), &self.freshness)
		{
			return Ok(entry);
		}

		let _singleflight = self.session.guard().lock().await;

		// Another caller may have logged in while this one waited on the guard.
		if let Some(entry) = self.session.store().fresh(OffsetDateTime::now_utc(), &self.freshness)
		{
			return Ok(entry);
		}

		let entry = self.run_login().await?;

		if self.freshness.evaluate(Some(entry.expires_at()), OffsetDateTime::now_utc())
			== Freshness::Stale
		{
			return Err(issuance_failure(
				IssuanceStage::Federation,
				None,
				"issued credential expires inside the freshness margin",
			));
		}

		Ok(entry)
	}

	/// Runs the chain; callers must hold the session guard.
	async fn run_login(&self) -> Result<StoredCredential> {
		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.login_metrics.record_attempt();

		let result = span.instrument(self.login_chain()).await;

		match &result {
			Ok(entry) => {
				self.session.store().replace(entry.clone());
				self.login_metrics.record_success();
			},
			Err(_) => self.login_metrics.record_failure(),
		}

		client::record_outcome(KIND, &result);

		result
	}

	async fn login_chain(&self) -> Result<StoredCredential> {
		let http = self.session.http();

		// 1. Bootstrap.
		let response = self.login_step("bootstrap", request::bootstrap(http, &self.brand)?).await?;

		if let IdentityOutcome::Err(failure) =
			envelope::identity::<BootstrapPayload>("bootstrap", &response)?
		{
			return Err(Error::BootstrapFailed(failure));
		}

		// 2. Primary login.
		let response = self
			.login_step("account_login", request::account_login(http, &self.brand, &self.account)?)
			.await?;
		let LoginPayload { uid, session_info } =
			match envelope::identity::<LoginPayload>("account_login", &response)? {
				IdentityOutcome::Ok(payload) => payload,
				IdentityOutcome::Err(failure) => return Err(Error::LoginFailed(failure)),
			};
		let uid = uid
			.ok_or_else(|| Error::LoginFailed(missing("UID")))
			.and_then(|uid| {
				AccountUid::new(uid)
					.map_err(|err| Error::LoginFailed(IdentityFailure::new(None, err.to_string())))
			})?;
		let login_token = session_info
			.and_then(|info| info.login_token)
			.filter(|token| !token.is_empty())
			.map(Secret::new)
			.ok_or_else(|| Error::LoginFailed(missing("sessionInfo.login_token")))?;

		// 3. Identity assertion.
		let response = self
			.login_step("jwt_exchange", request::jwt_exchange(http, &self.brand, &login_token)?)
			.await?;
		let id_token = match envelope::identity::<JwtPayload>("jwt_exchange", &response)? {
			IdentityOutcome::Ok(JwtPayload { id_token }) => id_token
				.filter(|token| !token.is_empty())
				.map(Secret::new)
				.ok_or_else(|| Error::JwtExchangeFailed(missing("id_token")))?,
			IdentityOutcome::Err(failure) => return Err(Error::JwtExchangeFailed(failure)),
		};

		// 4. Token vending.
		let correlation = CorrelationId::generate();
		let response = self
			.issuance_step(
				IssuanceStage::TokenVending,
				request::token_vending(http, &self.brand, &id_token, &correlation)?,
			)
			.await?;
		let payload = envelope::decode::<TokenVendingPayload>("token_vending", &response.body)?;
		let identity_id =
			required(IssuanceStage::TokenVending, &response, "IdentityId", payload.identity_id)?;
		let pool_token = required(IssuanceStage::TokenVending, &response, "Token", payload.token)
			.map(Secret::new)?;

		// 5. Federated credential issuance.
		let response = self
			.issuance_step(
				IssuanceStage::Federation,
				request::federation(http, &self.brand, &identity_id, &pool_token)?,
			)
			.await?;
		let credentials = envelope::decode::<FederationPayload>("federation", &response.body)?
			.credentials
			.ok_or_else(|| {
				issuance_failure(
					IssuanceStage::Federation,
					Some(response.status),
					"response is missing `Credentials`",
				)
			})?;
		let expires_at = credentials
			.expiration
			.as_ref()
			.and_then(Expiration::to_datetime)
			.ok_or_else(|| {
				issuance_failure(
					IssuanceStage::Federation,
					Some(response.status),
					"response has no valid `Expiration`",
				)
			})?;
		let credential = Credential::builder()
			.access_key_id(credentials.access_key_id.unwrap_or_default())
			.secret_key(credentials.secret_key.unwrap_or_default())
			.session_token(credentials.session_token.unwrap_or_default())
			.expires_at(expires_at)
			.build()
			.map_err(|err| {
				issuance_failure(IssuanceStage::Federation, Some(response.status), err.to_string())
			})?;

		if credential.is_expired_at(OffsetDateTime::now_utc()) {
			return Err(issuance_failure(
				IssuanceStage::Federation,
				Some(response.status),
				"issued credential is already expired",
			));
		}

		// 6. Signer.
		let signer = SigV4Signer::new(&self.signing_service, &self.brand.region, credential);

		Ok(StoredCredential::new(uid, signer))
	}

	/// Identity-provider step: the envelope `statusCode` carries the verdict whatever the HTTP
	/// status, so only non-2xx replies without an envelope are rejected here.
	async fn login_step(
		&self,
		stage: &'static str,
		outbound: ReqwestRequest,
	) -> Result<HttpResponse> {
		let response = FlowSpan::new(KIND, stage)
			.instrument(self.session.http().execute(stage, outbound))
			.await?;

		obs::record_step(KIND, stage, response.status);

		if response.is_success() || envelope::carries_identity_status(&response) {
			return Ok(response);
		}

		Err(client::unexpected_status(stage, &response).into())
	}

	async fn issuance_step(
		&self,
		stage: IssuanceStage,
		outbound: ReqwestRequest,
	) -> Result<HttpResponse> {
		let response = FlowSpan::new(KIND, stage.as_str())
			.instrument(self.session.http().execute(stage.as_str(), outbound))
			.await?;

		obs::record_step(KIND, stage.as_str(), response.status);

		if response.is_success() {
			return Ok(response);
		}

		let message = envelope::decode::<ServiceFault>(stage.as_str(), &response.body)
			.map(|fault| fault.describe())
			.unwrap_or_else(|_| response.body_preview());

		Err(issuance_failure(stage, Some(response.status), message))
	}
}

fn missing(field: &str) -> IdentityFailure {
	IdentityFailure::new(None, format!("response is missing `{field}`"))
}

fn required(
	stage: IssuanceStage,
	response: &HttpResponse,
	field: &str,
	value: Option<String>,
) -> Result<String> {
	value.filter(|value| !value.is_empty()).ok_or_else(|| {
		issuance_failure(stage, Some(response.status), format!("response is missing `{field}`"))
	})
}

fn issuance_failure(
	stage: IssuanceStage,
	status: Option<u16>,
	message: impl Into<String>,
) -> Error {
	Error::CredentialIssuanceFailed { stage, status, message: message.into() }
}
