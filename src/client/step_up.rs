// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, StepUpToken},
	client::{self, Client},
	envelope::{self, PinAuthOutcome},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	request,
	store::StoredCredential,
};

const KIND: FlowKind = FlowKind::PinAuth;

impl Client {
	/// Exchanges the account PIN for a token authorizing exactly one command.
	///
	/// The token is never cached; each call hits the PIN endpoint again.
	pub async fn authenticate_pin(&self) -> Result<StepUpToken> {
		let entry = self.fresh_credential().await?;

		self.authenticate_pin_with(&entry).await
	}

	pub(crate) async fn authenticate_pin_with(
		&self,
		entry: &StoredCredential,
	) -> Result<StepUpToken> {
		let span = FlowSpan::new(KIND, "pin_authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let outbound = request::pin_authenticate(
					self.session.http(),
					&self.brand,
					&entry.uid,
					&self.account,
					&CorrelationId::generate(),
				)?;
				let response = self.send_signed("pin_authenticate", entry, outbound).await?;

				obs::record_step(KIND, "pin_authenticate", response.status);

				if !response.is_success() {
					return Err(Error::PinAuthFailed { status: response.status });
				}

				match envelope::pin_auth(&response)? {
					PinAuthOutcome::Granted(token) => Ok(token),
					PinAuthOutcome::Denied => Err(Error::PinAuthFailed { status: response.status }),
				}
			})
			.await;

		client::record_outcome(KIND, &result);

		result
	}
}
