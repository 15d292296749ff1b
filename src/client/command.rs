// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, Vin},
	client::{self, Client},
	command::Command,
	envelope::{self, CommandOutcome},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	request,
};

const KIND: FlowKind = FlowKind::Command;

/// Acknowledgement that a command entered the vehicle's queue.
///
/// Acceptance is not completion; the vehicle executes the command asynchronously.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandReceipt {
	/// Upstream correlation id for the queued command, when echoed.
	pub correlation_id: Option<String>,
}

impl Client {
	/// Submits `command` to the vehicle after a fresh PIN step-up.
	///
	/// Nothing is sent to the command endpoint unless the PIN endpoint grants a token.
	pub async fn command(&self, vin: &Vin, command: &Command) -> Result<CommandReceipt> {
		let span = FlowSpan::new(KIND, "command");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let entry = self.fresh_credential().await?;
				let token = self.authenticate_pin_with(&entry).await?;
				let outbound = request::command(
					self.session.http(),
					&self.brand,
					&entry.uid,
					vin,
					command,
					token,
					&CorrelationId::generate(),
				)?;
				let response = self.send_signed("command", &entry, outbound).await?;

				obs::record_step(KIND, "command", response.status);

				match (response.is_success(), envelope::command(&response)) {
					(_, Ok(CommandOutcome::Rejected { message })) =>
						Err(Error::CommandRejected { message }),
					(true, Ok(CommandOutcome::Pending { correlation_id })) =>
						Ok(CommandReceipt { correlation_id }),
					(true, Err(err)) => Err(err.into()),
					(false, _) => Err(client::unexpected_status("command", &response).into()),
				}
			})
			.await;

		client::record_outcome(KIND, &result);

		result
	}
}
