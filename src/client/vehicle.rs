//! Read-only vehicle documents.
//!
//! Payloads are returned as opaque JSON; the client only checks the envelope.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, Vin},
	client::{self, Client},
	envelope,
	http::HttpResponse,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	request::{self, VehicleResource},
};

const KIND: FlowKind = FlowKind::VehicleRead;

impl Client {
	/// Lists every vehicle attached to the account.
	pub async fn list_vehicles(&self) -> Result<Vec<Value>> {
		let response = self.read(VehicleResource::List).await?;

		Ok(envelope::vehicle_list(&response)?)
	}

	/// Fetches detailed info and status for one vehicle.
	pub async fn get_vehicle(&self, vin: &Vin) -> Result<Value> {
		self.read_document(VehicleResource::Vehicle(vin.clone())).await
	}

	/// Fetches remote-operation status (locks, climate, etc.) for one vehicle.
	pub async fn get_vehicle_status(&self, vin: &Vin) -> Result<Value> {
		self.read_document(VehicleResource::RemoteStatus(vin.clone())).await
	}

	/// Fetches the last reported location of one vehicle.
	pub async fn get_vehicle_location(&self, vin: &Vin) -> Result<Value> {
		self.read_document(VehicleResource::LastKnownLocation(vin.clone())).await
	}

	async fn read_document(&self, resource: VehicleResource) -> Result<Value> {
		let label = resource.label();
		let response = self.read(resource).await?;

		Ok(envelope::decode(label, &response.body)?)
	}

	async fn read(&self, resource: VehicleResource) -> Result<HttpResponse> {
		let label = resource.label();
		let span = FlowSpan::new(KIND, label);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let entry = self.fresh_credential().await?;
				let outbound = request::vehicle_read(
					self.session.http(),
					&self.brand,
					&entry.uid,
					&resource,
					&CorrelationId::generate(),
				)?;
				let response = self.send_signed(label, &entry, outbound).await?;

				obs::record_step(KIND, label, response.status);
				client::ensure_success(label, &response)?;

				Ok(response)
			})
			.await;

		client::record_outcome(KIND, &result);

		result
	}
}
