// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter incremented once per flow attempt, success, and failure.
pub const FLOW_COUNTER: &str = "vehicle_cloud_flow_total";

/// Label pairs attached to [`FLOW_COUNTER`] for one observation.
pub fn flow_labels(kind: FlowKind, outcome: FlowOutcome) -> [(&'static str, &'static str); 2] {
	[("flow", kind.as_str()), ("outcome", outcome.as_str())]
}

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	let [(flow_key, flow_label), (outcome_key, outcome_label)] = flow_labels(kind, outcome);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_COUNTER, flow_key => flow_label, outcome_key => outcome_label)
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (flow_key, flow_label, outcome_key, outcome_label);
	}
}
