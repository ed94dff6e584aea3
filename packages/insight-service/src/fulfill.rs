use std::{mem, time::Instant};

use serde::{Deserialize, Serialize};

use insight_domain::{
	Counters, FulfillmentResult, Place, RelatedThings, Utterance, context, context::ContextEntry,
	create_utterance, topic,
};

use crate::{DebugLogs, Error, InsightResponse, InsightService, PageConfig, Result, charts, detector};

pub const SUCCESS_STATUS: &str = "Successful";
pub const NO_PLACE_STATUS: &str = "**No Place Found**.";
pub const NO_SVS_STATUS: &str = "**No SVs Found**.";
pub const NO_CHARTS_STATUS: &str = "**No Charts Found**.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequest {
	#[serde(default)]
	pub entities: Option<Vec<String>>,
	#[serde(default)]
	pub variables: Option<Vec<String>>,
	#[serde(default)]
	pub child_entity_type: Option<String>,
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub context: Option<Vec<ContextEntry>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillResponse {
	pub place: Place,
	pub config: PageConfig,
	pub context: Vec<ContextEntry>,
	pub place_fallback: bool,
	pub sv_source: FulfillmentResult,
	pub place_source: FulfillmentResult,
	pub past_source_context: String,
	pub related_things: RelatedThings,
}

/// Status line for a fulfilled utterance. Place and variable markers may both appear, place first.
pub fn status_string(utterance: &Utterance) -> String {
	if !utterance.ranked_charts.is_empty() {
		return SUCCESS_STATUS.to_string();
	}

	let mut status = String::new();

	if utterance.places.is_empty() {
		status.push_str(NO_PLACE_STATUS);
	}
	if utterance.svs.is_empty() {
		status.push_str(NO_SVS_STATUS);
	}
	if status.is_empty() {
		status.push_str(NO_CHARTS_STATUS);
	}

	status
}

impl InsightService {
	/// Fulfillment is hidden in production; callers should check before reading the request.
	pub fn ensure_fulfillment_enabled(&self) -> Result<()> {
		if self.cfg.service.environment.is_production() {
			return Err(Error::NotFound {
				message: "Fulfillment is not available in production.".to_string(),
			});
		}

		Ok(())
	}

	pub async fn fulfill(&self, req: FulfillRequest) -> Result<InsightResponse<FulfillResponse>> {
		tracing::info!("Fulfill request received.");

		self.ensure_fulfillment_enabled()?;

		let entities = req.entities.unwrap_or_default();
		let variables = req.variables.unwrap_or_default();
		let history = req.context.unwrap_or_default();
		let session_id = self.session_id(req.session_id, &history);
		let mut counters = Counters::new();
		let mut debug_logs = DebugLogs::new();
		let detection = detector::construct(
			self.providers.resolver.as_ref(),
			&self.cfg.providers.resolver,
			&entities,
			&variables,
			req.child_entity_type,
			&mut debug_logs,
			&mut counters,
		)
		.await?;
		let prior = context::restore(&history);
		let mut utterance = create_utterance(detection, prior, counters, session_id);

		topic::hoist_topic(&mut utterance);

		Ok(self.fulfill_with_chart_config(utterance, debug_logs).await)
	}

	/// Charts `utterance`, expands related things and serializes the turn into history.
	pub async fn fulfill_with_chart_config(
		&self,
		mut utterance: Utterance,
		debug_logs: DebugLogs,
	) -> InsightResponse<FulfillResponse> {
		let events = self.event_config();
		let inputs = self.chart_inputs(&events);
		let mut counters = utterance.take_counters();
		let start = Instant::now();

		utterance.apply_place_fallback();

		let config = charts::fulfill_chart_config(&mut utterance, &inputs);

		counters.timeit("fulfillment", start);

		let mut related = RelatedThings::default();
		let main_place = if utterance.places.is_empty() {
			tracing::info!(
				query = ?utterance.detection.original_query,
				"Found empty place for query."
			);

			Place::empty()
		} else {
			let main_place = utterance.main_place();

			self.expand_places(&main_place, &mut related, &mut counters).await;

			main_place
		};

		if !utterance.svs.is_empty() {
			self.expand_topics(&utterance.svs, &mut related, &mut counters).await;
		}

		let status = status_string(&utterance);
		let context = context::save(&mut utterance);

		tracing::debug!(
			session_id = %utterance.session_id,
			charts = utterance.ranked_charts.len(),
			%status,
			"Fulfillment finished."
		);

		let data = FulfillResponse {
			place: main_place,
			config,
			context,
			place_fallback: utterance.place_fallback,
			sv_source: utterance.sv_source,
			place_source: utterance.place_source,
			past_source_context: mem::take(&mut utterance.past_source_context),
			related_things: related,
		};

		let detection = mem::take(&mut utterance.detection);

		InsightResponse::new(data, status, detection, counters, debug_logs)
	}
}
