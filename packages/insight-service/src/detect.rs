use std::{mem, time::Instant};

use serde::{Deserialize, Serialize};

use insight_domain::{Counters, context, context::ContextEntry, create_utterance, topic};

use crate::{DebugLogs, Error, InsightResponse, InsightService, Result, fulfill::SUCCESS_STATUS};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
	#[serde(default)]
	pub q: String,
	#[serde(default)]
	pub session_id: Option<String>,
	#[serde(default)]
	pub context: Option<Vec<ContextEntry>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
	pub entities: Vec<String>,
	pub variables: Vec<String>,
	pub context: Vec<ContextEntry>,
	pub session_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub child_entity_type: Option<String>,
}

impl InsightService {
	/// Runs free-text detection and records the turn in the conversation history.
	pub async fn detect(&self, req: DetectRequest) -> Result<InsightResponse<DetectResponse>> {
		tracing::info!("Detect request received.");

		let query = req.q.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest {
				message: "`q` must be non-empty.".to_string(),
				fields: vec!["q".to_string()],
			});
		}

		let history = req.context.unwrap_or_default();
		let session_id = self.session_id(req.session_id, &history);
		let mut counters = Counters::new();
		let start = Instant::now();
		let cfg = &self.cfg.providers.detector;
		let detection = self
			.providers
			.detector
			.detect(cfg, query, &self.cfg.nl.default_index)
			.await
			.map_err(|err| {
				tracing::warn!(error = %err, "Query detection failed.");

				Error::Provider { message: err.to_string() }
			})?;

		counters.timeit("query_detection", start);

		let prior = context::restore(&history);
		let mut utterance = create_utterance(detection, prior, counters, session_id);

		if topic::hoist_topic(&mut utterance) {
			tracing::debug!(svs = ?utterance.svs, "Hoisted topic within ranking window.");
		}

		let counters = utterance.take_counters();
		let context = context::save(&mut utterance);
		let detection = mem::take(&mut utterance.detection);
		let data = DetectResponse {
			entities: detection.place_dcids(),
			variables: mem::take(&mut utterance.svs),
			context,
			session_id: mem::take(&mut utterance.session_id),
			child_entity_type: detection.child_place_type.clone(),
		};

		Ok(InsightResponse::new(data, SUCCESS_STATUS, detection, counters, DebugLogs::new()))
	}
}
