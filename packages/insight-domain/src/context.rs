use serde::{Deserialize, Serialize};

use crate::{Detection, FulfillmentResult, Place, Utterance};

/// A persisted snapshot of one turn. A history is ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(default)]
	pub svs: Vec<String>,
	#[serde(default)]
	pub places: Vec<Place>,
	#[serde(rename = "placeFallback", default)]
	pub place_fallback: bool,
	#[serde(rename = "placeSource", default)]
	pub place_source: FulfillmentResult,
	#[serde(rename = "svSource", default)]
	pub sv_source: FulfillmentResult,
	#[serde(rename = "pastSourceContext", default)]
	pub past_source_context: String,
	#[serde(default)]
	pub session_id: String,
	#[serde(rename = "childEntityType", default, skip_serializing_if = "Option::is_none")]
	pub child_entity_type: Option<String>,
}
impl ContextEntry {
	fn from_utterance(utterance: &Utterance) -> Self {
		Self {
			query: utterance.detection.original_query.clone(),
			svs: utterance.svs.clone(),
			places: utterance.places.clone(),
			place_fallback: utterance.place_fallback,
			place_source: utterance.place_source,
			sv_source: utterance.sv_source,
			past_source_context: utterance.past_source_context.clone(),
			session_id: utterance.session_id.clone(),
			child_entity_type: utterance.detection.child_place_type.clone(),
		}
	}

	fn into_utterance(self, prior: Option<Utterance>) -> Utterance {
		let detection = Detection::new(self.places.clone(), self.svs.clone())
			.with_child_place_type(self.child_entity_type)
			.with_original_query(self.query);

		Utterance {
			session_id: self.session_id,
			svs: self.svs,
			places: self.places,
			detection,
			counters: None,
			place_source: self.place_source,
			sv_source: self.sv_source,
			past_source_context: self.past_source_context,
			place_fallback: self.place_fallback,
			ranked_charts: Vec::new(),
			prior: prior.map(Box::new),
		}
	}
}

/// Flattens `utterance` and its ancestors into a history, newest first.
///
/// The utterance's counters are dropped first; they are per-request output only. The returned
/// history always has at least one entry.
pub fn save(utterance: &mut Utterance) -> Vec<ContextEntry> {
	utterance.counters = None;

	let mut history = Vec::with_capacity(utterance.depth());
	let mut current = Some(&*utterance);

	while let Some(turn) = current {
		history.push(ContextEntry::from_utterance(turn));

		current = turn.prior.as_deref();
	}

	history
}

/// Rebuilds the chain described by `history`, returning its newest turn.
pub fn restore(history: &[ContextEntry]) -> Option<Utterance> {
	history
		.iter()
		.rev()
		.fold(None, |prior, entry| Some(entry.clone().into_utterance(prior)))
}

/// The session a history belongs to, if it names one.
pub fn session_id(history: &[ContextEntry]) -> Option<&str> {
	history.first().map(|entry| entry.session_id.as_str()).filter(|id| !id.trim().is_empty())
}
