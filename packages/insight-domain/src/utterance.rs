use serde::{Deserialize, Serialize};

use crate::{ChartSpec, Counters, Detection, Place};

/// Where a turn's places or variables came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentResult {
	CurrentQuery,
	PastQuery,
	PartialPastQuery,
	Default,
	#[default]
	Unrecognized,
	Unfulfilled,
}
impl FulfillmentResult {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::CurrentQuery => "CURRENT_QUERY",
			Self::PastQuery => "PAST_QUERY",
			Self::PartialPastQuery => "PARTIAL_PAST_QUERY",
			Self::Default => "DEFAULT",
			Self::Unrecognized => "UNRECOGNIZED",
			Self::Unfulfilled => "UNFULFILLED",
		}
	}

	fn from_presence(present: bool) -> Self {
		if present { Self::CurrentQuery } else { Self::Unrecognized }
	}
}

/// One conversational turn.
///
/// `prior` owns the previous turn, so a conversation is a backward-only chain. Ancestors are
/// read but never modified once linked. Chain length is bounded only by the client's history.
#[derive(Debug)]
pub struct Utterance {
	pub session_id: String,
	pub svs: Vec<String>,
	pub places: Vec<Place>,
	pub detection: Detection,
	pub counters: Option<Counters>,
	pub place_source: FulfillmentResult,
	pub sv_source: FulfillmentResult,
	pub past_source_context: String,
	pub place_fallback: bool,
	pub ranked_charts: Vec<ChartSpec>,
	pub prior: Option<Box<Utterance>>,
}
impl Utterance {
	pub fn main_place(&self) -> Place {
		self.places.first().cloned().unwrap_or_default()
	}

	pub fn child_place_type(&self) -> Option<&str> {
		self.detection.child_place_type.as_deref()
	}

	/// Number of turns in the chain, this one included.
	pub fn depth(&self) -> usize {
		let mut depth = 1;
		let mut current = self.prior.as_deref();

		while let Some(turn) = current {
			depth += 1;
			current = turn.prior.as_deref();
		}

		depth
	}

	/// Borrows the prior turn's main place when this turn resolved none.
	///
	/// Returns whether the fallback fired. With no usable prior place the sources are marked
	/// unrecognized and `places` stays empty.
	pub fn apply_place_fallback(&mut self) -> bool {
		if !self.places.is_empty() {
			return false;
		}

		let Some(prior_place) = self.prior.as_deref().and_then(|prior| prior.places.first())
		else {
			self.place_source = FulfillmentResult::Unrecognized;

			return false;
		};
		let prior_place = prior_place.clone();

		self.past_source_context = format!(
			"No place was found in the query, so {} from the previous query was used.",
			prior_place.display_name()
		);
		self.places = vec![prior_place];
		self.place_source = FulfillmentResult::PartialPastQuery;
		self.place_fallback = true;

		true
	}

	pub fn take_counters(&mut self) -> Counters {
		self.counters.take().unwrap_or_default()
	}

	pub fn counters_mut(&mut self) -> &mut Counters {
		self.counters.get_or_insert_with(Counters::default)
	}
}
impl Drop for Utterance {
	// Unlinks ancestors one at a time so a long chain never drops recursively.
	fn drop(&mut self) {
		let mut next = self.prior.take();

		while let Some(mut turn) = next {
			next = turn.prior.take();
		}
	}
}

/// Starts a new turn from `detection`, chained onto `prior`.
///
/// Places and variables are copied in order. Sources only reflect presence here; the
/// fulfiller decides whether a fallback applies.
pub fn create_utterance(
	detection: Detection,
	prior: Option<Utterance>,
	counters: Counters,
	session_id: impl Into<String>,
) -> Utterance {
	let places = detection.places_detected.places_found.clone();
	let svs = detection.svs_detected.sv_dcids.clone();

	Utterance {
		session_id: session_id.into(),
		place_source: FulfillmentResult::from_presence(!places.is_empty()),
		sv_source: FulfillmentResult::from_presence(!svs.is_empty()),
		svs,
		places,
		detection,
		counters: Some(counters),
		past_source_context: String::new(),
		place_fallback: false,
		ranked_charts: Vec::new(),
		prior: prior.map(Box::new),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ca() -> Place {
		Place::new("geoId/06", "California", "State")
	}

	#[test]
	fn copies_detection_in_order() {
		let detection = Detection::new(
			vec![ca(), Place::new("geoId/48", "Texas", "State")],
			vec!["Count_Person".to_string(), "dc/topic/Health".to_string()],
		);
		let utterance = create_utterance(detection, None, Counters::new(), "s1");

		assert_eq!(utterance.places[1].dcid, "geoId/48");
		assert_eq!(utterance.svs, vec!["Count_Person", "dc/topic/Health"]);
		assert_eq!(utterance.place_source, FulfillmentResult::CurrentQuery);
		assert!(utterance.prior.is_none());
		assert_eq!(utterance.depth(), 1);
	}

	#[test]
	fn fallback_borrows_prior_main_place() {
		let first = create_utterance(
			Detection::new(vec![ca()], vec!["Count_Person".to_string()]),
			None,
			Counters::new(),
			"s1",
		);
		let mut second = create_utterance(
			Detection::new(Vec::new(), vec!["Median_Age_Person".to_string()]),
			Some(first),
			Counters::new(),
			"s1",
		);

		assert!(second.apply_place_fallback());
		assert_eq!(second.places, vec![ca()]);
		assert_eq!(second.place_source, FulfillmentResult::PartialPastQuery);
		assert!(second.place_fallback);
		assert!(second.past_source_context.contains("California"));
		assert_eq!(second.prior.as_ref().map(|prior| prior.places.len()), Some(1));
	}

	#[test]
	fn fallback_without_prior_marks_unrecognized() {
		let mut utterance = create_utterance(
			Detection::new(Vec::new(), vec!["Count_Person".to_string()]),
			None,
			Counters::new(),
			"s1",
		);

		assert!(!utterance.apply_place_fallback());
		assert!(utterance.places.is_empty());
		assert!(utterance.main_place().is_empty());
		assert_eq!(utterance.place_source, FulfillmentResult::Unrecognized);
		assert!(!utterance.place_fallback);
	}

	#[test]
	fn fallback_is_skipped_when_places_resolved() {
		let mut utterance = create_utterance(
			Detection::new(vec![ca()], Vec::new()),
			None,
			Counters::new(),
			"s1",
		);

		assert!(!utterance.apply_place_fallback());
		assert_eq!(utterance.place_source, FulfillmentResult::CurrentQuery);
		assert_eq!(utterance.sv_source, FulfillmentResult::Unrecognized);
	}
}
