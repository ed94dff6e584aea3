use std::{collections::BTreeMap, time::Instant};

use insight_domain::{Counters, Place, PlaceRef, RelatedThings, TopicRef};

use crate::InsightService;

const TRIMMED_NAME_SUFFIXES: [&str; 1] = [" County"];

/// Strips presentation-only suffixes from place names. Names without a suffix are untouched,
/// and repeated suffixes are removed together so a second pass changes nothing.
pub fn trim_names(mut places: Vec<PlaceRef>) -> Vec<PlaceRef> {
	for place in &mut places {
		for suffix in TRIMMED_NAME_SUFFIXES {
			if place.name.ends_with(suffix) {
				place.name = place.name.trim_end_matches(suffix).to_string();
			}
		}
	}

	places
}

pub fn trim_grouped_names(
	groups: BTreeMap<String, Vec<PlaceRef>>,
) -> BTreeMap<String, Vec<PlaceRef>> {
	groups.into_iter().map(|(place_type, places)| (place_type, trim_names(places))).collect()
}

impl InsightService {
	/// Fills parent and child places of `place`. Lookup failures leave the defaults.
	pub(crate) async fn expand_places(
		&self,
		place: &Place,
		related: &mut RelatedThings,
		counters: &mut Counters,
	) {
		let start = Instant::now();
		let cfg = &self.cfg.providers.place_metadata;

		match self.providers.place_metadata.place_metadata(cfg, place).await {
			Ok(metadata) => {
				related.parent_places = trim_names(metadata.parent_places);
				related.child_places = trim_grouped_names(metadata.child_places);
			},
			Err(err) => {
				tracing::warn!(error = %err, place = %place.dcid, "Place metadata lookup failed.");
				counters.err("place_expansion_failed", err.to_string());
			},
		}

		counters.timeit("place_expansion", start);
	}

	/// Fills parent topics of `svs` and the peers under those parents.
	pub(crate) async fn expand_topics(
		&self,
		svs: &[String],
		related: &mut RelatedThings,
		counters: &mut Counters,
	) {
		let start = Instant::now();
		let cfg = &self.cfg.providers.topic_graph;

		match self.providers.topic_graph.parent_topics(cfg, svs).await {
			Ok(parents) => {
				let parent_dcids: Vec<String> =
					parents.iter().map(|topic| topic.dcid.clone()).collect();

				related.parent_topics = parents;
				related.peer_topics = self.peer_topics(&parent_dcids, counters).await;
			},
			Err(err) => {
				tracing::warn!(error = %err, "Parent topic lookup failed.");
				counters.err("topic_expansion_failed", err.to_string());
			},
		}

		counters.timeit("topic_expansion", start);
	}

	async fn peer_topics(&self, parent_dcids: &[String], counters: &mut Counters) -> Vec<TopicRef> {
		if parent_dcids.is_empty() {
			return Vec::new();
		}

		let cfg = &self.cfg.providers.topic_graph;

		match self.providers.topic_graph.child_topics(cfg, parent_dcids).await {
			Ok(peers) => peers,
			Err(err) => {
				tracing::warn!(error = %err, "Peer topic lookup failed.");
				counters.err("topic_expansion_failed", err.to_string());

				Vec::new()
			},
		}
	}
}
