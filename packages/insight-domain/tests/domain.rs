use std::thread;

use insight_domain::{
	Counters, Detection, FulfillmentResult, Place, Utterance, context, create_utterance, topic,
};

fn place(dcid: &str, name: &str) -> Place {
	Place::new(dcid, name, "State")
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

fn turn(places: Vec<Place>, svs: &[&str], prior: Option<Utterance>) -> Utterance {
	let detection = Detection::new(places, strings(svs))
		.with_original_query(Some(format!("query with {} svs", svs.len())));

	create_utterance(detection, prior, Counters::new(), "session_1")
}

fn three_turn_chain() -> Utterance {
	let first = turn(vec![place("geoId/06", "California")], &["Count_Person"], None);
	let mut second = turn(Vec::new(), &["dc/topic/Health", "Median_Age_Person"], Some(first));

	second.apply_place_fallback();

	let mut third = turn(
		vec![place("geoId/48", "Texas"), place("geoId/36", "New York")],
		&["sv/A", "sv/B"],
		Some(second),
	);

	third.detection.child_place_type = Some("County".to_string());

	third
}

#[test]
fn hoisting_is_idempotent() {
	let cases = [
		strings(&["sv/A", "sv/B", "dc/topic/C", "sv/D"]),
		strings(&["sv/A", "dc/topic/B", "dc/topic/C"]),
		strings(&["dc/topic/A", "sv/B"]),
		strings(&["sv/A", "sv/B", "sv/C", "dc/topic/D"]),
		strings(&["sv/A"]),
		Vec::new(),
	];

	for case in cases {
		let mut once = case.clone();

		topic::hoist(&mut once);

		let mut twice = once.clone();

		topic::hoist(&mut twice);

		assert_eq!(once, twice, "Hoisting twice changed {case:?}.");
	}
}

#[test]
fn hoisting_ignores_topics_past_the_limit() {
	let mut svs = strings(&["sv/A", "sv/B", "sv/C", "sv/D", "dc/topic/E"]);
	let before = svs.clone();

	assert!(!topic::hoist(&mut svs));
	assert_eq!(svs, before);
}

#[test]
fn hoist_topic_updates_utterance() {
	let mut utterance =
		turn(vec![place("geoId/06", "California")], &["sv/A", "dc/topic/B"], None);

	assert!(topic::hoist_topic(&mut utterance));
	assert_eq!(utterance.svs, strings(&["dc/topic/B", "sv/A"]));
}

#[test]
fn save_then_restore_reproduces_chain() {
	let mut utterance = three_turn_chain();
	let history = context::save(&mut utterance);

	assert!(utterance.counters.is_none());
	assert_eq!(history.len(), 3);

	let restored = context::restore(&history).expect("History must restore to a chain.");

	assert_eq!(restored.depth(), 3);

	let mut original = Some(&utterance);
	let mut rebuilt = Some(&restored);

	while let (Some(left), Some(right)) = (original, rebuilt) {
		assert_eq!(left.svs, right.svs);
		assert_eq!(left.places, right.places);
		assert_eq!(left.place_source, right.place_source);
		assert_eq!(left.sv_source, right.sv_source);
		assert_eq!(left.place_fallback, right.place_fallback);
		assert_eq!(left.past_source_context, right.past_source_context);
		assert_eq!(left.session_id, right.session_id);
		assert_eq!(left.child_place_type(), right.child_place_type());
		assert!(right.counters.is_none());

		original = left.prior.as_deref();
		rebuilt = right.prior.as_deref();
	}
}

#[test]
fn history_is_newest_first() {
	let mut utterance = three_turn_chain();
	let history = context::save(&mut utterance);

	assert_eq!(history[0].svs, strings(&["sv/A", "sv/B"]));
	assert_eq!(history[1].place_source, FulfillmentResult::PartialPastQuery);
	assert!(history[1].place_fallback);
	assert_eq!(history[1].places[0].dcid, "geoId/06");
	assert_eq!(history[2].svs, strings(&["Count_Person"]));
	assert_eq!(context::session_id(&history), Some("session_1"));
}

#[test]
fn first_entry_always_carries_place_fallback() {
	let mut empty = turn(Vec::new(), &[], None);

	empty.apply_place_fallback();

	let history = context::save(&mut empty);
	let json = serde_json::to_value(&history).expect("Failed to serialize history.");

	assert_eq!(json[0]["placeFallback"], false);
	assert_eq!(json[0]["placeSource"], "UNRECOGNIZED");
	assert_eq!(json[0]["svSource"], "UNRECOGNIZED");
	assert_eq!(json[0]["pastSourceContext"], "");
	assert!(json[0]["places"].as_array().map(Vec::is_empty).unwrap_or(false));
}

#[test]
fn history_parses_from_client_json() {
	let raw = serde_json::json!([
		{
			"svs": ["Count_Person"],
			"places": [{ "dcid": "geoId/06", "name": "California", "place_type": "State" }],
			"placeFallback": false,
			"placeSource": "CURRENT_QUERY",
			"svSource": "CURRENT_QUERY",
			"session_id": "abc"
		},
		{ "svs": [] }
	]);
	let history: Vec<context::ContextEntry> =
		serde_json::from_value(raw).expect("Failed to parse history.");
	let restored = context::restore(&history).expect("History must restore to a chain.");

	assert_eq!(restored.depth(), 2);
	assert_eq!(restored.main_place().name, "California");

	let prior_source = restored.prior.as_ref().map(|prior| prior.place_source);

	assert_eq!(prior_source, Some(FulfillmentResult::Unrecognized));
	assert!(context::restore(&[]).is_none());
}

#[test]
fn long_history_round_trips_on_a_small_stack() {
	const TURNS: usize = 150_000;

	let worker = thread::Builder::new()
		.stack_size(2 * 1024 * 1024)
		.spawn(|| {
			let raw = format!("[{}{{}}]", "{},".repeat(TURNS - 1));
			let history: Vec<context::ContextEntry> =
				serde_json::from_str(&raw).expect("Failed to parse history.");
			let mut restored = context::restore(&history).expect("History must restore to a chain.");

			assert_eq!(restored.depth(), TURNS);

			let saved = context::save(&mut restored);

			assert_eq!(saved.len(), TURNS);

			drop(restored);

			let chained = turn(Vec::new(), &["Count_Person"], context::restore(&saved));

			assert_eq!(chained.depth(), TURNS + 1);
		})
		.expect("Failed to spawn worker thread.");

	worker.join().expect("Dropping a long chain must not overflow the stack.");
}
