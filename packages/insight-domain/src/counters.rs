use std::{collections::BTreeMap, time::Instant};

use serde::Serialize;
use serde_json::Value;

/// Per-request debug and timing accumulator. Never carried across turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counters {
	info: BTreeMap<String, Vec<Value>>,
	err: BTreeMap<String, Vec<Value>>,
	timing: BTreeMap<String, f64>,
}
impl Counters {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn info(&mut self, key: &str, value: impl Into<Value>) {
		self.info.entry(key.to_string()).or_default().push(value.into());
	}

	pub fn err(&mut self, key: &str, value: impl Into<Value>) {
		self.err.entry(key.to_string()).or_default().push(value.into());
	}

	/// Adds the seconds elapsed since `start` to `key`.
	pub fn timeit(&mut self, key: &str, start: Instant) {
		let elapsed = start.elapsed().as_secs_f64();

		*self.timing.entry(key.to_string()).or_insert(0.0) += elapsed;
	}

	pub fn timing(&self, key: &str) -> Option<f64> {
		self.timing.get(key).copied()
	}

	pub fn errors(&self, key: &str) -> &[Value] {
		self.err.get(key).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn infos(&self, key: &str) -> &[Value] {
		self.info.get(key).map(Vec::as_slice).unwrap_or(&[])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timings_accumulate_per_key() {
		let mut counters = Counters::new();
		let start = Instant::now();

		counters.timeit("fulfillment", start);
		counters.timeit("fulfillment", start);

		assert!(counters.timing("fulfillment").is_some());
		assert!(counters.timing("place_expansion").is_none());
	}

	#[test]
	fn serializes_all_sections() {
		let mut counters = Counters::new();

		counters.info("resolved_entities", 2);
		counters.err("unresolved_entities", "bad/id");

		let json = serde_json::to_value(&counters).expect("Failed to serialize counters.");

		assert_eq!(json["info"]["resolved_entities"][0], 2);
		assert_eq!(json["err"]["unresolved_entities"][0], "bad/id");
		assert!(json["timing"].as_object().map(|map| map.is_empty()).unwrap_or(false));
	}
}
