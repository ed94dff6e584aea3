use std::{collections::HashSet, time::Instant};

use insight_config::ProviderConfig;
use insight_domain::{Counters, Detection};

use crate::{DebugLogs, EntityResolver, Error, Result};

/// Builds a detection from caller-supplied dcids instead of free text.
///
/// Unknown places and variables are dropped and noted in `debug_logs`; a resolver failure
/// counts as resolving nothing. Variables keep the caller's order, duplicates included.
pub async fn construct(
	resolver: &dyn EntityResolver,
	cfg: &ProviderConfig,
	entities: &[String],
	variables: &[String],
	child_type: Option<String>,
	debug_logs: &mut DebugLogs,
	counters: &mut Counters,
) -> Result<Detection> {
	let missing: Vec<String> = [("entities", entities), ("variables", variables)]
		.into_iter()
		.filter(|(_, values)| values.is_empty())
		.map(|(field, _)| field.to_string())
		.collect();

	if !missing.is_empty() {
		return Err(Error::InvalidRequest {
			message: "Entities and variables must be provided.".to_string(),
			fields: missing,
		});
	}

	let start = Instant::now();
	let places = match resolver.resolve_places(cfg, entities).await {
		Ok(places) => places,
		Err(err) => {
			tracing::warn!(error = %err, "Place resolution failed; continuing without places.");
			counters.err("place_resolution_failed", err.to_string());

			Vec::new()
		},
	};
	let known: HashSet<String> = match resolver.known_variables(cfg, variables).await {
		Ok(known) => known.into_iter().collect(),
		Err(err) => {
			tracing::warn!(error = %err, "Variable lookup failed; continuing without variables.");
			counters.err("variable_resolution_failed", err.to_string());

			HashSet::new()
		},
	};
	let svs: Vec<String> = variables.iter().filter(|sv| known.contains(*sv)).cloned().collect();
	let resolved: HashSet<&str> = places.iter().map(|place| place.dcid.as_str()).collect();
	let unresolved_entities: Vec<&String> =
		entities.iter().filter(|dcid| !resolved.contains(dcid.as_str())).collect();
	let unresolved_variables: Vec<&String> =
		variables.iter().filter(|sv| !known.contains(*sv)).collect();

	if !unresolved_entities.is_empty() {
		debug_logs.insert("unresolved_entities".to_string(), serde_json::json!(unresolved_entities));
		counters.err("unresolved_entities", unresolved_entities.len());
	}
	if !unresolved_variables.is_empty() {
		debug_logs
			.insert("unresolved_variables".to_string(), serde_json::json!(unresolved_variables));
		counters.err("unresolved_variables", unresolved_variables.len());
	}

	counters.info("resolved_places", places.len());
	counters.info("resolved_variables", svs.len());
	counters.timeit("query_detection", start);

	Ok(Detection::new(places, svs).with_child_place_type(child_type))
}
