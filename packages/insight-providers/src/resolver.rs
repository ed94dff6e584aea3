use color_eyre::{Result, eyre};
use serde_json::Value;

use insight_config::ProviderConfig;
use insight_domain::Place;

const NODE_PROPERTIES: &str = "->[name, typeOf]";

/// Looks up name and type for each dcid. Unknown dcids are omitted; input order is kept.
pub async fn resolve_places(cfg: &ProviderConfig, dcids: &[String]) -> Result<Vec<Place>> {
	if dcids.is_empty() {
		return Ok(Vec::new());
	}

	let json = fetch_nodes(cfg, dcids).await?;

	parse_places(&json, dcids)
}

/// Returns the subset of `dcids` the graph knows about, in input order.
pub async fn known_variables(cfg: &ProviderConfig, dcids: &[String]) -> Result<Vec<String>> {
	if dcids.is_empty() {
		return Ok(Vec::new());
	}

	let json = fetch_nodes(cfg, dcids).await?;

	parse_known(&json, dcids)
}

async fn fetch_nodes(cfg: &ProviderConfig, dcids: &[String]) -> Result<Value> {
	let body = serde_json::json!({ "nodes": dcids, "property": NODE_PROPERTIES });

	crate::post_json(cfg, &body).await
}

fn node_data(json: &Value) -> Result<&serde_json::Map<String, Value>> {
	json.get("data")
		.and_then(|v| v.as_object())
		.ok_or_else(|| eyre::eyre!("Node response is missing data object."))
}

fn arc_values<'a>(node: &'a Value, arc: &str, field: &str) -> Vec<&'a str> {
	node.get("arcs")
		.and_then(|arcs| arcs.get(arc))
		.and_then(|arc| arc.get("nodes"))
		.and_then(|nodes| nodes.as_array())
		.map(|nodes| nodes.iter().filter_map(|n| n.get(field).and_then(|v| v.as_str())).collect())
		.unwrap_or_default()
}

fn pick_place_type(types: &[&str]) -> String {
	types
		.iter()
		.find(|t| **t != "Place" && !t.starts_with("AdministrativeArea"))
		.or_else(|| types.first())
		.map(|t| t.to_string())
		.unwrap_or_default()
}

fn parse_places(json: &Value, dcids: &[String]) -> Result<Vec<Place>> {
	let data = node_data(json)?;
	let mut places = Vec::with_capacity(dcids.len());

	for dcid in dcids {
		let Some(node) = data.get(dcid) else {
			continue;
		};
		let types = arc_values(node, "typeOf", "dcid");

		if types.is_empty() {
			continue;
		}

		let name = arc_values(node, "name", "value").first().map(|n| n.to_string());

		places.push(Place::new(dcid.as_str(), name.unwrap_or_default(), pick_place_type(&types)));
	}

	Ok(places)
}

fn parse_known(json: &Value, dcids: &[String]) -> Result<Vec<String>> {
	let data = node_data(json)?;

	Ok(dcids
		.iter()
		.filter(|dcid| {
			data.get(dcid.as_str())
				.map(|node| !arc_values(node, "typeOf", "dcid").is_empty())
				.unwrap_or(false)
		})
		.cloned()
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dcids(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	fn sample() -> Value {
		serde_json::json!({
			"data": {
				"geoId/06": {
					"arcs": {
						"name": { "nodes": [{ "value": "California" }] },
						"typeOf": { "nodes": [{ "dcid": "AdministrativeArea1" }, { "dcid": "State" }] }
					}
				},
				"geoId/06085": {
					"arcs": {
						"name": { "nodes": [{ "value": "Santa Clara County" }] },
						"typeOf": { "nodes": [{ "dcid": "County" }] }
					}
				},
				"bad/id": {},
				"Count_Person": {
					"arcs": { "typeOf": { "nodes": [{ "dcid": "StatisticalVariable" }] } }
				}
			}
		})
	}

	#[test]
	fn resolves_places_in_request_order() {
		let places = parse_places(&sample(), &dcids(&["geoId/06085", "bad/id", "geoId/06"]))
			.expect("parse failed");

		assert_eq!(places.len(), 2);
		assert_eq!(places[0], Place::new("geoId/06085", "Santa Clara County", "County"));
		assert_eq!(places[1].place_type, "State");
	}

	#[test]
	fn filters_unknown_variables() {
		let known = parse_known(&sample(), &dcids(&["bad/sv", "Count_Person", "bad/id"]))
			.expect("parse failed");

		assert_eq!(known, dcids(&["Count_Person"]));
	}

	#[test]
	fn rejects_response_without_data() {
		assert!(parse_places(&serde_json::json!({}), &dcids(&["geoId/06"])).is_err());
	}
}
