use color_eyre::{Result, eyre};
use serde::Deserialize;
use serde_json::Value;

use insight_config::ProviderConfig;
use insight_domain::{Detection, Place};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
	#[serde(default)]
	places: Vec<Place>,
	#[serde(default)]
	variables: Vec<String>,
	#[serde(default)]
	child_entity_type: Option<String>,
}

/// Sends free text to the detection server, searching embeddings index `index`.
pub async fn detect(cfg: &ProviderConfig, query: &str, index: &str) -> Result<Detection> {
	let body = serde_json::json!({ "q": query, "idx": index });
	let json = crate::post_json(cfg, &body).await?;

	parse_detection(json, query)
}

fn parse_detection(json: Value, query: &str) -> Result<Detection> {
	if !json.is_object() {
		return Err(eyre::eyre!("Detection response must be a JSON object."));
	}

	let response: DetectResponse = serde_json::from_value(json)?;

	Ok(Detection::new(response.places, response.variables)
		.with_child_place_type(response.child_entity_type)
		.with_original_query(Some(query.to_string())))
}
