use color_eyre::{Result, eyre};
use serde_json::Value;

use insight_config::ProviderConfig;
use insight_domain::{Place, PlaceMetadata};

pub async fn place_metadata(cfg: &ProviderConfig, place: &Place) -> Result<PlaceMetadata> {
	let body = serde_json::json!({
		"dcid": place.dcid,
		"placeType": place.place_type,
		"placeName": place.name,
		"childPlaces": true,
	});
	let json = crate::post_json(cfg, &body).await?;

	parse_metadata(json)
}

fn parse_metadata(json: Value) -> Result<PlaceMetadata> {
	if json.get("isError").and_then(|v| v.as_bool()).unwrap_or(false) {
		let message = json.get("message").and_then(|v| v.as_str()).unwrap_or("unknown error");

		return Err(eyre::eyre!("Place metadata lookup failed: {message}"));
	}

	Ok(serde_json::from_value(json)?)
}
