pub mod detector;
pub mod place_metadata;
pub mod resolver;
pub mod topic_graph;

use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	header::{HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use insight_config::ProviderConfig;

const API_KEY_HEADER: &str = "x-api-key";

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if !api_key.trim().is_empty() {
		headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key.parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) async fn post_json(cfg: &ProviderConfig, body: &Value) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}
