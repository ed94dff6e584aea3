use color_eyre::{Result, eyre};
use serde_json::Value;

use insight_config::ProviderConfig;
use insight_domain::TopicRef;

pub async fn parent_topics(cfg: &ProviderConfig, dcids: &[String]) -> Result<Vec<TopicRef>> {
	related_topics(cfg, "parents", dcids).await
}

pub async fn child_topics(cfg: &ProviderConfig, dcids: &[String]) -> Result<Vec<TopicRef>> {
	related_topics(cfg, "children", dcids).await
}

async fn related_topics(
	cfg: &ProviderConfig,
	relation: &str,
	dcids: &[String],
) -> Result<Vec<TopicRef>> {
	if dcids.is_empty() {
		return Ok(Vec::new());
	}

	let body = serde_json::json!({ "relation": relation, "dcids": dcids });
	let json = crate::post_json(cfg, &body).await?;

	parse_topics(json)
}

fn parse_topics(json: Value) -> Result<Vec<TopicRef>> {
	let topics = json
		.get("topics")
		.cloned()
		.ok_or_else(|| eyre::eyre!("Topic response is missing topics array."))?;
	let mut parsed: Vec<TopicRef> = serde_json::from_value(topics)?;
	let mut seen = std::collections::HashSet::new();

	parsed.retain(|topic| seen.insert(topic.dcid.clone()));

	Ok(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dedups_topics_keeping_first() {
		let json = serde_json::json!({
			"topics": [
				{ "dcid": "dc/topic/Health", "name": "Health" },
				{ "dcid": "dc/topic/Economy", "name": "Economy" },
				{ "dcid": "dc/topic/Health", "name": "Health again" }
			]
		});
		let topics = parse_topics(json).expect("parse failed");

		assert_eq!(topics.len(), 2);
		assert_eq!(topics[0].name, "Health");
	}

	#[test]
	fn requires_topics_array() {
		assert!(parse_topics(serde_json::json!({ "data": [] })).is_err());
	}
}
