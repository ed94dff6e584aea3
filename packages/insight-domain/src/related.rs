use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
	pub dcid: String,
	#[serde(default)]
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
	pub dcid: String,
	#[serde(default)]
	pub name: String,
}

/// Parents and children of a place; children are keyed by place type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceMetadata {
	pub parent_places: Vec<PlaceRef>,
	pub child_places: BTreeMap<String, Vec<PlaceRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelatedThings {
	pub parent_places: Vec<PlaceRef>,
	pub child_places: BTreeMap<String, Vec<PlaceRef>>,
	pub parent_topics: Vec<TopicRef>,
	pub peer_topics: Vec<TopicRef>,
}
