use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartType {
	Timeline,
	Map,
	Ranking,
	Highlight,
	Event,
	Topic,
}

/// One ranked chart. Position in `Utterance::ranked_charts` is its rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
	pub chart_type: ChartType,
	pub title: String,
	pub svs: Vec<String>,
	pub places: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub child_place_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub denom: Option<String>,
}
impl ChartSpec {
	pub fn new(
		chart_type: ChartType,
		title: impl Into<String>,
		sv: &str,
		places: Vec<String>,
	) -> Self {
		Self {
			chart_type,
			title: title.into(),
			svs: vec![sv.to_string()],
			places,
			child_place_type: None,
			event_type: None,
			denom: None,
		}
	}
}
