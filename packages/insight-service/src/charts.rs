use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use insight_config::EventConfig;
use insight_domain::{ChartSpec, ChartType, Utterance, topic};

/// Denominator used for per-capita variants.
pub const PER_CAPITA_DENOM: &str = "Count_Person";

/// Application-provided inputs to chart building. Passed per call, never read ambiently.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
	pub events: &'a EventConfig,
	pub sv_chart_titles: &'a HashMap<String, String>,
	pub nopc_vars: &'a HashSet<String>,
	pub max_charts: usize,
}
impl ChartInputs<'_> {
	fn title(&self, sv: &str) -> String {
		self.sv_chart_titles.get(sv).cloned().unwrap_or_else(|| sv.to_string())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
	#[serde(skip_serializing_if = "PageMetadata::is_empty")]
	pub metadata: PageMetadata,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub categories: Vec<Category>,
}
impl PageConfig {
	pub fn is_empty(&self) -> bool {
		self.metadata.is_empty() && self.categories.is_empty()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub place_dcid: Vec<String>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub contained_place_types: BTreeMap<String, String>,
}
impl PageMetadata {
	pub fn is_empty(&self) -> bool {
		self.place_dcid.is_empty() && self.contained_place_types.is_empty()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	pub title: String,
	pub dcid: String,
	pub blocks: Vec<Block>,
	pub stat_var_spec: BTreeMap<String, StatVarSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
	pub title: String,
	pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
	#[serde(rename = "type")]
	pub tile_type: ChartType,
	pub title: String,
	pub stat_var_key: Vec<String>,
	pub places: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub event_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatVarSpec {
	pub stat_var: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub denom: Option<String>,
}

/// Ranks charts for `utterance` and stores them on it.
///
/// Returns an empty config when nothing could be charted, which is always the case without
/// a place.
pub fn fulfill_chart_config(utterance: &mut Utterance, inputs: &ChartInputs<'_>) -> PageConfig {
	utterance.ranked_charts = rank_charts(utterance, inputs);

	if utterance.ranked_charts.is_empty() {
		return PageConfig::default();
	}

	build_page_config(utterance, inputs)
}

/// Charts in rank order: variable order first, then a fixed order of chart kinds per variable.
pub fn rank_charts(utterance: &Utterance, inputs: &ChartInputs<'_>) -> Vec<ChartSpec> {
	let Some(main_place) = utterance.places.first() else {
		return Vec::new();
	};
	let main = vec![main_place.dcid.clone()];
	let all_places: Vec<String> = utterance.places.iter().map(|place| place.dcid.clone()).collect();
	let child_type = utterance.child_place_type().map(str::to_string);
	let mut seen = HashSet::new();
	let mut charts = Vec::new();

	for sv in &utterance.svs {
		if !seen.insert(sv.as_str()) {
			continue;
		}

		let title = inputs.title(sv);

		if topic::is_topic(sv) {
			charts.push(ChartSpec::new(ChartType::Topic, title, sv, all_places.clone()));

			continue;
		}
		if let Some(event_type) = inputs.events.event_type_for(sv) {
			let mut chart = ChartSpec::new(ChartType::Event, title, sv, main.clone());

			chart.event_type = Some(event_type.to_string());
			chart.child_place_type = child_type.clone();

			charts.push(chart);

			continue;
		}
		if all_places.len() == 1 && child_type.is_none() {
			charts.push(ChartSpec::new(ChartType::Highlight, title.clone(), sv, main.clone()));
		}

		charts.push(ChartSpec::new(ChartType::Timeline, title.clone(), sv, all_places.clone()));

		if !inputs.nopc_vars.contains(sv) {
			let mut chart = ChartSpec::new(
				ChartType::Timeline,
				format!("{title} (per capita)"),
				sv,
				all_places.clone(),
			);

			chart.denom = Some(PER_CAPITA_DENOM.to_string());

			charts.push(chart);
		}

		if let Some(child_type) = child_type.as_ref() {
			for chart_type in [ChartType::Map, ChartType::Ranking] {
				let mut chart = ChartSpec::new(
					chart_type,
					format!("{title} in {child_type} places"),
					sv,
					main.clone(),
				);

				chart.child_place_type = Some(child_type.clone());

				charts.push(chart);
			}
		}
	}

	charts.truncate(inputs.max_charts);

	charts
}

fn build_page_config(utterance: &Utterance, inputs: &ChartInputs<'_>) -> PageConfig {
	let main_place = utterance.main_place();
	let mut metadata = PageMetadata {
		place_dcid: utterance.places.iter().map(|place| place.dcid.clone()).collect(),
		..Default::default()
	};

	if let Some(child_type) = utterance.child_place_type()
		&& !main_place.place_type.is_empty()
	{
		metadata
			.contained_place_types
			.insert(main_place.place_type.clone(), child_type.to_string());
	}

	let mut categories: Vec<Category> = Vec::new();

	for chart in &utterance.ranked_charts {
		let Some(sv) = chart.svs.first() else {
			continue;
		};
		let key = match chart.denom {
			Some(_) => format!("{sv}_pc"),
			None => sv.clone(),
		};
		let position = match categories.iter().position(|category| &category.dcid == sv) {
			Some(position) => position,
			None => {
				categories.push(Category {
					title: inputs.title(sv),
					dcid: sv.clone(),
					blocks: Vec::new(),
					stat_var_spec: BTreeMap::new(),
				});

				categories.len() - 1
			},
		};
		let category = &mut categories[position];

		category.stat_var_spec.entry(key.clone()).or_insert_with(|| StatVarSpec {
			stat_var: sv.clone(),
			name: inputs.title(sv),
			denom: chart.denom.clone(),
		});
		category.blocks.push(Block {
			title: chart.title.clone(),
			tiles: vec![Tile {
				tile_type: chart.chart_type,
				title: chart.title.clone(),
				stat_var_key: vec![key],
				places: chart.places.clone(),
				event_type: chart.event_type.clone(),
			}],
		});
	}

	PageConfig { metadata, categories }
}
