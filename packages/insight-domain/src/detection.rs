use serde::{Deserialize, Serialize};

use crate::Place;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesDetected {
	pub places_found: Vec<Place>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvsDetected {
	pub sv_dcids: Vec<String>,
}

/// What one turn resolved. Built once and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detection {
	pub places_detected: PlacesDetected,
	pub svs_detected: SvsDetected,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub child_place_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub original_query: Option<String>,
}
impl Detection {
	pub fn new(places: Vec<Place>, svs: Vec<String>) -> Self {
		Self {
			places_detected: PlacesDetected { places_found: places },
			svs_detected: SvsDetected { sv_dcids: svs },
			child_place_type: None,
			original_query: None,
		}
	}

	pub fn with_child_place_type(mut self, child_place_type: Option<String>) -> Self {
		self.child_place_type = child_place_type.filter(|value| !value.trim().is_empty());

		self
	}

	pub fn with_original_query(mut self, query: Option<String>) -> Self {
		self.original_query = query;

		self
	}

	pub fn place_dcids(&self) -> Vec<String> {
		self.places_detected.places_found.iter().map(|place| place.dcid.clone()).collect()
	}
}
