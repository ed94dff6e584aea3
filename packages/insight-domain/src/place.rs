use serde::{Deserialize, Serialize};

/// A resolved place. The all-empty value is the "no place found" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
	pub dcid: String,
	pub name: String,
	pub place_type: String,
}
impl Place {
	pub fn new(
		dcid: impl Into<String>,
		name: impl Into<String>,
		place_type: impl Into<String>,
	) -> Self {
		Self { dcid: dcid.into(), name: name.into(), place_type: place_type.into() }
	}

	pub fn empty() -> Self {
		Self::default()
	}

	/// A place with an empty name but a real dcid is not the sentinel.
	pub fn is_empty(&self) -> bool {
		self.dcid.is_empty() && self.name.is_empty() && self.place_type.is_empty()
	}

	pub fn display_name(&self) -> &str {
		if self.name.is_empty() { &self.dcid } else { &self.name }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sentinel_differs_from_unnamed_place() {
		let sentinel = Place::empty();
		let unnamed = Place::new("geoId/06", "", "State");

		assert!(sentinel.is_empty());
		assert!(!unnamed.is_empty());
		assert_ne!(sentinel, unnamed);
		assert_eq!(unnamed.display_name(), "geoId/06");
	}
}
