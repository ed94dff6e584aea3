pub mod chart;
pub mod context;
pub mod counters;
pub mod detection;
pub mod place;
pub mod related;
pub mod session;
pub mod topic;
pub mod utterance;

pub use chart::{ChartSpec, ChartType};
pub use context::ContextEntry;
pub use counters::Counters;
pub use detection::{Detection, PlacesDetected, SvsDetected};
pub use place::Place;
pub use related::{PlaceMetadata, PlaceRef, RelatedThings, TopicRef};
pub use utterance::{FulfillmentResult, Utterance, create_utterance};
