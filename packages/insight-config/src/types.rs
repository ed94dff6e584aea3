use std::{
	collections::{BTreeMap, HashMap},
	path::PathBuf,
};

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub nl: Nl,
	pub providers: Providers,
	pub embeddings: Embeddings,
	/// Loaded from `nl.events_path` by `load`, empty otherwise.
	#[serde(skip)]
	pub events: EventConfig,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	pub environment: Environment,
	/// When false, requests without a session share `TEST_SESSION_ID`.
	#[serde(default)]
	pub log_query: bool,
	#[serde(default = "default_app_id")]
	pub app_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	Local,
	Dev,
	Test,
	IntegrationTest,
	Autopush,
	Staging,
	Production,
	Custom,
}
impl Environment {
	pub fn is_production(self) -> bool {
		matches!(self, Self::Production)
	}

	pub fn is_local(self) -> bool {
		matches!(self, Self::Local)
	}

	/// VERTEXAI models and stores are only wired up outside serving environments.
	pub fn allows_vertex_ai(self) -> bool {
		matches!(self, Self::Local | Self::Test | Self::IntegrationTest | Self::Autopush)
	}
}

#[derive(Debug, Deserialize)]
pub struct Nl {
	pub events_path: Option<PathBuf>,
	/// Re-read the event taxonomy on every fulfillment. Honored in `local` only.
	#[serde(default)]
	pub reload_events: bool,
	#[serde(default = "default_max_charts")]
	pub max_charts: u32,
	#[serde(default)]
	pub nopc_vars: Vec<String>,
	#[serde(default)]
	pub chart_titles: HashMap<String, String>,
	pub default_index: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub resolver: ProviderConfig,
	pub place_metadata: ProviderConfig,
	pub topic_graph: ProviderConfig,
	pub detector: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Catalog of embeddings models and indexes known to the detection server.
#[derive(Debug, Deserialize)]
pub struct Embeddings {
	pub version: u32,
	#[serde(default)]
	pub models: BTreeMap<String, ModelConfig>,
	#[serde(default)]
	pub indexes: BTreeMap<String, IndexConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelUsage {
	Embeddings,
	Reranking,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ModelConfig {
	Local(LocalModelConfig),
	Vertexai(VertexAiModelConfig),
}
impl ModelConfig {
	pub fn usage(&self) -> ModelUsage {
		match self {
			Self::Local(model) => model.usage,
			Self::Vertexai(model) => model.usage,
		}
	}

	pub fn is_vertex_ai(&self) -> bool {
		matches!(self, Self::Vertexai(_))
	}
}

#[derive(Debug, Deserialize)]
pub struct LocalModelConfig {
	pub usage: ModelUsage,
	#[serde(default)]
	pub gcs_folder: String,
}

#[derive(Debug, Deserialize)]
pub struct VertexAiModelConfig {
	pub usage: ModelUsage,
	pub project_id: String,
	pub location: String,
	pub prediction_endpoint_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "store", rename_all = "UPPERCASE")]
pub enum IndexConfig {
	Memory(FileIndexConfig),
	Lancedb(FileIndexConfig),
	Vertexai(VertexAiIndexConfig),
}
impl IndexConfig {
	pub fn model(&self) -> &str {
		match self {
			Self::Memory(index) | Self::Lancedb(index) => &index.model,
			Self::Vertexai(index) => &index.model,
		}
	}

	pub fn is_vertex_ai(&self) -> bool {
		matches!(self, Self::Vertexai(_))
	}
}

#[derive(Debug, Deserialize)]
pub struct FileIndexConfig {
	pub model: String,
	pub embeddings: String,
}

#[derive(Debug, Deserialize)]
pub struct VertexAiIndexConfig {
	pub model: String,
	pub project_id: String,
	pub location: String,
	pub index_endpoint_root: String,
	pub index_endpoint: String,
	pub index_id: String,
}

/// Event (disaster) taxonomy. Variables listed under an event type chart as events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventConfig {
	#[serde(default)]
	pub event_types: BTreeMap<String, EventType>,
}
impl EventConfig {
	pub fn event_type_for(&self, sv: &str) -> Option<&str> {
		self.event_types
			.iter()
			.find(|(_, event)| event.svs.iter().any(|value| value == sv))
			.map(|(key, _)| key.as_str())
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventType {
	pub name: String,
	#[serde(default)]
	pub svs: Vec<String>,
}

fn default_app_id() -> String {
	"insights".to_string()
}

fn default_max_charts() -> u32 {
	30
}
