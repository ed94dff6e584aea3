//! In-memory collaborators and configs for exercising the insights service without a network.

use std::{
	collections::{BTreeMap, HashMap},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;
use serde_json::Map;

use insight_config::{
	Config, Embeddings, Environment, EventConfig, EventType, FileIndexConfig, IndexConfig,
	LocalModelConfig, ModelConfig, ModelUsage, Nl, ProviderConfig, Providers as ProviderConfigs,
	Service,
};
use insight_domain::{Detection, Place, PlaceMetadata, TopicRef};
use insight_service::{
	BoxFuture, EntityResolver, InsightService, PlaceMetadataProvider, Providers, QueryDetector,
	TopicGraph,
};

pub const TEST_INDEX: &str = "base_uae_mem";

pub fn dummy_provider() -> ProviderConfig {
	ProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/".to_string(),
		timeout_ms: 1000,
		default_headers: Map::new(),
	}
}

/// A validated-shape config with one local model, one memory index and a FIRE event type.
pub fn test_config(environment: Environment) -> Config {
	let mut models = BTreeMap::new();
	let mut indexes = BTreeMap::new();
	let mut event_types = BTreeMap::new();

	models.insert(
		"uae-large".to_string(),
		ModelConfig::Local(LocalModelConfig {
			usage: ModelUsage::Embeddings,
			gcs_folder: String::new(),
		}),
	);
	indexes.insert(
		TEST_INDEX.to_string(),
		IndexConfig::Memory(FileIndexConfig {
			model: "uae-large".to_string(),
			embeddings: "embeddings/base_uae.csv".to_string(),
		}),
	);
	event_types.insert(
		"FIRE".to_string(),
		EventType { name: "Fire".to_string(), svs: vec!["Count_FireEvent".to_string()] },
	);

	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			environment,
			log_query: false,
			app_id: "insights".to_string(),
		},
		nl: Nl {
			events_path: None,
			reload_events: false,
			max_charts: 30,
			nopc_vars: vec!["Median_Age_Person".to_string()],
			chart_titles: HashMap::new(),
			default_index: TEST_INDEX.to_string(),
		},
		providers: ProviderConfigs {
			resolver: dummy_provider(),
			place_metadata: dummy_provider(),
			topic_graph: dummy_provider(),
			detector: dummy_provider(),
		},
		embeddings: Embeddings { version: 1, models, indexes },
		events: EventConfig { event_types },
	}
}

/// Wires every collaborator slot to in-memory stubs.
pub fn test_service(
	cfg: Config,
	resolver: StaticResolver,
	place_metadata: StaticPlaceMetadata,
	topic_graph: StaticTopicGraph,
	detector: StaticDetector,
) -> InsightService {
	let providers = Providers::new(
		Arc::new(resolver),
		Arc::new(place_metadata),
		Arc::new(topic_graph),
		Arc::new(detector),
	);

	InsightService::with_providers(cfg, providers)
}

/// Every collaborator fails, as if the graph service were down.
pub fn failing_service(cfg: Config) -> InsightService {
	let failing = Arc::new(FailingProviders);
	let providers =
		Providers::new(failing.clone(), failing.clone(), failing.clone(), failing);

	InsightService::with_providers(cfg, providers)
}

/// Resolves a fixed set of places and variables, preserving request order.
#[derive(Default)]
pub struct StaticResolver {
	places: HashMap<String, Place>,
	variables: Vec<String>,
}
impl StaticResolver {
	pub fn new(places: Vec<Place>, variables: &[&str]) -> Self {
		Self {
			places: places.into_iter().map(|place| (place.dcid.clone(), place)).collect(),
			variables: variables.iter().map(|sv| sv.to_string()).collect(),
		}
	}
}
impl EntityResolver for StaticResolver {
	fn resolve_places<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Place>>> {
		let places = dcids.iter().filter_map(|dcid| self.places.get(dcid).cloned()).collect();

		Box::pin(async move { Ok(places) })
	}

	fn known_variables<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		let known = dcids.iter().filter(|dcid| self.variables.contains(dcid)).cloned().collect();

		Box::pin(async move { Ok(known) })
	}
}

/// Serves canned metadata and counts lookups.
#[derive(Default)]
pub struct StaticPlaceMetadata {
	metadata: HashMap<String, PlaceMetadata>,
	calls: Arc<AtomicUsize>,
}
impl StaticPlaceMetadata {
	pub fn new(entries: Vec<(&str, PlaceMetadata)>) -> Self {
		Self {
			metadata: entries.into_iter().map(|(dcid, meta)| (dcid.to_string(), meta)).collect(),
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Shared lookup counter; stays readable after the stub moves into a service.
	pub fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}
impl PlaceMetadataProvider for StaticPlaceMetadata {
	fn place_metadata<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		place: &'a Place,
	) -> BoxFuture<'a, color_eyre::Result<PlaceMetadata>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let metadata = self.metadata.get(&place.dcid).cloned().unwrap_or_default();

		Box::pin(async move { Ok(metadata) })
	}
}

/// Topic edges keyed by the child (for parents) or the parent (for children).
#[derive(Default)]
pub struct StaticTopicGraph {
	parents: HashMap<String, Vec<TopicRef>>,
	children: HashMap<String, Vec<TopicRef>>,
}
impl StaticTopicGraph {
	/// Registers `parent` over each of `children`.
	pub fn with_edge(mut self, parent: TopicRef, children: Vec<TopicRef>) -> Self {
		for child in &children {
			self.parents.entry(child.dcid.clone()).or_default().push(parent.clone());
		}

		self.children.entry(parent.dcid).or_default().extend(children);

		self
	}

	fn collect(edges: &HashMap<String, Vec<TopicRef>>, dcids: &[String]) -> Vec<TopicRef> {
		let mut topics: Vec<TopicRef> = Vec::new();

		for topic in dcids.iter().filter_map(|dcid| edges.get(dcid)).flatten() {
			if !topics.iter().any(|seen| seen.dcid == topic.dcid) {
				topics.push(topic.clone());
			}
		}

		topics
	}
}
impl TopicGraph for StaticTopicGraph {
	fn parent_topics<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		let topics = Self::collect(&self.parents, dcids);

		Box::pin(async move { Ok(topics) })
	}

	fn child_topics<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		let topics = Self::collect(&self.children, dcids);

		Box::pin(async move { Ok(topics) })
	}
}

/// Returns the same detection for every query, stamped with the query text.
#[derive(Default)]
pub struct StaticDetector {
	detection: Detection,
}
impl StaticDetector {
	pub fn new(detection: Detection) -> Self {
		Self { detection }
	}
}
impl QueryDetector for StaticDetector {
	fn detect<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		query: &'a str,
		_index: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Detection>> {
		let detection = self.detection.clone().with_original_query(Some(query.to_string()));

		Box::pin(async move { Ok(detection) })
	}
}

pub struct FailingProviders;
impl FailingProviders {
	fn fail<T>() -> color_eyre::Result<T> {
		Err(eyre::eyre!("Collaborator is unavailable."))
	}
}
impl EntityResolver for FailingProviders {
	fn resolve_places<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Place>>> {
		Box::pin(async { Self::fail::<Vec<Place>>() })
	}

	fn known_variables<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(async { Self::fail::<Vec<String>>() })
	}
}
impl PlaceMetadataProvider for FailingProviders {
	fn place_metadata<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_place: &'a Place,
	) -> BoxFuture<'a, color_eyre::Result<PlaceMetadata>> {
		Box::pin(async { Self::fail::<PlaceMetadata>() })
	}
}
impl TopicGraph for FailingProviders {
	fn parent_topics<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		Box::pin(async { Self::fail::<Vec<TopicRef>>() })
	}

	fn child_topics<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		Box::pin(async { Self::fail::<Vec<TopicRef>>() })
	}
}
impl QueryDetector for FailingProviders {
	fn detect<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		_index: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Detection>> {
		Box::pin(async { Self::fail::<Detection>() })
	}
}
