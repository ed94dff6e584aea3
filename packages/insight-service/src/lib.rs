pub mod charts;
pub mod detect;
pub mod detector;
pub mod fulfill;
pub mod related;
pub mod response;

mod error;

pub use charts::{Block, Category, ChartInputs, PageConfig, PageMetadata, StatVarSpec, Tile};
pub use detect::{DetectRequest, DetectResponse};
pub use error::{Error, Result};
pub use fulfill::{FulfillRequest, FulfillResponse};
pub use response::{DebugInfo, DebugLogs, InsightResponse};

use std::{borrow::Cow, collections::HashSet, future::Future, pin::Pin, sync::Arc};

use insight_config::{Config, EventConfig, ProviderConfig};
use insight_domain::{Detection, Place, PlaceMetadata, TopicRef, context::ContextEntry, session};
use insight_providers as providers;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maps dcids onto graph nodes.
pub trait EntityResolver
where
	Self: Send + Sync,
{
	fn resolve_places<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Place>>>;

	fn known_variables<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;
}

pub trait PlaceMetadataProvider
where
	Self: Send + Sync,
{
	fn place_metadata<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		place: &'a Place,
	) -> BoxFuture<'a, color_eyre::Result<PlaceMetadata>>;
}

pub trait TopicGraph
where
	Self: Send + Sync,
{
	fn parent_topics<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>>;

	fn child_topics<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>>;
}

/// Free-text detection. Only its output contract matters here.
pub trait QueryDetector
where
	Self: Send + Sync,
{
	fn detect<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		index: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Detection>>;
}

#[derive(Clone)]
pub struct Providers {
	pub resolver: Arc<dyn EntityResolver>,
	pub place_metadata: Arc<dyn PlaceMetadataProvider>,
	pub topic_graph: Arc<dyn TopicGraph>,
	pub detector: Arc<dyn QueryDetector>,
}
impl Providers {
	pub fn new(
		resolver: Arc<dyn EntityResolver>,
		place_metadata: Arc<dyn PlaceMetadataProvider>,
		topic_graph: Arc<dyn TopicGraph>,
		detector: Arc<dyn QueryDetector>,
	) -> Self {
		Self { resolver, place_metadata, topic_graph, detector }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let shared = Arc::new(DefaultProviders);

		Self {
			resolver: shared.clone(),
			place_metadata: shared.clone(),
			topic_graph: shared.clone(),
			detector: shared,
		}
	}
}

/// Request handling for the insights endpoints. Holds no per-request state.
pub struct InsightService {
	pub cfg: Config,
	pub providers: Providers,
	nopc_vars: HashSet<String>,
}
impl InsightService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let nopc_vars = cfg.nl.nopc_vars.iter().cloned().collect();

		Self { cfg, providers, nopc_vars }
	}

	/// Picks the session for a request: explicit id, then the history's id, then a new one.
	pub fn session_id(&self, requested: Option<String>, history: &[ContextEntry]) -> String {
		if let Some(id) = requested.filter(|id| !id.trim().is_empty()) {
			return id;
		}
		if let Some(id) = insight_domain::context::session_id(history) {
			return id.to_string();
		}
		if self.cfg.service.log_query {
			return session::new_session_id(&self.cfg.service.app_id);
		}

		session::TEST_SESSION_ID.to_string()
	}

	pub(crate) fn chart_inputs<'a>(&'a self, events: &'a EventConfig) -> ChartInputs<'a> {
		ChartInputs {
			events,
			sv_chart_titles: &self.cfg.nl.chart_titles,
			nopc_vars: &self.nopc_vars,
			max_charts: self.cfg.nl.max_charts as usize,
		}
	}

	/// The event taxonomy for this request, re-read from disk when local reloading is on.
	pub(crate) fn event_config(&self) -> Cow<'_, EventConfig> {
		if self.cfg.nl.reload_events
			&& self.cfg.service.environment.is_local()
			&& let Some(path) = self.cfg.nl.events_path.as_deref()
		{
			match insight_config::load_events(path) {
				Ok(events) => return Cow::Owned(events),
				Err(err) => {
					tracing::warn!(error = %err, "Failed to reload event config; using the startup copy.");
				},
			}
		}

		Cow::Borrowed(&self.cfg.events)
	}
}

struct DefaultProviders;

impl EntityResolver for DefaultProviders {
	fn resolve_places<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Place>>> {
		Box::pin(providers::resolver::resolve_places(cfg, dcids))
	}

	fn known_variables<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(providers::resolver::known_variables(cfg, dcids))
	}
}

impl PlaceMetadataProvider for DefaultProviders {
	fn place_metadata<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		place: &'a Place,
	) -> BoxFuture<'a, color_eyre::Result<PlaceMetadata>> {
		Box::pin(providers::place_metadata::place_metadata(cfg, place))
	}
}

impl TopicGraph for DefaultProviders {
	fn parent_topics<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		Box::pin(providers::topic_graph::parent_topics(cfg, dcids))
	}

	fn child_topics<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		dcids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<TopicRef>>> {
		Box::pin(providers::topic_graph::child_topics(cfg, dcids))
	}
}

impl QueryDetector for DefaultProviders {
	fn detect<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		index: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Detection>> {
		Box::pin(providers::detector::detect(cfg, query, index))
	}
}
