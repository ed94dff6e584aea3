mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Embeddings, Environment, EventConfig, EventType, FileIndexConfig, IndexConfig,
	LocalModelConfig, ModelConfig, ModelUsage, Nl, ProviderConfig, Providers, Service,
	VertexAiIndexConfig, VertexAiModelConfig,
};

use std::{fs, path::Path};

use serde::Deserialize;

/// The only embeddings catalog layout this build understands.
pub const EMBEDDINGS_VERSION: u32 = 1;

#[derive(Deserialize)]
struct VersionProbe {
	embeddings: Option<EmbeddingsVersion>,
}

#[derive(Deserialize)]
struct EmbeddingsVersion {
	version: Option<u32>,
}

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let probe: VersionProbe = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	check_embeddings_version(probe.embeddings.and_then(|embeddings| embeddings.version))?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, path.parent());

	validate(&cfg)?;

	if let Some(events_path) = cfg.nl.events_path.as_deref() {
		cfg.events = load_events(events_path)?;
	}

	Ok(cfg)
}

pub fn load_events(path: &Path) -> Result<EventConfig> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadEvents { path: path.to_path_buf(), source: err })?;

	toml::from_str(&raw).map_err(|err| Error::ParseEvents { path: path.to_path_buf(), source: err })
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.app_id.trim().is_empty() {
		return Err(Error::Validation { message: "service.app_id must be non-empty.".to_string() });
	}
	if cfg.nl.max_charts == 0 {
		return Err(Error::Validation {
			message: "nl.max_charts must be greater than zero.".to_string(),
		});
	}
	if cfg.nl.reload_events && cfg.nl.events_path.is_none() {
		return Err(Error::Validation {
			message: "nl.events_path must be set when nl.reload_events is true.".to_string(),
		});
	}

	check_embeddings_version(Some(cfg.embeddings.version))?;

	if !cfg.embeddings.indexes.contains_key(&cfg.nl.default_index) {
		return Err(Error::Validation {
			message: format!(
				"nl.default_index {:?} must name an entry in embeddings.indexes.",
				cfg.nl.default_index
			),
		});
	}

	let allow_vertex_ai = cfg.service.environment.allows_vertex_ai();

	for (name, model) in &cfg.embeddings.models {
		if model.is_vertex_ai() && !allow_vertex_ai {
			return Err(Error::Validation {
				message: format!(
					"embeddings.models.{name} uses VERTEXAI, which is not allowed in this environment."
				),
			});
		}
	}
	for (name, index) in &cfg.embeddings.indexes {
		if index.is_vertex_ai() && !allow_vertex_ai {
			return Err(Error::Validation {
				message: format!(
					"embeddings.indexes.{name} uses VERTEXAI, which is not allowed in this environment."
				),
			});
		}

		match cfg.embeddings.models.get(index.model()) {
			Some(model) if model.usage() == ModelUsage::Embeddings => {},
			Some(_) => {
				return Err(Error::Validation {
					message: format!(
						"embeddings.indexes.{name}.model must reference an EMBEDDINGS model."
					),
				});
			},
			None => {
				return Err(Error::Validation {
					message: format!(
						"embeddings.indexes.{name}.model must name an entry in embeddings.models."
					),
				});
			},
		}
	}

	for (label, provider) in [
		("resolver", &cfg.providers.resolver),
		("place_metadata", &cfg.providers.place_metadata),
		("topic_graph", &cfg.providers.topic_graph),
		("detector", &cfg.providers.detector),
	] {
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn check_embeddings_version(version: Option<u32>) -> Result<()> {
	match version {
		Some(EMBEDDINGS_VERSION) => Ok(()),
		Some(other) => Err(Error::Validation {
			message: format!(
				"embeddings.version {other} is not supported; expected {EMBEDDINGS_VERSION}."
			),
		}),
		None => Err(Error::Validation { message: "embeddings.version must be set.".to_string() }),
	}
}

fn normalize(cfg: &mut Config, base_dir: Option<&Path>) {
	if cfg.nl.events_path.as_deref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.nl.events_path = None;
	}
	if let Some(base_dir) = base_dir
		&& let Some(events_path) = cfg.nl.events_path.as_mut()
		&& events_path.is_relative()
	{
		*events_path = base_dir.join(&*events_path);
	}

	cfg.nl.nopc_vars.retain(|sv| !sv.trim().is_empty());

	for provider in [
		&mut cfg.providers.resolver,
		&mut cfg.providers.place_metadata,
		&mut cfg.providers.topic_graph,
		&mut cfg.providers.detector,
	] {
		provider.api_base = provider.api_base.trim_end_matches('/').to_string();
	}
}

