use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read insights config at {path:?}.")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse insights config at {path:?}.")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Failed to read event taxonomy at {path:?} (nl.events_path).")]
	ReadEvents { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse event taxonomy at {path:?}: {source}")]
	ParseEvents { path: PathBuf, source: toml::de::Error },
	#[error("{message}")]
	Validation { message: String },
}
