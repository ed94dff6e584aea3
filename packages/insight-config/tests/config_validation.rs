use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::{Table, Value};

use insight_config::{Config, Environment, IndexConfig, ModelConfig, ModelUsage};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");
const EVENTS_TOML: &str = include_str!("fixtures/events.toml");

fn sample_table() -> Table {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn section<'a>(root: &'a mut Table, key: &str) -> &'a mut Table {
	root.get_mut(key)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{key}]."))
}

fn render(table: &Table) -> String {
	toml::to_string(table).expect("Failed to render template config.")
}

fn temp_path(suffix: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("insight_config_test_{nanos}_{pid}_{ordinal}{suffix}"));

	path
}

fn write_temp_config(payload: String) -> PathBuf {
	let path = temp_path(".toml");

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> insight_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = insight_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(render(&sample_table())).expect("Sample config must load.");

	assert_eq!(cfg.service.environment, Environment::Local);
	assert!(!cfg.service.log_query);
	assert_eq!(cfg.nl.max_charts, 30);
	assert_eq!(cfg.nl.chart_titles.get("Count_Person").map(String::as_str), Some("Population"));
	assert!(cfg.events.event_types.is_empty());
	assert!(matches!(
		cfg.embeddings.models.get("ft-final-v20230717230459"),
		Some(ModelConfig::Local(model)) if model.usage == ModelUsage::Embeddings
	));
	assert!(matches!(cfg.embeddings.indexes.get("medium_ft"), Some(IndexConfig::Memory(_))));
}

#[test]
fn unsupported_embeddings_version_is_fatal() {
	let mut root = sample_table();

	section(&mut root, "embeddings").insert("version".to_string(), Value::Integer(2));

	let err = load_payload(render(&root)).expect_err("Expected embeddings version error.");

	assert!(
		err.to_string().contains("embeddings.version 2 is not supported"),
		"Unexpected error: {err}"
	);
}

#[test]
fn unknown_store_discriminator_is_rejected() {
	let payload = render(&sample_table()).replace("store = \"MEMORY\"", "store = \"REDIS\"");
	let err = load_payload(payload).expect_err("Expected unknown store type to fail parsing.");

	assert!(matches!(err, insight_config::Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn vertex_ai_is_rejected_in_production() {
	let mut root = sample_table();

	section(&mut root, "service")
		.insert("environment".to_string(), Value::String("production".to_string()));

	let models = section(section(&mut root, "embeddings"), "models");
	let mut vertex = Table::new();

	vertex.insert("type".to_string(), Value::String("VERTEXAI".to_string()));
	vertex.insert("usage".to_string(), Value::String("RERANKING".to_string()));
	vertex.insert("project_id".to_string(), Value::String("p".to_string()));
	vertex.insert("location".to_string(), Value::String("us-central1".to_string()));
	vertex.insert("prediction_endpoint_id".to_string(), Value::String("123".to_string()));
	models.insert("reranker".to_string(), Value::Table(vertex));

	let err = load_payload(render(&root)).expect_err("Expected VERTEXAI environment error.");

	assert!(
		err.to_string().contains("embeddings.models.reranker uses VERTEXAI"),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_index_must_exist() {
	let mut root = sample_table();

	section(&mut root, "nl")
		.insert("default_index".to_string(), Value::String("missing".to_string()));

	let err = load_payload(render(&root)).expect_err("Expected default index error.");

	assert!(err.to_string().contains("nl.default_index"), "Unexpected error: {err}");
}

#[test]
fn max_charts_must_be_positive() {
	let mut root = sample_table();

	section(&mut root, "nl").insert("max_charts".to_string(), Value::Integer(0));

	let err = load_payload(render(&root)).expect_err("Expected max_charts error.");

	assert!(
		err.to_string().contains("nl.max_charts must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn events_load_relative_to_config() {
	let events_path = temp_path("_events.toml");

	fs::write(&events_path, EVENTS_TOML).expect("Failed to write events file.");

	let file_name = events_path
		.file_name()
		.and_then(|name| name.to_str())
		.expect("Temp file name must be valid UTF-8.")
		.to_string();
	let mut root = sample_table();

	section(&mut root, "nl").insert("events_path".to_string(), Value::String(file_name));

	let result = load_payload(render(&root));

	fs::remove_file(&events_path).expect("Failed to remove events file.");

	let cfg = result.expect("Config with events must load.");

	assert_eq!(cfg.events.event_type_for("Count_WildfireEvent"), Some("FIRE"));
	assert_eq!(cfg.events.event_type_for("Count_Person"), None);
}

#[test]
fn missing_events_file_names_the_taxonomy() {
	let events_path = temp_path("_missing_events.toml");
	let mut root = sample_table();

	section(&mut root, "nl").insert(
		"events_path".to_string(),
		Value::String(events_path.to_string_lossy().into_owned()),
	);

	let err = load_payload(render(&root)).expect_err("Expected a missing events file error.");

	assert!(
		matches!(&err, insight_config::Error::ReadEvents { path, .. } if path == &events_path),
		"Unexpected error: {err}"
	);
	assert!(err.to_string().contains("event taxonomy"), "Unexpected error: {err}");
}

#[test]
fn malformed_events_file_is_a_taxonomy_parse_error() {
	let events_path = temp_path("_bad_events.toml");

	fs::write(&events_path, "[event_types.FIRE]\nsvs = 3\n").expect("Failed to write events file.");

	let err = insight_config::load_events(&events_path).expect_err("Expected a parse error.");

	fs::remove_file(&events_path).expect("Failed to remove events file.");

	assert!(matches!(err, insight_config::Error::ParseEvents { .. }), "Unexpected error: {err}");
}

#[test]
fn reload_events_requires_path() {
	let mut root = sample_table();

	section(&mut root, "nl").insert("reload_events".to_string(), Value::Boolean(true));

	let err = load_payload(render(&root)).expect_err("Expected reload_events error.");

	assert!(err.to_string().contains("nl.events_path must be set"), "Unexpected error: {err}");
}

#[test]
fn environments_gate_vertex_ai() {
	assert!(Environment::Autopush.allows_vertex_ai());
	assert!(!Environment::Production.allows_vertex_ai());
	assert!(!Environment::Staging.allows_vertex_ai());
	assert!(Environment::Production.is_production());
}
