use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use insight_domain::{Counters, Detection};

/// Free-form debug notes collected while handling one request.
pub type DebugLogs = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
	pub counters: Counters,
	pub logs: DebugLogs,
}

/// Envelope shared by every insights operation: its own fields plus status and debug output.
#[derive(Debug, Clone, Serialize)]
pub struct InsightResponse<T> {
	#[serde(flatten)]
	pub data: T,
	pub status: String,
	pub debug: DebugInfo,
	pub detection: Detection,
}
impl<T> InsightResponse<T> {
	pub fn new(
		data: T,
		status: impl Into<String>,
		detection: Detection,
		counters: Counters,
		logs: DebugLogs,
	) -> Self {
		Self { data, status: status.into(), debug: DebugInfo { counters, logs }, detection }
	}
}
