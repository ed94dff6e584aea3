use std::sync::Arc;

use insight_service::InsightService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<InsightService>,
}
impl AppState {
	pub fn new(config: insight_config::Config) -> Self {
		Self::with_service(InsightService::new(config))
	}

	pub fn with_service(service: InsightService) -> Self {
		Self { service: Arc::new(service) }
	}
}
