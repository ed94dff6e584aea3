use uuid::Uuid;

/// Used when query logging is off so test traffic does not fan out into many sessions.
pub const TEST_SESSION_ID: &str = "007_999999999";

pub fn new_session_id(app_id: &str) -> String {
	format!("{app_id}_{}", Uuid::new_v4().simple())
}
