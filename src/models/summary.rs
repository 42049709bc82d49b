use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outward view of a course returned by the lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_title: String,
    pub course_code: String,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}
