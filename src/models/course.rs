use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

/// A row of the `Courses` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert shape for a course. Rows are only written by the seeding tool and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}
