use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::RepositoryError;
use crate::models::{Course, NewCourse};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Substring filters for [`CourseRepository::find_courses`]. `None` or empty matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    pub code: Option<String>,
    pub title: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Courses whose code contains `query.code` and whose name contains
    /// `query.title`, both case-insensitively.
    ///
    /// Returns [`RepositoryError::Cancelled`] once `cancel` fires, even when the
    /// query is already running.
    async fn find_courses(&self, query: CourseQuery, cancel: &CancellationToken) -> RepoResult<Vec<Course>>;
}

const FIND_COURSES: &str = r#"
    SELECT id, name, code, effective_date, expiry_date, is_active,
           description, created_at, updated_at
    FROM Courses
    WHERE (?1 IS NULL OR code_folded LIKE ?1 ESCAPE '\')
      AND (?2 IS NULL OR name_folded LIKE ?2 ESCAPE '\')
    ORDER BY id
"#;

#[derive(Debug, Clone)]
pub struct SqliteCourseRepository {
    db: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    #[instrument(skip(self, cancel), name = "repository#find_courses")]
    async fn find_courses(&self, query: CourseQuery, cancel: &CancellationToken) -> RepoResult<Vec<Course>> {
        let code = contains_pattern(query.code.as_deref());
        let title = contains_pattern(query.title.as_deref());

        let fetch = sqlx::query_as::<_, Course>(FIND_COURSES)
            .bind(code)
            .bind(title)
            .fetch_all(&self.db);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("course query cancelled");
                Err(RepositoryError::Cancelled)
            }
            rows = fetch => {
                let rows = rows?;
                debug!(count = rows.len(), "course query finished");
                Ok(rows)
            }
        }
    }
}

/// Case folding shared by stored `*_folded` columns and filter patterns.
fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Folded `%value%` with LIKE wildcards escaped, or `None` when there is nothing to match on.
fn contains_pattern(value: Option<&str>) -> Option<String> {
    let value = fold(value.filter(|v| !v.is_empty())?);

    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    Some(pattern)
}

pub async fn insert_course(db: &SqlitePool, req: NewCourse) -> Result<Course, sqlx::Error> {
    let now = Utc::now();

    let id = sqlx::query(
        r#"
        INSERT INTO Courses
            (name, code, name_folded, code_folded, effective_date, expiry_date,
            is_active, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL)
        "#,
    )
    .bind(&req.name)
    .bind(&req.code)
    .bind(fold(&req.name))
    .bind(fold(&req.code))
    .bind(req.effective_date)
    .bind(req.expiry_date)
    .bind(req.is_active)
    .bind(&req.description)
    .bind(now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Course {
        id,
        name: req.name,
        code: req.code,
        effective_date: req.effective_date,
        expiry_date: req.expiry_date,
        is_active: req.is_active,
        description: req.description,
        created_at: now,
        updated_at: None,
    })
}

pub async fn course_code_exists(db: &SqlitePool, code: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM Courses WHERE code = ? LIMIT 1")
        .bind(code)
        .fetch_optional(db)
        .await?;

    Ok(found.is_some())
}
