use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::db::repository::SqliteCourseRepository;
use crate::models::CourseFilterRequest;
use crate::services::CourseService;
use crate::validation::Validator;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub courses: CourseService,
    pub filter_validator: Arc<Validator<CourseFilterRequest>>,
    /// Cancelled on shutdown; every request query runs under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(db: SqlitePool, courses: CourseService, shutdown: CancellationToken) -> Self {
        Self {
            db,
            courses,
            filter_validator: Arc::new(Validator::course_filter()),
            shutdown,
        }
    }

    /// State backed by the SQLite course repository on `db`.
    pub fn sqlite(db: SqlitePool, shutdown: CancellationToken) -> Self {
        let courses = CourseService::new(Arc::new(SqliteCourseRepository::new(db.clone())));
        Self::new(db, courses, shutdown)
    }
}
