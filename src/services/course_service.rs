use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::db::repository::{CourseQuery, CourseRepository, RepoResult};
use crate::models::{CourseFilterRequest, CourseSummary};
use crate::services::mapper;

/// Looks up courses for an already validated filter request.
#[derive(Clone)]
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip_all, name = "service#get_courses")]
    pub async fn get_courses(
        &self,
        request: &CourseFilterRequest,
        cancel: &CancellationToken,
    ) -> RepoResult<Vec<CourseSummary>> {
        let query = CourseQuery {
            code: request.course_code.clone(),
            title: request.course_title.clone(),
        };

        let courses = self.repo.find_courses(query, cancel).await?;
        Ok(mapper::to_summaries(courses))
    }
}
