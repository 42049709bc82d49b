use serde::Deserialize;

/// Optional substrings used to narrow the course list.
///
/// Read from the query string of `GET /courses` or from the JSON body of
/// `POST /courses/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilterRequest {
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl CourseFilterRequest {
    pub fn new(course_title: Option<&str>, course_code: Option<&str>) -> Self {
        Self {
            course_title: course_title.map(str::to_string),
            course_code: course_code.map(str::to_string),
        }
    }
}
