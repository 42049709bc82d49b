use crate::models::{Course, CourseSummary};

pub fn to_summary(course: Course) -> CourseSummary {
    CourseSummary {
        course_title: course.name,
        course_code: course.code,
        effective_date: course.effective_date,
        expiry_date: course.expiry_date,
    }
}

pub fn to_summaries(courses: Vec<Course>) -> Vec<CourseSummary> {
    courses.into_iter().map(to_summary).collect()
}

impl From<Course> for CourseSummary {
    fn from(course: Course) -> Self {
        to_summary(course)
    }
}
