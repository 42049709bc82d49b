pub mod course;
pub mod filter;
pub mod summary;

pub use course::{Course, NewCourse};
pub use filter::CourseFilterRequest;
pub use summary::CourseSummary;
