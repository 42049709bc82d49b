pub mod course_service;
pub mod mapper;

pub use course_service::CourseService;
