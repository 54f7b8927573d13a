// eduhub-core/src/lib.rs
// Typed data-access layer for the EduHub platform over MongoDB

pub mod database;
pub mod error;
pub mod indexes;
pub mod models;
pub mod queries;
pub mod reports;
pub mod schema;
pub mod validate;

// Public exports
pub use database::EduHub;
pub use error::{EduHubError, Result};
pub use models::{
    Assignment, Course, CourseLevel, Enrollment, EnrollmentStatus, Lesson, ProfileUpdate,
    Submission, SubmissionStatus, User, UserProfile, UserRole,
};
pub use reports::{
    CategoryStats, CourseEnrollmentStats, InstructorAnalytics, MonthlyEnrollmentTrend,
    StudentPerformance,
};
