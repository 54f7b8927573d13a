// eduhub-core/src/validate.rs
// Client-side field validation, applied before any write reaches the server.
// The collection validators in `schema` enforce the same rules server-side;
// rejecting here gives callers a typed error instead of a write error.

use crate::error::{EduHubError, Result};
use crate::models::{Assignment, Course, Lesson, Submission, User};
use regex::Regex;
use std::sync::OnceLock;

/// Accepted email shape. Also embedded in the `users` collection validator,
/// so both sides reject the same strings.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

pub fn validate_email(email: &str) -> Result<()> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(EduHubError::validation(
            "email",
            format!("'{email}' is not a valid email address"),
        ))
    }
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(EduHubError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

pub fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    // NaN fails both comparisons, so spell the accept condition positively
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EduHubError::validation(
            field,
            format!("must be a non-negative number, got {value}"),
        ))
    }
}

pub fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EduHubError::validation(
            field,
            format!("must be a positive number, got {value}"),
        ))
    }
}

pub fn validate_grade(grade: f64, max_score: f64) -> Result<()> {
    if grade.is_finite() && (0.0..=max_score).contains(&grade) {
        Ok(())
    } else {
        Err(EduHubError::validation(
            "grade",
            format!("must be within 0..={max_score}, got {grade}"),
        ))
    }
}

pub fn validate_new_user(user: &User) -> Result<()> {
    validate_email(&user.email)?;
    require_non_empty("firstName", &user.first_name)?;
    require_non_empty("lastName", &user.last_name)?;
    Ok(())
}

pub fn validate_new_course(course: &Course) -> Result<()> {
    require_non_empty("title", &course.title)?;
    require_non_empty("category", &course.category)?;
    require_non_negative("price", course.price)?;
    Ok(())
}

pub fn validate_new_lesson(lesson: &Lesson) -> Result<()> {
    require_non_empty("title", &lesson.title)?;
    if lesson.position == 0 {
        return Err(EduHubError::validation("position", "must be 1 or greater"));
    }
    Ok(())
}

pub fn validate_new_assignment(assignment: &Assignment) -> Result<()> {
    require_non_empty("title", &assignment.title)?;
    require_positive("maxScore", assignment.max_score)?;
    Ok(())
}

pub fn validate_new_submission(submission: &Submission) -> Result<()> {
    require_non_empty("text", &submission.text)?;
    Ok(())
}
