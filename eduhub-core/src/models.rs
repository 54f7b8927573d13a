// eduhub-core/src/models.rs
// Typed records for the six EduHub collections.
//
// Every entity is an explicit struct serialized to BSON with camelCase wire
// names. The `_id` field is `None` until the document has been inserted;
// the driver never sees it on the way in, MongoDB assigns it, and reads get it
// back as `Some`.

use bson::oid::ObjectId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a platform account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Instructor => "instructor",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier of a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Graded => "graded",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form profile block embedded in a user document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Platform account. Never hard-deleted: `is_active` is flipped instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub profile: UserProfile,
    pub is_active: bool,
    pub created_at: bson::DateTime,
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        User {
            id: None,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            profile: UserProfile::default(),
            is_active: true,
            created_at: bson::DateTime::now(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.profile.bio = Some(bio.into());
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A course owned by an instructor; exists independently of enrollments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub instructor_id: ObjectId,
    pub category: String,
    pub level: CourseLevel,
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: bson::DateTime,
}

impl Course {
    pub const COLLECTION: &'static str = "courses";

    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        instructor_id: ObjectId,
        category: impl Into<String>,
        level: CourseLevel,
        price: f64,
    ) -> Self {
        Course {
            id: None,
            title: title.into(),
            description: description.into(),
            instructor_id,
            category: category.into(),
            level,
            price,
            tags: Vec::new(),
            published: false,
            created_at: bson::DateTime::now(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }
}

/// Links exactly one student to one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub student_id: ObjectId,
    pub course_id: ObjectId,
    pub enrolled_at: bson::DateTime,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    pub const COLLECTION: &'static str = "enrollments";

    pub fn new(student_id: ObjectId, course_id: ObjectId) -> Self {
        Enrollment {
            id: None,
            student_id,
            course_id,
            enrolled_at: bson::DateTime::now(),
            status: EnrollmentStatus::Active,
        }
    }
}

/// Course content unit, ordered by `position` within its course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub course_id: ObjectId,
    pub title: String,
    pub body: String,
    /// 1-based order within the course
    pub position: u32,
}

impl Lesson {
    pub const COLLECTION: &'static str = "lessons";

    pub fn new(
        course_id: ObjectId,
        title: impl Into<String>,
        body: impl Into<String>,
        position: u32,
    ) -> Self {
        Lesson {
            id: None,
            course_id,
            title: title.into(),
            body: body.into(),
            position,
        }
    }
}

/// Gradable task attached to a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub course_id: ObjectId,
    pub title: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<bson::DateTime>,
    pub max_score: f64,
}

impl Assignment {
    pub const COLLECTION: &'static str = "assignments";

    pub fn new(
        course_id: ObjectId,
        title: impl Into<String>,
        instructions: impl Into<String>,
        max_score: f64,
    ) -> Self {
        Assignment {
            id: None,
            course_id,
            title: title.into(),
            instructions: instructions.into(),
            due_at: None,
            max_score,
        }
    }

    pub fn with_due_at(mut self, due_at: bson::DateTime) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

/// A student's answer to an assignment; `grade` is set when an instructor
/// grades it and `status` moves to `graded`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub assignment_id: ObjectId,
    pub student_id: ObjectId,
    pub submitted_at: bson::DateTime,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    pub status: SubmissionStatus,
}

impl Submission {
    pub const COLLECTION: &'static str = "submissions";

    pub fn new(assignment_id: ObjectId, student_id: ObjectId, text: impl Into<String>) -> Self {
        Submission {
            id: None,
            assignment_id,
            student_id,
            submitted_at: bson::DateTime::now(),
            text: text.into(),
            grade: None,
            status: SubmissionStatus::Submitted,
        }
    }
}

/// Partial update for a user document, applied with dotted-path `$set`
/// semantics. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.skills.is_none()
    }

    /// Dotted-path `$set` payload. Empty document when nothing is set.
    pub fn set_document(&self) -> Document {
        let mut set = doc! {};
        if let Some(ref first_name) = self.first_name {
            set.insert("firstName", first_name.as_str());
        }
        if let Some(ref last_name) = self.last_name {
            set.insert("lastName", last_name.as_str());
        }
        if let Some(ref bio) = self.bio {
            set.insert("profile.bio", bio.as_str());
        }
        if let Some(ref skills) = self.skills {
            set.insert("profile.skills", skills.clone());
        }
        set
    }
}
