// eduhub-core/src/database.rs
// The EduHub facade: one client + one database handle, synchronous calls,
// typed models in and out. Every write validates client-side first, so the
// caller gets a typed error instead of a server-side validation failure.

use crate::error::{is_duplicate_key, EduHubError, Result};
use crate::indexes;
use crate::models::{
    Assignment, Course, Enrollment, EnrollmentStatus, Lesson, ProfileUpdate, Submission,
    SubmissionStatus, User, UserRole,
};
use crate::queries;
use crate::reports::{
    self, CategoryStats, CourseEnrollmentStats, InstructorAnalytics, MonthlyEnrollmentTrend,
    StudentPerformance,
};
use crate::schema;
use crate::validate;
use bson::oid::ObjectId;
use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::sync::{Client, Collection, Database};
use serde::Deserialize;
use tracing::{debug, info};

const COLLECTIONS: [&str; 6] = [
    User::COLLECTION,
    Course::COLLECTION,
    Enrollment::COLLECTION,
    Lesson::COLLECTION,
    Assignment::COLLECTION,
    Submission::COLLECTION,
];

fn duplicate_guard(
    err: mongodb::error::Error,
    collection: &'static str,
    field: &'static str,
) -> EduHubError {
    if is_duplicate_key(&err) {
        EduHubError::DuplicateKey { collection, field }
    } else {
        EduHubError::Database(err)
    }
}

#[derive(Deserialize)]
struct CourseWithInstructor {
    course: Course,
    instructor: User,
}

/// Handle to one EduHub database. Owns the client for its lifetime; all
/// operations are synchronous request/response calls.
pub struct EduHub {
    client: Client,
    db: Database,
}

impl EduHub {
    /// Builds a client from a connection string and binds the named database.
    /// The driver connects lazily; use [`ping`](Self::ping) to fail fast.
    pub fn connect(uri: &str, db_name: &str) -> Result<EduHub> {
        let client = Client::with_uri_str(uri)?;
        let db = client.database(db_name);
        info!(database = db_name, "eduhub client initialized");
        Ok(EduHub { client, db })
    }

    /// Round-trips a `ping` command to verify the server is reachable.
    pub fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }, None)?;
        Ok(())
    }

    /// The underlying database handle, for callers that need raw access
    /// (test harnesses drop their scratch database through this).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates missing collections and (re)applies their validators.
    pub fn init_collections(&self) -> Result<()> {
        schema::apply_schemas(&self.db)?;
        info!("collection validators applied");
        Ok(())
    }

    /// Ensures the full index set exists, returning the index names.
    pub fn create_indexes(&self) -> Result<Vec<String>> {
        let names = indexes::ensure_indexes(&self.db)?;
        info!(indexes = names.len(), "index set ensured");
        Ok(names)
    }

    /// Shuts the client down, closing its connections.
    pub fn close(self) {
        self.client.shutdown();
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(User::COLLECTION)
    }

    fn courses(&self) -> Collection<Course> {
        self.db.collection(Course::COLLECTION)
    }

    fn enrollments(&self) -> Collection<Enrollment> {
        self.db.collection(Enrollment::COLLECTION)
    }

    fn lessons(&self) -> Collection<Lesson> {
        self.db.collection(Lesson::COLLECTION)
    }

    fn assignments(&self) -> Collection<Assignment> {
        self.db.collection(Assignment::COLLECTION)
    }

    fn submissions(&self) -> Collection<Submission> {
        self.db.collection(Submission::COLLECTION)
    }

    // ----- users -----

    /// Validates and inserts a user. A reused email fails with
    /// [`EduHubError::DuplicateKey`].
    pub fn add_user(&self, mut user: User) -> Result<ObjectId> {
        validate::validate_new_user(&user)?;

        let id = user.id.unwrap_or_else(ObjectId::new);
        user.id = Some(id);
        self.users()
            .insert_one(&user, None)
            .map_err(|e| duplicate_guard(e, User::COLLECTION, "email"))?;

        debug!(user = %id, role = %user.role, "inserted user");
        Ok(id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }, None)?)
    }

    /// Active students, ordered by email.
    pub fn find_active_students(&self) -> Result<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "email": 1 }).build();
        let cursor = self.users().find(queries::active_students(), options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<User>>>()?)
    }

    /// Applies a partial profile update with dotted-path `$set` semantics.
    /// Returns whether a user matched; an unknown id is a no-op `Ok(false)`.
    /// Re-applying the same update is idempotent.
    pub fn update_user_profile(&self, user_id: ObjectId, update: ProfileUpdate) -> Result<bool> {
        if update.is_empty() {
            return Err(EduHubError::validation("update", "no fields set"));
        }
        if let Some(ref first_name) = update.first_name {
            validate::require_non_empty("firstName", first_name)?;
        }
        if let Some(ref last_name) = update.last_name {
            validate::require_non_empty("lastName", last_name)?;
        }

        let result = self.users().update_one(
            queries::by_id(user_id),
            doc! { "$set": update.set_document() },
            None,
        )?;
        debug!(user = %user_id, matched = result.matched_count, "profile update");
        Ok(result.matched_count > 0)
    }

    /// Soft-deactivates a user; the document is kept. Returns whether a user
    /// matched.
    pub fn deactivate_user(&self, user_id: ObjectId) -> Result<bool> {
        let result = self.users().update_one(
            queries::by_id(user_id),
            doc! { "$set": { "isActive": false } },
            None,
        )?;
        Ok(result.matched_count > 0)
    }

    pub fn reactivate_user(&self, user_id: ObjectId) -> Result<bool> {
        let result = self.users().update_one(
            queries::by_id(user_id),
            doc! { "$set": { "isActive": true } },
            None,
        )?;
        Ok(result.matched_count > 0)
    }

    // ----- courses -----

    /// Validates and inserts a course. The instructor reference must resolve
    /// to an existing user with the instructor role.
    pub fn add_course(&self, mut course: Course) -> Result<ObjectId> {
        validate::validate_new_course(&course)?;
        self.require_instructor(course.instructor_id)?;

        let id = course.id.unwrap_or_else(ObjectId::new);
        course.id = Some(id);
        self.courses().insert_one(&course, None)?;

        debug!(course = %id, title = %course.title, "inserted course");
        Ok(id)
    }

    /// Courses in a category, ordered by title.
    pub fn find_courses_by_category(&self, category: &str) -> Result<Vec<Course>> {
        let options = FindOptions::builder().sort(doc! { "title": 1 }).build();
        let cursor = self
            .courses()
            .find(queries::courses_by_category(category), options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Course>>>()?)
    }

    /// Courses priced within the closed interval `min..=max`, cheapest first.
    /// Both bounds are included; an inverted interval matches nothing.
    pub fn find_courses_in_price_range(&self, min: f64, max: f64) -> Result<Vec<Course>> {
        let options = FindOptions::builder().sort(doc! { "price": 1 }).build();
        let cursor = self.courses().find(queries::price_range(min, max), options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Course>>>()?)
    }

    /// Case-insensitive substring search on course titles.
    pub fn search_courses_by_title(&self, term: &str) -> Result<Vec<Course>> {
        let options = FindOptions::builder().sort(doc! { "title": 1 }).build();
        let cursor = self.courses().find(queries::title_contains(term), options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Course>>>()?)
    }

    /// Marks a course published. Returns whether a course matched.
    pub fn publish_course(&self, course_id: ObjectId) -> Result<bool> {
        let result = self.courses().update_one(
            queries::by_id(course_id),
            doc! { "$set": { "published": true } },
            None,
        )?;
        Ok(result.matched_count > 0)
    }

    /// Adds tags to a course without duplicating ones already present.
    pub fn add_course_tags<I, S>(&self, course_id: ObjectId, tags: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        let result = self.courses().update_one(
            queries::by_id(course_id),
            doc! { "$addToSet": { "tags": { "$each": tags } } },
            None,
        )?;
        Ok(result.matched_count > 0)
    }

    /// One course joined with its instructor document.
    pub fn get_course_with_instructor(
        &self,
        course_id: ObjectId,
    ) -> Result<Option<(Course, User)>> {
        let rows: Vec<CourseWithInstructor> = self.run_pipeline(
            Course::COLLECTION,
            queries::course_with_instructor_pipeline(course_id),
        )?;
        Ok(rows.into_iter().next().map(|row| (row.course, row.instructor)))
    }

    // ----- enrollments -----

    /// Enrolls a student into a course, timestamped now. The student must be
    /// an active user with the student role and the course must exist; a
    /// second enrollment in the same course fails with
    /// [`EduHubError::DuplicateKey`].
    pub fn enroll_student(&self, student_id: ObjectId, course_id: ObjectId) -> Result<ObjectId> {
        self.enroll_student_at(student_id, course_id, bson::DateTime::now())
    }

    /// Same as [`enroll_student`](Self::enroll_student) with an explicit
    /// enrollment timestamp, for imports of historical records.
    pub fn enroll_student_at(
        &self,
        student_id: ObjectId,
        course_id: ObjectId,
        enrolled_at: bson::DateTime,
    ) -> Result<ObjectId> {
        self.require_student(student_id)?;
        self.require_course(course_id)?;

        let mut enrollment = Enrollment::new(student_id, course_id);
        enrollment.enrolled_at = enrolled_at;
        let id = ObjectId::new();
        enrollment.id = Some(id);
        self.enrollments()
            .insert_one(&enrollment, None)
            .map_err(|e| duplicate_guard(e, Enrollment::COLLECTION, "(studentId, courseId)"))?;

        debug!(enrollment = %id, student = %student_id, course = %course_id, "enrolled");
        Ok(id)
    }

    /// Enrollments of one student, oldest first.
    pub fn find_enrollments_for_student(&self, student_id: ObjectId) -> Result<Vec<Enrollment>> {
        let options = FindOptions::builder().sort(doc! { "enrolledAt": 1 }).build();
        let cursor = self
            .enrollments()
            .find(doc! { "studentId": student_id }, options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Enrollment>>>()?)
    }

    /// The user documents of everyone enrolled in a course, in enrollment
    /// order.
    pub fn find_students_in_course(&self, course_id: ObjectId) -> Result<Vec<User>> {
        self.run_pipeline(
            Enrollment::COLLECTION,
            queries::students_in_course_pipeline(course_id),
        )
    }

    /// Flips an enrollment to completed. Returns whether one matched.
    pub fn complete_enrollment(&self, enrollment_id: ObjectId) -> Result<bool> {
        self.set_enrollment_status(enrollment_id, EnrollmentStatus::Completed)
    }

    /// Flips an enrollment to dropped; the record is kept for reporting.
    pub fn drop_enrollment(&self, enrollment_id: ObjectId) -> Result<bool> {
        self.set_enrollment_status(enrollment_id, EnrollmentStatus::Dropped)
    }

    fn set_enrollment_status(
        &self,
        enrollment_id: ObjectId,
        status: EnrollmentStatus,
    ) -> Result<bool> {
        let result = self.enrollments().update_one(
            queries::by_id(enrollment_id),
            doc! { "$set": { "status": status.as_str() } },
            None,
        )?;
        Ok(result.matched_count > 0)
    }

    // ----- lessons -----

    /// Adds a lesson to an existing course. Two lessons cannot share a
    /// position within one course.
    pub fn add_lesson(&self, mut lesson: Lesson) -> Result<ObjectId> {
        validate::validate_new_lesson(&lesson)?;
        self.require_course(lesson.course_id)?;

        let id = lesson.id.unwrap_or_else(ObjectId::new);
        lesson.id = Some(id);
        self.lessons()
            .insert_one(&lesson, None)
            .map_err(|e| duplicate_guard(e, Lesson::COLLECTION, "(courseId, position)"))?;
        Ok(id)
    }

    /// Lessons of a course in position order.
    pub fn course_lessons(&self, course_id: ObjectId) -> Result<Vec<Lesson>> {
        let options = FindOptions::builder().sort(doc! { "position": 1 }).build();
        let cursor = self.lessons().find(doc! { "courseId": course_id }, options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Lesson>>>()?)
    }

    /// Hard-deletes a lesson; the only destructive operation in the facade.
    /// Positions of later lessons are not renumbered. Returns whether a
    /// lesson was deleted.
    pub fn remove_lesson(&self, lesson_id: ObjectId) -> Result<bool> {
        let result = self
            .lessons()
            .delete_one(queries::by_id(lesson_id), None)?;
        Ok(result.deleted_count > 0)
    }

    // ----- assignments -----

    pub fn add_assignment(&self, mut assignment: Assignment) -> Result<ObjectId> {
        validate::validate_new_assignment(&assignment)?;
        self.require_course(assignment.course_id)?;

        let id = assignment.id.unwrap_or_else(ObjectId::new);
        assignment.id = Some(id);
        self.assignments().insert_one(&assignment, None)?;
        Ok(id)
    }

    /// Assignments of a course, due-soonest first (undated ones lead).
    pub fn course_assignments(&self, course_id: ObjectId) -> Result<Vec<Assignment>> {
        let options = FindOptions::builder()
            .sort(doc! { "dueAt": 1, "title": 1 })
            .build();
        let cursor = self
            .assignments()
            .find(doc! { "courseId": course_id }, options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Assignment>>>()?)
    }

    // ----- submissions -----

    /// Records a student's submission. The assignment must exist and the
    /// student must be an active user with the student role; one submission
    /// per student per assignment.
    pub fn submit_assignment(&self, mut submission: Submission) -> Result<ObjectId> {
        validate::validate_new_submission(&submission)?;
        self.require_assignment(submission.assignment_id)?;
        self.require_student(submission.student_id)?;

        let id = submission.id.unwrap_or_else(ObjectId::new);
        submission.id = Some(id);
        self.submissions()
            .insert_one(&submission, None)
            .map_err(|e| duplicate_guard(e, Submission::COLLECTION, "(assignmentId, studentId)"))?;

        debug!(submission = %id, assignment = %submission.assignment_id, "submitted");
        Ok(id)
    }

    /// Grades a submission, bounded by the assignment's max score, and flips
    /// its status to graded. Returns `Ok(false)` when no submission matches.
    /// Re-grading overwrites the previous grade.
    pub fn grade_submission(&self, submission_id: ObjectId, grade: f64) -> Result<bool> {
        let Some(submission) = self
            .submissions()
            .find_one(queries::by_id(submission_id), None)?
        else {
            return Ok(false);
        };

        let assignment = self.require_assignment(submission.assignment_id)?;
        validate::validate_grade(grade, assignment.max_score)?;

        let result = self.submissions().update_one(
            queries::by_id(submission_id),
            doc! { "$set": { "grade": grade, "status": SubmissionStatus::Graded.as_str() } },
            None,
        )?;
        debug!(submission = %submission_id, grade, "graded");
        Ok(result.matched_count > 0)
    }

    /// All submissions of one student, oldest first.
    pub fn student_submissions(&self, student_id: ObjectId) -> Result<Vec<Submission>> {
        let options = FindOptions::builder().sort(doc! { "submittedAt": 1 }).build();
        let cursor = self
            .submissions()
            .find(doc! { "studentId": student_id }, options)?;
        Ok(cursor.collect::<mongodb::error::Result<Vec<Submission>>>()?)
    }

    // ----- reports -----

    /// Per-course enrollment counts by status, most enrolled first.
    pub fn get_course_enrollment_stats(&self) -> Result<Vec<CourseEnrollmentStats>> {
        self.run_pipeline(
            Enrollment::COLLECTION,
            reports::course_enrollment_stats_pipeline(),
        )
    }

    /// Course count and price spread per category, alphabetical.
    pub fn get_category_stats(&self) -> Result<Vec<CategoryStats>> {
        self.run_pipeline(Course::COLLECTION, reports::category_stats_pipeline())
    }

    /// Grade summary per student over graded submissions, best average first.
    pub fn get_student_performance(&self) -> Result<Vec<StudentPerformance>> {
        self.run_pipeline(
            Submission::COLLECTION,
            reports::student_performance_pipeline(),
        )
    }

    /// Course count, enrollment seats and revenue per instructor.
    pub fn get_instructor_analytics(&self) -> Result<Vec<InstructorAnalytics>> {
        self.run_pipeline(Course::COLLECTION, reports::instructor_analytics_pipeline())
    }

    /// Enrollments per calendar month, ascending.
    pub fn get_monthly_enrollment_trend(&self) -> Result<Vec<MonthlyEnrollmentTrend>> {
        self.run_pipeline(
            Enrollment::COLLECTION,
            reports::monthly_enrollment_trend_pipeline(),
        )
    }

    /// Document count per collection, in schema order.
    pub fn collection_counts(&self) -> Result<Vec<(&'static str, u64)>> {
        let mut counts = Vec::with_capacity(COLLECTIONS.len());
        for name in COLLECTIONS {
            let count = self
                .db
                .collection::<Document>(name)
                .count_documents(doc! {}, None)?;
            counts.push((name, count));
        }
        Ok(counts)
    }

    fn run_pipeline<T: serde::de::DeserializeOwned>(
        &self,
        collection: &'static str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<T>> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(pipeline, None)?;
        let mut rows = Vec::new();
        for document in cursor {
            rows.push(bson::from_document(document?)?);
        }
        Ok(rows)
    }

    // ----- referential checks -----

    fn require_student(&self, student_id: ObjectId) -> Result<User> {
        let user = self
            .users()
            .find_one(queries::by_id(student_id), None)?
            .ok_or_else(|| EduHubError::broken_reference(User::COLLECTION, student_id))?;

        if user.role != UserRole::Student {
            return Err(EduHubError::validation(
                "studentId",
                format!("user {student_id} is not a student"),
            ));
        }
        if !user.is_active {
            return Err(EduHubError::validation(
                "studentId",
                format!("student {student_id} is deactivated"),
            ));
        }
        Ok(user)
    }

    fn require_instructor(&self, instructor_id: ObjectId) -> Result<User> {
        let user = self
            .users()
            .find_one(queries::by_id(instructor_id), None)?
            .ok_or_else(|| EduHubError::broken_reference(User::COLLECTION, instructor_id))?;

        if user.role != UserRole::Instructor {
            return Err(EduHubError::validation(
                "instructorId",
                format!("user {instructor_id} is not an instructor"),
            ));
        }
        Ok(user)
    }

    fn require_course(&self, course_id: ObjectId) -> Result<Course> {
        self.courses()
            .find_one(queries::by_id(course_id), None)?
            .ok_or_else(|| EduHubError::broken_reference(Course::COLLECTION, course_id))
    }

    fn require_assignment(&self, assignment_id: ObjectId) -> Result<Assignment> {
        self.assignments()
            .find_one(queries::by_id(assignment_id), None)?
            .ok_or_else(|| EduHubError::broken_reference(Assignment::COLLECTION, assignment_id))
    }
}
