// Integration tests for the aggregation reports, against a live MongoDB.
// Same skip-when-unreachable setup as integration_tests.rs.
use bson::oid::ObjectId;
use chrono::{TimeZone, Utc};
use eduhub_core::{Assignment, Course, CourseLevel, EduHub, Submission, User, UserRole};

const DEFAULT_TEST_URI: &str =
    "mongodb://localhost:27017/?serverSelectionTimeoutMS=1500&connectTimeoutMS=1500";

struct Scratch {
    hub: EduHub,
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = self.hub.database().drop(None);
    }
}

fn scratch(tag: &str) -> Option<Scratch> {
    let uri =
        std::env::var("EDUHUB_TEST_URI").unwrap_or_else(|_| DEFAULT_TEST_URI.to_string());
    let db_name = format!("eduhub_report_{}_{}", tag, ObjectId::new().to_hex());

    let hub = EduHub::connect(&uri, &db_name).ok()?;
    if hub.ping().is_err() {
        eprintln!("skipping {tag}: no MongoDB reachable at {uri}");
        return None;
    }

    hub.init_collections().unwrap();
    hub.create_indexes().unwrap();
    Some(Scratch { hub })
}

fn add_student(hub: &EduHub, tag: &str) -> ObjectId {
    hub.add_user(User::new(
        format!("{tag}@example.com"),
        tag.to_string(),
        "Student",
        UserRole::Student,
    ))
    .unwrap()
}

fn add_instructor(hub: &EduHub, tag: &str) -> ObjectId {
    hub.add_user(User::new(
        format!("{tag}@example.com"),
        tag.to_string(),
        "Instructor",
        UserRole::Instructor,
    ))
    .unwrap()
}

fn add_course(
    hub: &EduHub,
    instructor: ObjectId,
    title: &str,
    category: &str,
    price: f64,
) -> ObjectId {
    hub.add_course(Course::new(
        title,
        "report fixture",
        instructor,
        category,
        CourseLevel::Intermediate,
        price,
    ))
    .unwrap()
}

// Helper to build a BSON datetime from a calendar date
fn date(year: i32, month: u32, day: u32) -> bson::DateTime {
    bson::DateTime::from_chrono(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
}

#[test]
fn test_course_enrollment_stats_split_by_status() {
    let Some(scratch) = scratch("coursestats") else { return };
    let hub = &scratch.hub;

    let instructor = add_instructor(hub, "stats_teacher");
    let busy = add_course(hub, instructor, "Busy Course", "programming", 100.0);
    let quiet = add_course(hub, instructor, "Quiet Course", "programming", 80.0);
    // A course nobody enrolled in stays out of the report
    add_course(hub, instructor, "Empty Course", "programming", 60.0);

    let students: Vec<ObjectId> = (0..3)
        .map(|i| add_student(hub, &format!("stats_student{i}")))
        .collect();

    let completed = hub.enroll_student(students[0], busy).unwrap();
    let dropped = hub.enroll_student(students[1], busy).unwrap();
    hub.enroll_student(students[2], busy).unwrap();
    hub.enroll_student(students[0], quiet).unwrap();

    hub.complete_enrollment(completed).unwrap();
    hub.drop_enrollment(dropped).unwrap();

    let stats = hub.get_course_enrollment_stats().unwrap();
    assert_eq!(stats.len(), 2);

    // Most enrolled course first
    let top = &stats[0];
    assert_eq!(top.title, "Busy Course");
    assert_eq!(top.price, 100.0);
    assert_eq!(top.total, 3);
    assert_eq!(top.active, 1);
    assert_eq!(top.completed, 1);
    assert_eq!(top.dropped, 1);

    assert_eq!(stats[1].title, "Quiet Course");
    assert_eq!(stats[1].total, 1);
    assert_eq!(stats[1].active, 1);
}

#[test]
fn test_category_stats_price_spread() {
    let Some(scratch) = scratch("categories") else { return };
    let hub = &scratch.hub;

    let instructor = add_instructor(hub, "cat_teacher");
    add_course(hub, instructor, "Rust", "programming", 100.0);
    add_course(hub, instructor, "Go", "programming", 200.0);
    add_course(hub, instructor, "Watercolor", "art", 50.0);

    let stats = hub.get_category_stats().unwrap();

    // Alphabetical by category
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].category, "art");
    assert_eq!(stats[0].courses, 1);
    assert_eq!(stats[0].avg_price, 50.0);
    assert_eq!(stats[0].min_price, 50.0);
    assert_eq!(stats[0].max_price, 50.0);

    assert_eq!(stats[1].category, "programming");
    assert_eq!(stats[1].courses, 2);
    assert_eq!(stats[1].avg_price, 150.0);
    assert_eq!(stats[1].min_price, 100.0);
    assert_eq!(stats[1].max_price, 200.0);
}

#[test]
fn test_student_performance_covers_graded_only() {
    let Some(scratch) = scratch("performance") else { return };
    let hub = &scratch.hub;

    let instructor = add_instructor(hub, "perf_teacher");
    let course = add_course(hub, instructor, "Graded Course", "programming", 120.0);

    let first = hub
        .add_assignment(Assignment::new(course, "Quiz 1", "answer", 100.0))
        .unwrap();
    let second = hub
        .add_assignment(Assignment::new(course, "Quiz 2", "answer", 100.0))
        .unwrap();

    let strong = add_student(hub, "perf_strong");
    let middling = add_student(hub, "perf_middling");
    let silent = add_student(hub, "perf_silent");

    let s1 = hub.submit_assignment(Submission::new(first, strong, "a")).unwrap();
    let s2 = hub.submit_assignment(Submission::new(second, strong, "b")).unwrap();
    let s3 = hub.submit_assignment(Submission::new(first, middling, "c")).unwrap();
    // Submitted but never graded, so it must not count
    hub.submit_assignment(Submission::new(second, silent, "d")).unwrap();

    hub.grade_submission(s1, 80.0).unwrap();
    hub.grade_submission(s2, 90.0).unwrap();
    hub.grade_submission(s3, 70.0).unwrap();

    let rows = hub.get_student_performance().unwrap();
    assert_eq!(rows.len(), 2);

    // Best average first
    assert_eq!(rows[0].email, "perf_strong@example.com");
    assert_eq!(rows[0].graded, 2);
    assert_eq!(rows[0].avg_grade, 85.0);
    assert_eq!(rows[0].best_grade, 90.0);

    assert_eq!(rows[1].email, "perf_middling@example.com");
    assert_eq!(rows[1].graded, 1);
    assert_eq!(rows[1].avg_grade, 70.0);
}

#[test]
fn test_instructor_analytics_revenue() {
    let Some(scratch) = scratch("analytics") else { return };
    let hub = &scratch.hub;

    let prolific = add_instructor(hub, "ana_prolific");
    let newcomer = add_instructor(hub, "ana_newcomer");
    // An instructor with no courses does not appear at all
    add_instructor(hub, "ana_idle");

    let pricey = add_course(hub, prolific, "Pricey", "programming", 100.0);
    let cheap = add_course(hub, prolific, "Cheap", "programming", 50.0);
    add_course(hub, newcomer, "Unsold", "art", 75.0);

    let students: Vec<ObjectId> = (0..3)
        .map(|i| add_student(hub, &format!("ana_student{i}")))
        .collect();
    hub.enroll_student(students[0], pricey).unwrap();
    hub.enroll_student(students[1], pricey).unwrap();
    hub.enroll_student(students[2], cheap).unwrap();

    let rows = hub.get_instructor_analytics().unwrap();
    assert_eq!(rows.len(), 2);

    // Revenue counts every seat at the course price
    assert_eq!(rows[0].first_name, "ana_prolific");
    assert_eq!(rows[0].courses, 2);
    assert_eq!(rows[0].students, 3);
    assert_eq!(rows[0].revenue, 250.0);

    assert_eq!(rows[1].first_name, "ana_newcomer");
    assert_eq!(rows[1].courses, 1);
    assert_eq!(rows[1].students, 0);
    assert_eq!(rows[1].revenue, 0.0);
}

#[test]
fn test_monthly_enrollment_trend_buckets() {
    let Some(scratch) = scratch("trend") else { return };
    let hub = &scratch.hub;

    let instructor = add_instructor(hub, "trend_teacher");
    let first = add_course(hub, instructor, "First", "programming", 10.0);
    let second = add_course(hub, instructor, "Second", "programming", 10.0);

    let early = add_student(hub, "trend_early");
    let late = add_student(hub, "trend_late");

    hub.enroll_student_at(early, first, date(2024, 1, 5)).unwrap();
    hub.enroll_student_at(late, first, date(2024, 1, 28)).unwrap();
    hub.enroll_student_at(early, second, date(2024, 3, 2)).unwrap();

    let trend = hub.get_monthly_enrollment_trend().unwrap();
    assert_eq!(trend.len(), 2);

    // Chronological buckets
    assert_eq!(trend[0].month, "2024-01");
    assert_eq!(trend[0].enrollments, 2);
    assert_eq!(trend[1].month, "2024-03");
    assert_eq!(trend[1].enrollments, 1);
}
