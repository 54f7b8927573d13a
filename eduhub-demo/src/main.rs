// eduhub-demo/src/main.rs
// Flagless demo: seeds a sample EduHub data set, walks the query catalogue
// and prints every report. Configuration comes from EDUHUB_URI and EDUHUB_DB
// only; the demo database is reset on every run.

use anyhow::{Context, Result};
use bson::oid::ObjectId;
use chrono::{TimeZone, Utc};
use eduhub_core::{
    Assignment, Course, CourseLevel, EduHub, Lesson, ProfileUpdate, Submission, User, UserRole,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DB: &str = "eduhub";

const STUDENTS: [(&str, &str); 10] = [
    ("Aisha", "Khan"),
    ("Bruno", "Costa"),
    ("Chen", "Wei"),
    ("Dara", "Cohen"),
    ("Elif", "Demir"),
    ("Farid", "Nazari"),
    ("Grace", "Park"),
    ("Hugo", "Martins"),
    ("Ines", "Silva"),
    ("Jonas", "Weber"),
];

const INSTRUCTORS: [(&str, &str); 5] = [
    ("Maria", "Santos"),
    ("Nikolai", "Petrov"),
    ("Olga", "Ivanova"),
    ("Pedro", "Alvarez"),
    ("Quinn", "Murphy"),
];

const COURSES: [(&str, &str, CourseLevel, f64); 8] = [
    ("Rust Fundamentals", "programming", CourseLevel::Beginner, 79.0),
    ("Advanced Rust Systems", "programming", CourseLevel::Advanced, 199.0),
    ("MongoDB for Developers", "databases", CourseLevel::Intermediate, 129.0),
    ("Data Modeling Essentials", "databases", CourseLevel::Beginner, 59.0),
    ("Statistics with Python", "data", CourseLevel::Intermediate, 149.0),
    ("Machine Learning Basics", "data", CourseLevel::Advanced, 249.0),
    ("UI Design Foundations", "design", CourseLevel::Beginner, 49.0),
    ("Technical Writing", "communication", CourseLevel::Beginner, 0.0),
];

struct Seeded {
    students: Vec<ObjectId>,
    courses: Vec<ObjectId>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn section(title: &str) {
    println!("\n==== {title} ====");
}

// BSON datetime at noon UTC on the given day
fn day(year: i32, month: u32, day: u32) -> bson::DateTime {
    bson::DateTime::from_chrono(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
}

fn email(first: &str, last: &str, domain: &str) -> String {
    format!(
        "{}.{}@{domain}",
        first.to_lowercase(),
        last.to_lowercase()
    )
}

fn seed(hub: &EduHub) -> Result<Seeded> {
    let students = STUDENTS
        .iter()
        .map(|(first, last)| {
            hub.add_user(User::new(
                email(first, last, "students.eduhub.example"),
                *first,
                *last,
                UserRole::Student,
            ))
        })
        .collect::<eduhub_core::Result<Vec<_>>>()?;

    let instructors = INSTRUCTORS
        .iter()
        .map(|(first, last)| {
            hub.add_user(
                User::new(
                    email(first, last, "faculty.eduhub.example"),
                    *first,
                    *last,
                    UserRole::Instructor,
                )
                .with_bio(format!("{first} teaches at EduHub")),
            )
        })
        .collect::<eduhub_core::Result<Vec<_>>>()?;

    // Courses cycle through the instructors round-robin
    let courses = COURSES
        .iter()
        .enumerate()
        .map(|(i, (title, category, level, price))| {
            hub.add_course(Course::new(
                *title,
                format!("{title}, taught hands-on"),
                instructors[i % instructors.len()],
                *category,
                *level,
                *price,
            ))
        })
        .collect::<eduhub_core::Result<Vec<_>>>()?;

    hub.add_course_tags(courses[0], ["rust", "ownership"])?;
    hub.add_course_tags(courses[1], ["rust", "systems", "unsafe"])?;
    for course in &courses[..7] {
        hub.publish_course(*course)?;
    }

    // Student i enrolls into course i mod 8, spread over the first half of
    // 2024 so the monthly trend has something to show
    for (i, student) in students.iter().enumerate() {
        let month = (i % 6) as u32 + 1;
        hub.enroll_student_at(
            *student,
            courses[i % courses.len()],
            day(2024, month, (i + 3) as u32),
        )?;
    }

    // A few students take a second course; one finishes, one gives up
    let completed = hub.enroll_student_at(students[0], courses[4], day(2024, 2, 20))?;
    let dropped = hub.enroll_student_at(students[1], courses[5], day(2024, 3, 11))?;
    hub.enroll_student_at(students[2], courses[6], day(2024, 4, 7))?;
    hub.enroll_student_at(students[3], courses[7], day(2024, 5, 19))?;
    hub.complete_enrollment(completed)?;
    hub.drop_enrollment(dropped)?;

    // Content and grading for the Rust track
    hub.add_lesson(Lesson::new(courses[0], "Getting Started", "Install the toolchain", 1))?;
    hub.add_lesson(Lesson::new(courses[0], "Ownership", "Moves and borrows", 2))?;
    hub.add_lesson(Lesson::new(courses[0], "Error Handling", "Result and ?", 3))?;

    let quiz = hub.add_assignment(
        Assignment::new(courses[0], "Ownership Quiz", "Explain move semantics", 100.0)
            .with_due_at(day(2024, 2, 15)),
    )?;
    let lab = hub.add_assignment(
        Assignment::new(courses[0], "Borrow Checker Lab", "Fix the borrows", 50.0)
            .with_due_at(day(2024, 3, 1)),
    )?;
    hub.add_assignment(Assignment::new(
        courses[1],
        "Unsafe Audit",
        "Review an unsafe block",
        100.0,
    ))?;

    let first_quiz = hub.submit_assignment(Submission::new(
        quiz,
        students[0],
        "Ownership moves by default",
    ))?;
    let second_quiz = hub.submit_assignment(Submission::new(
        quiz,
        students[8],
        "Values have a single owner",
    ))?;
    let first_lab = hub.submit_assignment(Submission::new(
        lab,
        students[0],
        "Borrows fixed with scoped slices",
    ))?;
    // One submission stays ungraded
    hub.submit_assignment(Submission::new(lab, students[8], "Work in progress"))?;

    hub.grade_submission(first_quiz, 88.0)?;
    hub.grade_submission(second_quiz, 74.5)?;
    hub.grade_submission(first_lab, 45.0)?;

    // One account goes dormant
    hub.deactivate_user(students[9])?;

    info!(
        students = students.len(),
        instructors = instructors.len(),
        courses = courses.len(),
        "seeded demo data"
    );
    Ok(Seeded { students, courses })
}

fn run_queries(hub: &EduHub, seeded: &Seeded) -> Result<()> {
    section("Find user by email");
    let maria = email("Maria", "Santos", "faculty.eduhub.example");
    match hub.find_user_by_email(&maria)? {
        Some(user) => println!("{} <{}>, role {}", user.full_name(), user.email, user.role),
        None => println!("no user for {maria}"),
    }

    section("Active students");
    let active = hub.find_active_students()?;
    println!("{} active students (1 deactivated)", active.len());
    for user in active.iter().take(3) {
        println!("  {:<24} {}", user.full_name(), user.email);
    }

    section("Profile update, applied twice");
    let update = ProfileUpdate::new()
        .with_bio("Learning Rust and MongoDB")
        .with_skills(["rust", "mongodb"]);
    let first = hub.update_user_profile(seeded.students[0], update.clone())?;
    let second = hub.update_user_profile(seeded.students[0], update)?;
    println!("matched on both passes: {first}, {second}");

    section("Courses priced 50..=200 inclusive");
    for course in hub.find_courses_in_price_range(50.0, 200.0)? {
        println!("  {:<34} {:>8.2}", course.title, course.price);
    }

    section("Title search: 'rust'");
    for course in hub.search_courses_by_title("rust")? {
        println!("  {:<34} level {}", course.title, course.level);
    }

    section("Category: databases");
    for course in hub.find_courses_by_category("databases")? {
        println!("  {:<34} {:>8.2}", course.title, course.price);
    }

    section("Course with its instructor");
    if let Some((course, instructor)) = hub.get_course_with_instructor(seeded.courses[2])? {
        println!("{} is taught by {}", course.title, instructor.full_name());
    }

    section("Roster of 'Rust Fundamentals'");
    for student in hub.find_students_in_course(seeded.courses[0])? {
        println!("  {:<24} {}", student.full_name(), student.email);
    }

    section("Lessons, in order");
    for lesson in hub.course_lessons(seeded.courses[0])? {
        println!("  {}. {}", lesson.position, lesson.title);
    }

    section("Assignments and submissions");
    for assignment in hub.course_assignments(seeded.courses[0])? {
        println!("  {:<24} max {:>5.1}", assignment.title, assignment.max_score);
    }
    for submission in hub.student_submissions(seeded.students[0])? {
        match submission.grade {
            Some(grade) => println!("  {:<10} grade {grade:>5.1}", submission.status.as_str()),
            None => println!("  {:<10} awaiting grade", submission.status.as_str()),
        }
    }

    section("Enrollments of one student");
    for enrollment in hub.find_enrollments_for_student(seeded.students[0])? {
        println!("  {:<10} since {}", enrollment.status.as_str(), enrollment.enrolled_at);
    }

    Ok(())
}

fn run_reports(hub: &EduHub) -> Result<()> {
    section("Enrollment stats per course");
    println!(
        "{:<34} {:>6} {:>7} {:>10} {:>8}",
        "course", "total", "active", "completed", "dropped"
    );
    for row in hub.get_course_enrollment_stats()? {
        println!(
            "{:<34} {:>6} {:>7} {:>10} {:>8}",
            row.title, row.total, row.active, row.completed, row.dropped
        );
    }

    section("Price spread per category");
    println!(
        "{:<16} {:>7} {:>10} {:>10} {:>10}",
        "category", "courses", "avg", "min", "max"
    );
    for row in hub.get_category_stats()? {
        println!(
            "{:<16} {:>7} {:>10.2} {:>10.2} {:>10.2}",
            row.category, row.courses, row.avg_price, row.min_price, row.max_price
        );
    }

    section("Student performance (graded work)");
    println!("{:<24} {:>6} {:>8} {:>6}", "student", "graded", "avg", "best");
    for row in hub.get_student_performance()? {
        println!(
            "{:<24} {:>6} {:>8.1} {:>6.1}",
            format!("{} {}", row.first_name, row.last_name),
            row.graded,
            row.avg_grade,
            row.best_grade
        );
    }

    section("Instructor analytics");
    println!(
        "{:<24} {:>7} {:>8} {:>10}",
        "instructor", "courses", "seats", "revenue"
    );
    for row in hub.get_instructor_analytics()? {
        println!(
            "{:<24} {:>7} {:>8} {:>10.2}",
            format!("{} {}", row.first_name, row.last_name),
            row.courses,
            row.students,
            row.revenue
        );
    }

    section("Monthly enrollment trend");
    for row in hub.get_monthly_enrollment_trend()? {
        println!("  {} {}", row.month, "#".repeat(row.enrollments as usize));
    }

    section("Collection counts");
    for (collection, count) in hub.collection_counts()? {
        println!("  {:<14} {:>5}", collection, count);
    }

    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let uri = std::env::var("EDUHUB_URI").unwrap_or_else(|_| DEFAULT_URI.to_string());
    let db_name = std::env::var("EDUHUB_DB").unwrap_or_else(|_| DEFAULT_DB.to_string());

    let hub = EduHub::connect(&uri, &db_name)?;
    hub.ping()
        .with_context(|| format!("no MongoDB reachable at {uri}; set EDUHUB_URI"))?;

    // Fresh database every run, so the walk-through is reproducible
    hub.database().drop(None).context("resetting demo database")?;
    hub.init_collections()?;
    hub.create_indexes()?;

    let seeded = seed(&hub)?;
    run_queries(&hub, &seeded)?;
    run_reports(&hub)?;

    info!("demo finished");
    hub.close();
    Ok(())
}
