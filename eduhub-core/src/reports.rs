// eduhub-core/src/reports.rs
// Aggregation pipelines for the reporting surface, plus the typed rows the
// facade decodes their output into. Pipelines are plain `Vec<Document>` so
// they can be inspected in tests without a server.

use bson::oid::ObjectId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// Enrollment counts for one course, by status. Courses that nobody has
/// enrolled in do not appear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollmentStats {
    pub course_id: ObjectId,
    pub title: String,
    pub price: f64,
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub dropped: i64,
}

/// Price statistics per course category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub courses: i64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Grade summary for one student, over graded submissions only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentPerformance {
    pub student_id: ObjectId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub graded: i64,
    pub avg_grade: f64,
    pub best_grade: f64,
}

/// Teaching footprint of one instructor. `students` counts enrollment seats
/// across all of the instructor's courses, and `revenue` values each seat at
/// the course price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstructorAnalytics {
    pub instructor_id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub courses: i64,
    pub students: i64,
    pub revenue: f64,
}

/// Enrollments bucketed by calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEnrollmentTrend {
    /// `YYYY-MM`, so lexicographic order is chronological order
    pub month: String,
    pub enrollments: i64,
}

fn count_where_status(status: &str) -> Document {
    doc! { "$sum": { "$cond": [{ "$eq": ["$status", status] }, 1, 0] } }
}

/// Runs against `enrollments`.
pub fn course_enrollment_stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": {
            "_id": "$courseId",
            "total": { "$sum": 1 },
            "active": count_where_status("active"),
            "completed": count_where_status("completed"),
            "dropped": count_where_status("dropped"),
        }},
        doc! { "$lookup": {
            "from": "courses",
            "localField": "_id",
            "foreignField": "_id",
            "as": "course",
        }},
        doc! { "$unwind": "$course" },
        doc! { "$project": {
            "_id": 0,
            "courseId": "$_id",
            "title": "$course.title",
            "price": "$course.price",
            "total": 1,
            "active": 1,
            "completed": 1,
            "dropped": 1,
        }},
        doc! { "$sort": { "total": -1, "title": 1 } },
    ]
}

/// Runs against `courses`.
pub fn category_stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": {
            "_id": "$category",
            "courses": { "$sum": 1 },
            "avgPrice": { "$avg": "$price" },
            "minPrice": { "$min": "$price" },
            "maxPrice": { "$max": "$price" },
        }},
        doc! { "$project": {
            "_id": 0,
            "category": "$_id",
            "courses": 1,
            "avgPrice": 1,
            "minPrice": 1,
            "maxPrice": 1,
        }},
        doc! { "$sort": { "category": 1 } },
    ]
}

/// Runs against `submissions`.
pub fn student_performance_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { "status": "graded" } },
        doc! { "$group": {
            "_id": "$studentId",
            "graded": { "$sum": 1 },
            "avgGrade": { "$avg": "$grade" },
            "bestGrade": { "$max": "$grade" },
        }},
        doc! { "$lookup": {
            "from": "users",
            "localField": "_id",
            "foreignField": "_id",
            "as": "student",
        }},
        doc! { "$unwind": "$student" },
        doc! { "$project": {
            "_id": 0,
            "studentId": "$_id",
            "email": "$student.email",
            "firstName": "$student.firstName",
            "lastName": "$student.lastName",
            "graded": 1,
            "avgGrade": 1,
            "bestGrade": 1,
        }},
        doc! { "$sort": { "avgGrade": -1 } },
    ]
}

/// Runs against `courses`.
pub fn instructor_analytics_pipeline() -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": "enrollments",
            "localField": "_id",
            "foreignField": "courseId",
            "as": "enrollments",
        }},
        doc! { "$group": {
            "_id": "$instructorId",
            "courses": { "$sum": 1 },
            "students": { "$sum": { "$size": "$enrollments" } },
            "revenue": { "$sum": { "$multiply": [{ "$size": "$enrollments" }, "$price"] } },
        }},
        doc! { "$lookup": {
            "from": "users",
            "localField": "_id",
            "foreignField": "_id",
            "as": "instructor",
        }},
        doc! { "$unwind": "$instructor" },
        doc! { "$project": {
            "_id": 0,
            "instructorId": "$_id",
            "firstName": "$instructor.firstName",
            "lastName": "$instructor.lastName",
            "courses": 1,
            "students": 1,
            "revenue": 1,
        }},
        doc! { "$sort": { "revenue": -1 } },
    ]
}

/// Runs against `enrollments`.
pub fn monthly_enrollment_trend_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": {
            "_id": { "$dateToString": { "format": "%Y-%m", "date": "$enrolledAt" } },
            "enrollments": { "$sum": 1 },
        }},
        doc! { "$project": {
            "_id": 0,
            "month": "$_id",
            "enrollments": 1,
        }},
        doc! { "$sort": { "month": 1 } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_names(pipeline: &[Document]) -> Vec<&str> {
        pipeline
            .iter()
            .map(|stage| stage.keys().next().unwrap().as_str())
            .collect()
    }

    #[test]
    fn test_course_stats_stage_order() {
        let pipeline = course_enrollment_stats_pipeline();
        assert_eq!(
            stage_names(&pipeline),
            vec!["$group", "$lookup", "$unwind", "$project", "$sort"]
        );

        let lookup = pipeline[1].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "courses");
    }

    #[test]
    fn test_course_stats_counts_every_status() {
        let pipeline = course_enrollment_stats_pipeline();
        let group = pipeline[0].get_document("$group").unwrap();

        for key in ["total", "active", "completed", "dropped"] {
            assert!(group.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_course_stats_rows_decode() {
        // Shape a document exactly as the $project stage emits it and make
        // sure the row struct's field names line up
        let row = doc! {
            "courseId": ObjectId::new(),
            "title": "Rust Basics",
            "price": 49.0,
            "total": 3_i32,
            "active": 2_i32,
            "completed": 1_i32,
            "dropped": 0_i32,
        };

        let stats: CourseEnrollmentStats = bson::from_document(row).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active + stats.completed + stats.dropped, stats.total);
    }

    #[test]
    fn test_student_performance_filters_graded_first() {
        let pipeline = student_performance_pipeline();
        let matching = pipeline[0].get_document("$match").unwrap();

        assert_eq!(matching.get_str("status").unwrap(), "graded");
    }

    #[test]
    fn test_category_stats_rows_decode() {
        let row = doc! {
            "category": "programming",
            "courses": 4_i64,
            "avgPrice": 87.25,
            "minPrice": 0.0,
            "maxPrice": 199.0,
        };

        let stats: CategoryStats = bson::from_document(row).unwrap();
        assert_eq!(stats.category, "programming");
        assert!(stats.min_price <= stats.avg_price && stats.avg_price <= stats.max_price);
    }

    #[test]
    fn test_instructor_analytics_rows_decode() {
        let row = doc! {
            "instructorId": ObjectId::new(),
            "firstName": "Grace",
            "lastName": "Hopper",
            "courses": 2_i32,
            "students": 17_i32,
            "revenue": 833.0,
        };

        let analytics: InstructorAnalytics = bson::from_document(row).unwrap();
        assert_eq!(analytics.students, 17);
    }

    #[test]
    fn test_monthly_trend_uses_year_month_buckets() {
        let pipeline = monthly_enrollment_trend_pipeline();
        let group = pipeline[0].get_document("$group").unwrap();
        let bucket = group.get_document("_id").unwrap();
        let date_to_string = bucket.get_document("$dateToString").unwrap();

        assert_eq!(date_to_string.get_str("format").unwrap(), "%Y-%m");

        // Sorted by bucket, so rows come back in chronological order
        let sort = pipeline.last().unwrap().get_document("$sort").unwrap();
        assert!(sort.contains_key("month"));
    }

    #[test]
    fn test_monthly_trend_rows_decode() {
        let row = doc! { "month": "2024-03", "enrollments": 12_i32 };
        let trend: MonthlyEnrollmentTrend = bson::from_document(row).unwrap();

        assert_eq!(trend.month, "2024-03");
        assert_eq!(trend.enrollments, 12);
    }
}
