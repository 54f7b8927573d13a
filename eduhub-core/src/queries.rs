// eduhub-core/src/queries.rs
// Filter and pipeline builders used by the facade. Pure functions over BSON
// documents, so the query shapes can be unit tested without a server.

use bson::oid::ObjectId;
use bson::{doc, Document};

pub fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

/// Students who can enroll and submit.
pub fn active_students() -> Document {
    doc! { "role": "student", "isActive": true }
}

pub fn courses_by_category(category: &str) -> Document {
    doc! { "category": category }
}

/// Closed interval: both bounds are included. `min > max` matches nothing.
pub fn price_range(min: f64, max: f64) -> Document {
    doc! { "price": { "$gte": min, "$lte": max } }
}

/// Case-insensitive substring match on the title. The term is escaped, so
/// regex metacharacters in user input match literally.
pub fn title_contains(term: &str) -> Document {
    doc! { "title": { "$regex": regex::escape(term), "$options": "i" } }
}

/// Resolves the students enrolled in a course, newest enrollment last.
pub fn students_in_course_pipeline(course_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "courseId": course_id } },
        doc! { "$sort": { "enrolledAt": 1 } },
        doc! { "$lookup": {
            "from": "users",
            "localField": "studentId",
            "foreignField": "_id",
            "as": "student",
        }},
        doc! { "$unwind": "$student" },
        doc! { "$replaceRoot": { "newRoot": "$student" } },
    ]
}

/// Joins one course with its instructor document.
pub fn course_with_instructor_pipeline(course_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "_id": course_id } },
        doc! { "$lookup": {
            "from": "users",
            "localField": "instructorId",
            "foreignField": "_id",
            "as": "instructor",
        }},
        doc! { "$unwind": "$instructor" },
        doc! { "$project": { "_id": 0, "course": "$$ROOT", "instructor": "$instructor" } },
    ]
}
