// eduhub-core/src/indexes.rs
// Secondary indexes backing the query surface. Uniqueness rules that the
// facade checks client-side are also fenced here, so concurrent writers
// cannot race past the checks.

use crate::error::Result;
use crate::models::{Assignment, Course, Enrollment, Lesson, Submission, User};
use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::sync::Database;
use mongodb::IndexModel;
use tracing::debug;

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

fn unique_index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(name.to_string())
                .unique(true)
                .build(),
        )
        .build()
}

/// The full index set, keyed by collection name.
pub fn index_models() -> Vec<(&'static str, Vec<IndexModel>)> {
    vec![
        (
            User::COLLECTION,
            vec![
                unique_index(doc! { "email": 1 }, "email_unique"),
                index(doc! { "role": 1, "isActive": 1 }, "role_isActive"),
            ],
        ),
        (
            Course::COLLECTION,
            vec![
                index(doc! { "category": 1, "level": 1 }, "category_level"),
                index(doc! { "price": 1 }, "price_asc"),
                index(doc! { "title": 1 }, "title_asc"),
            ],
        ),
        (
            Enrollment::COLLECTION,
            vec![
                unique_index(
                    doc! { "studentId": 1, "courseId": 1 },
                    "studentId_courseId_unique",
                ),
                index(doc! { "courseId": 1 }, "courseId_asc"),
                index(doc! { "enrolledAt": 1 }, "enrolledAt_asc"),
            ],
        ),
        (
            Lesson::COLLECTION,
            vec![unique_index(
                doc! { "courseId": 1, "position": 1 },
                "courseId_position_unique",
            )],
        ),
        (
            Assignment::COLLECTION,
            vec![index(doc! { "courseId": 1 }, "courseId_asc")],
        ),
        (
            Submission::COLLECTION,
            vec![
                unique_index(
                    doc! { "assignmentId": 1, "studentId": 1 },
                    "assignmentId_studentId_unique",
                ),
                index(doc! { "studentId": 1 }, "studentId_asc"),
            ],
        ),
    ]
}

/// Creates every index, returning the server-reported names. Creating an
/// index that already exists with the same definition is a no-op.
pub fn ensure_indexes(db: &Database) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for (collection, models) in index_models() {
        let result = db
            .collection::<Document>(collection)
            .create_indexes(models, None)?;
        debug!(
            collection,
            indexes = result.index_names.len(),
            "ensured indexes"
        );
        created.extend(result.index_names);
    }

    Ok(created)
}
