// eduhub-core/src/schema.rs
// Server-side collection validators. Each collection gets a $jsonSchema that
// mirrors the typed models, so documents written by other clients are held to
// the same shape as documents written through this crate.

use crate::error::Result;
use crate::models::{Assignment, Course, Enrollment, Lesson, Submission, User};
use crate::validate::EMAIL_PATTERN;
use bson::{doc, Document};
use mongodb::sync::Database;
use tracing::debug;

pub fn users_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["email", "firstName", "lastName", "role", "isActive", "createdAt"],
            "properties": {
                "email": { "bsonType": "string", "pattern": EMAIL_PATTERN },
                "firstName": { "bsonType": "string", "minLength": 1 },
                "lastName": { "bsonType": "string", "minLength": 1 },
                "role": { "enum": ["student", "instructor"] },
                "profile": {
                    "bsonType": "object",
                    "properties": {
                        "bio": { "bsonType": "string" },
                        "skills": { "bsonType": "array", "items": { "bsonType": "string" } },
                    },
                },
                "isActive": { "bsonType": "bool" },
                "createdAt": { "bsonType": "date" },
            },
        },
    }
}

pub fn courses_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": [
                "title", "description", "instructorId", "category",
                "level", "price", "published", "createdAt",
            ],
            "properties": {
                "title": { "bsonType": "string", "minLength": 1 },
                "description": { "bsonType": "string" },
                "instructorId": { "bsonType": "objectId" },
                "category": { "bsonType": "string", "minLength": 1 },
                "level": { "enum": ["beginner", "intermediate", "advanced"] },
                "price": { "bsonType": "double", "minimum": 0 },
                "tags": { "bsonType": "array", "items": { "bsonType": "string" } },
                "published": { "bsonType": "bool" },
                "createdAt": { "bsonType": "date" },
            },
        },
    }
}

pub fn enrollments_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["studentId", "courseId", "enrolledAt", "status"],
            "properties": {
                "studentId": { "bsonType": "objectId" },
                "courseId": { "bsonType": "objectId" },
                "enrolledAt": { "bsonType": "date" },
                "status": { "enum": ["active", "completed", "dropped"] },
            },
        },
    }
}

pub fn lessons_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["courseId", "title", "body", "position"],
            "properties": {
                "courseId": { "bsonType": "objectId" },
                "title": { "bsonType": "string", "minLength": 1 },
                "body": { "bsonType": "string" },
                "position": { "bsonType": ["int", "long"], "minimum": 1 },
            },
        },
    }
}

pub fn assignments_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["courseId", "title", "instructions", "maxScore"],
            "properties": {
                "courseId": { "bsonType": "objectId" },
                "title": { "bsonType": "string", "minLength": 1 },
                "instructions": { "bsonType": "string" },
                "dueAt": { "bsonType": "date" },
                "maxScore": { "bsonType": "double", "minimum": 0, "exclusiveMinimum": true },
            },
        },
    }
}

pub fn submissions_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["assignmentId", "studentId", "submittedAt", "text", "status"],
            "properties": {
                "assignmentId": { "bsonType": "objectId" },
                "studentId": { "bsonType": "objectId" },
                "submittedAt": { "bsonType": "date" },
                "text": { "bsonType": "string", "minLength": 1 },
                "grade": { "bsonType": "double", "minimum": 0 },
                "status": { "enum": ["submitted", "graded"] },
            },
        },
    }
}

/// All collection validators, keyed by collection name.
pub fn all_schemas() -> Vec<(&'static str, Document)> {
    vec![
        (User::COLLECTION, users_schema()),
        (Course::COLLECTION, courses_schema()),
        (Enrollment::COLLECTION, enrollments_schema()),
        (Lesson::COLLECTION, lessons_schema()),
        (Assignment::COLLECTION, assignments_schema()),
        (Submission::COLLECTION, submissions_schema()),
    ]
}

/// Creates missing collections with their validator, and refreshes the
/// validator on collections that already exist. Safe to run repeatedly.
pub fn apply_schemas(db: &Database) -> Result<()> {
    let existing = db.list_collection_names(None)?;

    for (name, schema) in all_schemas() {
        if existing.iter().any(|c| c == name) {
            db.run_command(
                doc! {
                    "collMod": name,
                    "validator": schema,
                    "validationLevel": "moderate",
                },
                None,
            )?;
            debug!(collection = name, "refreshed validator");
        } else {
            let options = mongodb::options::CreateCollectionOptions::builder()
                .validator(schema)
                .build();
            db.create_collection(name, options)?;
            debug!(collection = name, "created collection with validator");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn schema_body(schema: &Document) -> &Document {
        schema.get_document("$jsonSchema").unwrap()
    }

    #[test]
    fn test_covers_all_six_collections() {
        let names: Vec<&str> = all_schemas().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "users",
                "courses",
                "enrollments",
                "lessons",
                "assignments",
                "submissions"
            ]
        );
    }

    #[test]
    fn test_users_schema_embeds_email_pattern() {
        let schema = users_schema();
        let email = schema_body(&schema)
            .get_document("properties")
            .unwrap()
            .get_document("email")
            .unwrap();

        assert_eq!(email.get_str("pattern").unwrap(), EMAIL_PATTERN);
    }

    #[test]
    fn test_required_keys_match_model_wire_shape() {
        // Every key a freshly constructed model serializes should be known to
        // the schema, and every required key should be present on the model
        let user = User::new("ada@example.com", "Ada", "Lovelace", UserRole::Student);
        let document = bson::to_document(&user).unwrap();

        let schema = users_schema();
        let body = schema_body(&schema);
        let properties = body.get_document("properties").unwrap();
        let required = body.get_array("required").unwrap();

        for key in document.keys() {
            assert!(properties.contains_key(key), "schema misses {key}");
        }
        for key in required {
            let key = key.as_str().unwrap();
            assert!(document.contains_key(key), "model misses required {key}");
        }
    }

    #[test]
    fn test_enum_values_match_models() {
        let schema = enrollments_schema();
        let status = schema_body(&schema)
            .get_document("properties")
            .unwrap()
            .get_document("status")
            .unwrap();
        let values: Vec<&str> = status
            .get_array("enum")
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        assert_eq!(values, vec!["active", "completed", "dropped"]);
    }

    #[test]
    fn test_optional_fields_not_required() {
        let schema = assignments_schema();
        let required = schema_body(&schema).get_array("required").unwrap();

        assert!(!required.iter().any(|v| v.as_str() == Some("dueAt")));

        let schema = submissions_schema();
        let required = schema_body(&schema).get_array("required").unwrap();
        assert!(!required.iter().any(|v| v.as_str() == Some("grade")));
    }
}
