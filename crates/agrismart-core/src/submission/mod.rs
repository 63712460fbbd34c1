//! Submission documents.
//!
//! A submission is the file form of one farmer request: the soil fields as
//! a YAML or JSON mapping plus an optional image reference. Documents are
//! validated against a JSON Schema before any field is range-checked.

mod document;
mod schema;

pub use document::{ImageAttachment, Submission, SubmissionError};
pub use schema::validate_submission_schema;
