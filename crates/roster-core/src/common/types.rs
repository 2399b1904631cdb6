//! # Shared Domain Types
//!
//! The student record and its client-facing draft form, as exchanged over
//! the HTTP API and stored in PostgreSQL.
//!
//! JSON serialization uses camelCase field names (`firstName`, `createdAt`,
//! ...); this is the public wire contract and must not drift between
//! releases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response header carrying the per-request trace identifier.
///
/// Purely observational: it is attached to every log line for the request
/// and echoed back to the client, but nothing downstream consumes it.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Primary key type for [`Student`] rows.
pub type StudentId = i64;

/// A student record as stored and served over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,
    pub grade: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The client-supplied subset of a student record, used as the request body
/// for create and update operations. Identity and timestamps are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,
    pub grade: f64,
}
