//! Identifiers for projects, milestones and tasks
//!
//! Locally minted IDs use a typed prefix plus a short hash:
//! - Milestone IDs: `m-{7-char-hash}` (e.g., `m-7f2b4c1`)
//! - Task IDs: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//!
//! The hash is derived from title + creation timestamp, so the same title
//! created at different times produces different IDs. Records that come back
//! from a remote portal keep whatever opaque id the backend assigned; parsing
//! only rejects empty ids and ids containing whitespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid id: must be non-empty, got '{0}'")]
    Empty(String),

    #[error("Invalid id: must not contain whitespace, got '{0}'")]
    Whitespace(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn validate(s: &str) -> Result<String, IdError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IdError::Empty(s.to_string()));
    }
    if s.chars().any(char::is_whitespace) {
        return Err(IdError::Whitespace(s.to_string()));
    }
    Ok(s.to_string())
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Mints a new local ID from title and timestamp
            pub fn generate(title: &str, timestamp: DateTime<Utc>) -> Self {
                Self(format!("{}-{}", $prefix, generate_hash(title, timestamp)))
            }

            /// Returns the id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type! {
    /// Milestone ID, locally minted as `m-{7-char-hash}`
    MilestoneId, "m"
}

id_type! {
    /// Task ID, locally minted as `t-{7-char-hash}`
    TaskId, "t"
}

/// Project ID, always assigned by the portal backend (never minted locally)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s).map(Self)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_generation_is_unique_for_different_timestamps() {
        let title = "Same Title";
        let ts1 = Utc::now();
        let ts2 = ts1 + chrono::Duration::nanoseconds(1);

        let id1 = TaskId::generate(title, ts1);
        let id2 = TaskId::generate(title, ts2);

        assert_ne!(id1, id2);
    }

    #[test]
    fn generated_id_format_is_correct() {
        let task = TaskId::generate("Test", Utc::now());
        let milestone = MilestoneId::generate("Test", Utc::now());

        assert!(task.to_string().starts_with("t-"));
        assert_eq!(task.to_string().len(), 9); // "t-" + 7 chars
        assert!(milestone.to_string().starts_with("m-"));
        assert_eq!(milestone.to_string().len(), 9);
    }

    #[test]
    fn id_roundtrips_through_display_and_parse() {
        let original = TaskId::generate("Test", Utc::now());
        let parsed: TaskId = original.to_string().parse().unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn opaque_backend_ids_are_accepted() {
        let uuid = "2f1e9c1a-8b4d-4e6f-9a3b-1c2d3e4f5a6b";
        let parsed: TaskId = uuid.parse().unwrap();

        assert_eq!(parsed.as_str(), uuid);
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let parsed: MilestoneId = "  m-1234567  ".parse().unwrap();
        assert_eq!(parsed.as_str(), "m-1234567");
    }

    #[test]
    fn parse_rejects_empty_and_inner_whitespace() {
        assert_eq!(
            "".parse::<TaskId>(),
            Err(IdError::Empty(String::new()))
        );
        assert!("   ".parse::<TaskId>().is_err());
        assert!("t-123 456".parse::<TaskId>().is_err());
    }

    #[test]
    fn serde_roundtrip_task_id() {
        let original = TaskId::generate("Test", Utc::now());
        let json = serde_json::to_string(&original).unwrap();
        let parsed: TaskId = serde_json::from_str(&json).unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn serde_serializes_as_plain_string() {
        let id: MilestoneId = "m-1234567".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, "\"m-1234567\"");
    }

    #[test]
    fn serde_rejects_invalid_id() {
        let result: Result<ProjectId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
