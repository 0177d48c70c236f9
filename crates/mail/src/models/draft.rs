//! Draft model for AI-generated (and user-edited) replies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Category, EmailId, lenient};

/// Unique identifier for a draft (assigned by the backend)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DraftId(pub String);

impl DraftId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context about the email a draft replies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_subject: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
}

/// A reply draft
///
/// Timestamps travel as epoch milliseconds. `updated_at` is only set once
/// the draft has been explicitly saved after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: DraftId,
    #[serde(default, alias = "emailId", skip_serializing_if = "Option::is_none")]
    pub original_email_id: Option<EmailId>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(
        default = "lenient::epoch",
        alias = "timestamp",
        deserialize_with = "lenient::timestamp",
        serialize_with = "chrono::serde::ts_milliseconds::serialize"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp_option",
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DraftMetadata>,
}

impl Draft {
    /// Create a fresh, never-edited draft
    pub fn new(id: impl Into<DraftId>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_email_id: None,
            subject: subject.into(),
            body: body.into(),
            created_at: Utc::now(),
            updated_at: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: DraftMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_original_email(mut self, email_id: impl Into<EmailId>) -> Self {
        self.original_email_id = Some(email_id.into());
        self
    }

    /// Whether the draft was saved after creation
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some_and(|updated| updated != self.created_at)
    }

    /// Copy of this draft carrying an edited subject/body, stamped at `now`
    pub fn edited(&self, subject: &str, body: &str, now: DateTime<Utc>) -> Self {
        Self {
            subject: subject.to_string(),
            body: body.to_string(),
            updated_at: Some(now),
            ..self.clone()
        }
    }
}
