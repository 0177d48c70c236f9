//! Email model representing an inbox message and its AI enrichment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::lenient;

/// Length of the body preview shown in list rows
const PREVIEW_CHARS: usize = 100;

/// Unique identifier for an email (stable for the whole session)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmailId(pub String);

impl EmailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category assigned by bulk processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Important,
    #[serde(rename = "To-Do")]
    ToDo,
    Newsletter,
    Spam,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Important,
        Category::ToDo,
        Category::Newsletter,
        Category::Spam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Important => "Important",
            Category::ToDo => "To-Do",
            Category::Newsletter => "Newsletter",
            Category::Spam => "Spam",
        }
    }

    /// Parse a category label leniently ("to-do", "TODO", " Spam ").
    ///
    /// Returns `None` for anything else, including "Uncategorized".
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "important" => Some(Category::Important),
            "todo" => Some(Category::ToDo),
            "newsletter" => Some(Category::Newsletter),
            "spam" => Some(Category::Spam),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an extracted action item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A task extracted from an email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(
        default,
        deserialize_with = "lenient::deadline",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
}

impl ActionItem {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            deadline: None,
            priority: None,
        }
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A single inbox email
///
/// `category` and `action_items` stay empty until bulk processing results
/// are reconciled into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EmailId,
    /// Sender address (e.g., "john@example.com")
    #[serde(default)]
    pub sender: String,
    /// Sender display name (e.g., "John Doe")
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub has_attachments: bool,
    #[serde(
        default,
        deserialize_with = "lenient::category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient::action_items")]
    pub action_items: Vec<ActionItem>,
}

impl Email {
    /// Create a new email builder
    pub fn builder(id: impl Into<EmailId>) -> EmailBuilder {
        EmailBuilder::new(id.into())
    }

    /// First 100 characters of the body, with an ellipsis when truncated
    pub fn preview(&self) -> String {
        let mut chars = self.body.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    /// Format the sender for display
    pub fn display_sender(&self) -> String {
        if self.sender_name.is_empty() {
            self.sender.clone()
        } else {
            format!("{} <{}>", self.sender_name, self.sender)
        }
    }

    /// Coarse age label relative to `now` ("just now", "5m ago", "3h ago", "2d ago")
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.timestamp).num_seconds().max(0);
        match secs {
            s if s < 60 => "just now".to_string(),
            s if s < 3_600 => format!("{}m ago", s / 60),
            s if s < 86_400 => format!("{}h ago", s / 3_600),
            s => format!("{}d ago", s / 86_400),
        }
    }

    /// Case-insensitive substring match over subject, sender name, sender and body.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_text(&self, needle: &str) -> bool {
        [&self.subject, &self.sender_name, &self.sender, &self.body]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Builder for creating Email instances
pub struct EmailBuilder {
    id: EmailId,
    sender: String,
    sender_name: String,
    subject: String,
    body: String,
    timestamp: Option<DateTime<Utc>>,
    is_read: bool,
    has_attachments: bool,
    category: Option<Category>,
    action_items: Vec<ActionItem>,
}

impl EmailBuilder {
    fn new(id: EmailId) -> Self {
        Self {
            id,
            sender: String::new(),
            sender_name: String::new(),
            subject: String::new(),
            body: String::new(),
            timestamp: None,
            is_read: false,
            has_attachments: false,
            category: None,
            action_items: Vec::new(),
        }
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn sender_name(mut self, sender_name: impl Into<String>) -> Self {
        self.sender_name = sender_name.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    pub fn has_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = has_attachments;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn action_items(mut self, action_items: Vec<ActionItem>) -> Self {
        self.action_items = action_items;
        self
    }

    pub fn build(self) -> Email {
        Email {
            id: self.id,
            sender: self.sender,
            sender_name: self.sender_name,
            subject: self.subject,
            body: self.body,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            is_read: self.is_read,
            has_attachments: self.has_attachments,
            category: self.category,
            action_items: self.action_items,
        }
    }
}
