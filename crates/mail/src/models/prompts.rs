//! AI prompt templates configuring categorization, extraction and replies

use serde::{Deserialize, Serialize};
use std::fmt;

/// One prompt template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: String,
}

impl PromptTemplate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: prompt.into(),
        }
    }
}

/// Which template of the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Categorization,
    ActionExtraction,
    AutoReply,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [
        PromptKind::Categorization,
        PromptKind::ActionExtraction,
        PromptKind::AutoReply,
    ];

    /// Key used in the wire format
    pub fn key(&self) -> &'static str {
        match self {
            PromptKind::Categorization => "categorization",
            PromptKind::ActionExtraction => "actionExtraction",
            PromptKind::AutoReply => "autoReply",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The full prompt configuration, always read and written as a whole
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSet {
    #[serde(default)]
    pub categorization: PromptTemplate,
    #[serde(default)]
    pub action_extraction: PromptTemplate,
    #[serde(default)]
    pub auto_reply: PromptTemplate,
}

impl PromptSet {
    pub fn template(&self, kind: PromptKind) -> &PromptTemplate {
        match kind {
            PromptKind::Categorization => &self.categorization,
            PromptKind::ActionExtraction => &self.action_extraction,
            PromptKind::AutoReply => &self.auto_reply,
        }
    }

    pub fn template_mut(&mut self, kind: PromptKind) -> &mut PromptTemplate {
        match kind {
            PromptKind::Categorization => &mut self.categorization,
            PromptKind::ActionExtraction => &mut self.action_extraction,
            PromptKind::AutoReply => &mut self.auto_reply,
        }
    }

    /// True when no template carries any prompt text
    pub fn is_blank(&self) -> bool {
        PromptKind::ALL
            .iter()
            .all(|kind| self.template(*kind).prompt.trim().is_empty())
    }
}
