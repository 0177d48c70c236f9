//! Top-level workspace tabs

use serde::{Deserialize, Serialize};

/// The view currently shown in the workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Inbox,
    Prompts,
    Chat,
    Drafts,
}
