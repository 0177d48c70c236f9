//! Panel view-models
//!
//! Each panel is created fresh on mount from the [`Workspace`] and holds
//! only view-local state (input buffers, editor working copies). Shared
//! state lives in the entity store.

mod chat;
mod drafts;
mod inbox;
mod prompts;
mod workspace;

pub use chat::{ChatPanel, SUGGESTED_QUERIES};
pub use drafts::DraftsPanel;
pub use inbox::{GENERATE_REPLY_QUERY, InboxPanel};
pub use prompts::PromptsPanel;
pub use workspace::{PromptSource, Workspace};
