//! Domain models for the email workspace

mod chat;
mod draft;
mod email;
pub(crate) mod lenient;
mod prompts;
mod tab;

pub use chat::{CHAT_FAILURE_REPLY, ChatMessage, ChatRole};
pub use draft::{Draft, DraftId, DraftMetadata};
pub use email::{ActionItem, Category, Email, EmailBuilder, EmailId, Priority};
pub use prompts::{PromptKind, PromptSet, PromptTemplate};
pub use tab::Tab;
