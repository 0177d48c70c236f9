//! Entity storage
//!
//! This module holds the workspace's canonical state: the email, draft and
//! chat collections, the prompt set and the UI selection state. All
//! mutation of shared state goes through [`EntityStore`].

mod memory;
mod ui_state;

pub use memory::{DraftList, EmailList, EntityStore};
pub use ui_state::UiState;
