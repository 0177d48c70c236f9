//! Transient UI selection state held alongside the entity collections

use crate::models::{DraftId, EmailId, Tab};
use crate::query::InboxFilter;

/// Selection, navigation and filter state. Never persisted.
///
/// Selections are weak references: they hold ids, and the store clears them
/// whenever the referenced entity leaves its collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub selected_email: Option<EmailId>,
    pub selected_draft: Option<DraftId>,
    pub active_tab: Tab,
    pub filter: InboxFilter,
}
