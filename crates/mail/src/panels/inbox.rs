//! Inbox panel: email list, filters and the selected email detail

use std::sync::Arc;

use log::debug;

use super::Workspace;
use crate::actions::{WorkflowOutcome, WorkflowStatus};
use crate::models::{Category, Email, EmailId, Tab};
use crate::query::{InboxFilter, InboxView};

/// Query the chat panel runs when a reply is requested from an email
pub const GENERATE_REPLY_QUERY: &str = "Draft a reply to this email";

pub struct InboxPanel {
    ws: Workspace,
}

impl InboxPanel {
    pub(super) fn new(ws: Workspace) -> Self {
        Self { ws }
    }

    /// Load the inbox unless the store already holds emails, so processed
    /// results are never overwritten by a remount.
    pub async fn mount(&self) -> Option<WorkflowOutcome<usize>> {
        if self.ws.store().email_count() > 0 {
            debug!("Inbox already populated, skipping load");
            return None;
        }
        Some(self.ws.inbox_loader.load().await)
    }

    /// Reload the inbox unconditionally
    pub async fn reload(&self) -> WorkflowOutcome<usize> {
        self.ws.inbox_loader.load().await
    }

    pub fn is_loading(&self) -> bool {
        self.ws.inbox_loader.status() == WorkflowStatus::Busy
    }

    /// The filtered email list
    pub fn view(&self) -> Arc<InboxView> {
        let store = self.ws.store();
        self.ws.projector.project(&store.emails(), &store.filter())
    }

    pub fn filter(&self) -> InboxFilter {
        self.ws.store().filter()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.ws.store().set_search_query(query);
    }

    /// Returns whether the category is now part of the filter
    pub fn toggle_category(&self, category: Category) -> bool {
        self.ws.store().toggle_category(category)
    }

    pub fn clear_filters(&self) {
        self.ws.store().clear_filters();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.ws.store().filter().is_empty()
    }

    /// Open the detail of an email. Unknown ids are ignored.
    pub fn select(&self, id: &EmailId) -> bool {
        self.ws.store().select_email(Some(id.clone()))
    }

    pub fn close_detail(&self) {
        self.ws.store().select_email(None);
    }

    pub fn selected(&self) -> Option<Arc<Email>> {
        self.ws.store().selected_email()
    }

    /// Ask the chat panel to draft a reply to the selected email and
    /// switch to it.
    ///
    /// Returns false when no email is selected.
    pub fn generate_reply(&self) -> bool {
        if self.selected().is_none() {
            return false;
        }
        self.ws.chat_intent().publish(GENERATE_REPLY_QUERY);
        self.ws.switch_tab(Tab::Chat);
        true
    }
}
