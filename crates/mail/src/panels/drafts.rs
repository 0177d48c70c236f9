//! Drafts panel: list, editor and delete

use std::sync::Arc;

use chrono::Utc;

use super::Workspace;
use crate::actions::{Rejection, WorkflowOutcome, WorkflowStatus};
use crate::models::{Draft, DraftId};
use crate::storage::DraftList;

/// Drafts list plus an editor holding a working copy of the selected draft
///
/// Edits stay in the working copy until saved; the store is untouched
/// while editing.
pub struct DraftsPanel {
    ws: Workspace,
    editing: bool,
    subject: String,
    body: String,
}

impl DraftsPanel {
    pub(super) fn new(ws: Workspace) -> Self {
        let mut panel = Self {
            ws,
            editing: false,
            subject: String::new(),
            body: String::new(),
        };
        if let Some(draft) = panel.selected() {
            panel.load_working_copy(&draft);
        }
        panel
    }

    pub async fn mount(&self) -> WorkflowOutcome<usize> {
        self.ws.draft_loader.load().await
    }

    pub fn drafts(&self) -> DraftList {
        self.ws.store().drafts()
    }

    /// "1 draft" or "N drafts"
    pub fn count_label(&self) -> String {
        match self.drafts().len() {
            1 => "1 draft".to_string(),
            n => format!("{} drafts", n),
        }
    }

    pub fn selected(&self) -> Option<Arc<Draft>> {
        self.ws.store().selected_draft()
    }

    fn load_working_copy(&mut self, draft: &Draft) {
        self.subject = draft.subject.clone();
        self.body = draft.body.clone();
    }

    /// Select a draft and load it into the editor, leaving edit mode
    pub fn select(&mut self, id: &DraftId) -> bool {
        let Some(draft) = self.ws.store().draft(id) else {
            return false;
        };
        self.ws.store().select_draft(Some(id.clone()));
        self.load_working_copy(&draft);
        self.editing = false;
        true
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) -> bool {
        self.editing = self.selected().is_some();
        self.editing
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Discard edits, restoring the working copy from the store
    pub fn cancel_edit(&mut self) {
        if let Some(draft) = self.selected() {
            self.load_working_copy(&draft);
        }
        self.editing = false;
    }

    pub fn is_saving(&self) -> bool {
        self.ws.draft_saver.status() == WorkflowStatus::Busy
    }

    /// Save the working copy over the selected draft
    ///
    /// Completes with `None` if the draft was deleted while saving; the
    /// editor is then closed and emptied.
    pub async fn save(&mut self) -> WorkflowOutcome<Option<Draft>> {
        let Some(selected) = self.selected() else {
            return WorkflowOutcome::Rejected(Rejection::EmptyInput);
        };

        let snapshot = selected.edited(&self.subject, &self.body, Utc::now());
        let outcome = self.ws.draft_saver.save(snapshot).await;
        match &outcome {
            WorkflowOutcome::Completed(Some(stored)) => {
                self.load_working_copy(stored);
                self.editing = false;
            }
            WorkflowOutcome::Completed(None) => {
                self.editing = false;
                self.subject.clear();
                self.body.clear();
            }
            _ => {}
        }
        outcome
    }

    pub async fn delete(&mut self, id: &DraftId) -> WorkflowOutcome<()> {
        let was_selected = self.ws.store().selected_draft_id().as_ref() == Some(id);
        let outcome = self.ws.draft_deleter.delete(id).await;
        if outcome.is_completed() && was_selected {
            self.editing = false;
            self.subject.clear();
            self.body.clear();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::config::InMemoryPromptStorage;
    use crate::notice::NoticeLog;
    use crate::storage::EntityStore;
    use tokio_test::{assert_pending, assert_ready, task};

    fn setup() -> Workspace {
        let ws = Workspace::new(
            Arc::new(EntityStore::new()),
            Arc::new(ScriptedBackend::new()),
            Arc::new(NoticeLog::new()),
            Arc::new(InMemoryPromptStorage::new()),
        );
        ws.store().set_drafts(vec![
            Draft::new("d1", "Re: Invoice", "Paid"),
            Draft::new("d2", "Re: Lunch", "Sure"),
        ]);
        ws
    }

    #[test]
    fn test_count_label() {
        let ws = setup();
        let panel = ws.drafts_panel();
        assert_eq!(panel.count_label(), "2 drafts");

        ws.store().delete_draft(&DraftId::new("d2"));
        assert_eq!(panel.count_label(), "1 draft");

        ws.store().delete_draft(&DraftId::new("d1"));
        assert_eq!(panel.count_label(), "0 drafts");
    }

    #[test]
    fn test_select_loads_working_copy() {
        let ws = setup();
        let mut panel = ws.drafts_panel();

        assert!(panel.select(&DraftId::new("d2")));
        assert_eq!(panel.subject(), "Re: Lunch");
        assert!(!panel.is_editing());
        assert!(!panel.select(&DraftId::new("nope")));
        assert_eq!(ws.store().selected_draft_id(), Some(DraftId::new("d2")));
    }

    #[test]
    fn test_begin_edit_needs_selection() {
        let ws = setup();
        let mut panel = ws.drafts_panel();
        assert!(!panel.begin_edit());
        panel.select(&DraftId::new("d1"));
        assert!(panel.begin_edit());
    }

    #[tokio::test]
    async fn test_save_stamps_updated_at() {
        let ws = setup();
        let mut panel = ws.drafts_panel();
        panel.select(&DraftId::new("d1"));
        panel.begin_edit();
        panel.set_body("Paid in full");

        let saved = panel.save().await.completed().flatten().unwrap();

        assert!(saved.is_edited());
        assert!(!panel.is_editing());
        let stored = ws.store().draft(&DraftId::new("d1")).unwrap();
        assert_eq!(stored.body, "Paid in full");
        assert!(stored.updated_at.is_some());
    }

    #[test]
    fn test_save_of_draft_deleted_meanwhile_closes_editor() {
        let backend = Arc::new(ScriptedBackend::new());
        let ws = Workspace::new(
            Arc::new(EntityStore::new()),
            backend.clone(),
            Arc::new(NoticeLog::new()),
            Arc::new(InMemoryPromptStorage::new()),
        );
        ws.store().set_drafts(vec![Draft::new("d1", "Re: Invoice", "Paid")]);
        let mut panel = ws.drafts_panel();
        panel.select(&DraftId::new("d1"));
        panel.begin_edit();
        panel.set_body("Paid in full");
        backend.hold();

        let outcome = {
            let mut save = task::spawn(panel.save());
            assert_pending!(save.poll());
            ws.store().delete_draft(&DraftId::new("d1"));
            backend.release();
            assert_ready!(save.poll())
        };

        assert_eq!(outcome, WorkflowOutcome::Completed(None));
        assert!(!panel.is_editing());
        assert_eq!(panel.body(), "");
        assert!(ws.store().drafts().is_empty());
    }

    #[tokio::test]
    async fn test_save_without_selection() {
        let ws = setup();
        let mut panel = ws.drafts_panel();
        assert_eq!(panel.save().await, WorkflowOutcome::Rejected(Rejection::EmptyInput));
    }
}
