//! Draft workflows: load, save and delete

use log::{debug, error, info, warn};

use super::workflow::{BusyFlag, Rejection, WorkflowContext, WorkflowOutcome, WorkflowStatus};
use crate::models::{Draft, DraftId};
use crate::notice::Notice;
use crate::reconcile::{apply_deleted_draft, apply_saved_draft};

/// Loads the draft collection from the backend
pub struct DraftLoader {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl DraftLoader {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    pub async fn load(&self) -> WorkflowOutcome<usize> {
        let Some(_guard) = self.busy.try_acquire() else {
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        match self.ctx.backend.load_drafts().await {
            Ok(drafts) => {
                let count = drafts.len();
                debug!("Loaded {} drafts", count);
                self.ctx.store.set_drafts(drafts);
                WorkflowOutcome::Completed(count)
            }
            Err(e) => {
                error!("Failed to load drafts: {}", e);
                self.ctx
                    .notify(Notice::error("Failed to load drafts").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}

/// Persists edited drafts
pub struct DraftSaver {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl DraftSaver {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    /// Save `draft` and store the persisted version.
    ///
    /// Completes with the draft as stored, or `None` when the draft was
    /// deleted locally while the save was in flight.
    pub async fn save(&self, draft: Draft) -> WorkflowOutcome<Option<Draft>> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Draft save already in progress");
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        info!("Saving draft {}", draft.id);
        match self.ctx.backend.save_draft(&draft).await {
            Ok(persisted) => {
                let id = draft.id.clone();
                if !apply_saved_draft(&self.ctx.store, draft, persisted) {
                    warn!("Draft {} was saved but no longer exists locally", id);
                    self.ctx.notify(
                        Notice::warning("Draft no longer exists")
                            .with_detail("It was deleted before the save finished"),
                    );
                    return WorkflowOutcome::Completed(None);
                }
                self.ctx.notify(Notice::success("Draft saved"));
                WorkflowOutcome::Completed(self.ctx.store.draft(&id).map(|d| Draft::clone(&d)))
            }
            Err(e) => {
                error!("Failed to save draft {}: {}", draft.id, e);
                self.ctx
                    .notify(Notice::error("Failed to save draft").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}

/// Deletes drafts
pub struct DraftDeleter {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl DraftDeleter {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    pub async fn delete(&self, id: &DraftId) -> WorkflowOutcome<()> {
        let Some(_guard) = self.busy.try_acquire() else {
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        info!("Deleting draft {}", id);
        match self.ctx.backend.delete_draft(id).await {
            Ok(()) => {
                apply_deleted_draft(&self.ctx.store, id);
                self.ctx.notify(Notice::success("Draft deleted"));
                WorkflowOutcome::Completed(())
            }
            Err(e) => {
                error!("Failed to delete draft {}: {}", id, e);
                self.ctx
                    .notify(Notice::error("Failed to delete draft").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, BackendError, ScriptedBackend};
    use crate::notice::{NoticeLevel, NoticeLog};
    use crate::storage::EntityStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn setup() -> (WorkflowContext, Arc<ScriptedBackend>, Arc<NoticeLog>) {
        let backend = Arc::new(ScriptedBackend::new());
        let notices = Arc::new(NoticeLog::new());
        let ctx = WorkflowContext::new(Arc::new(EntityStore::new()), backend.clone(), notices.clone());
        (ctx, backend, notices)
    }

    #[tokio::test]
    async fn test_load_drafts() {
        let (ctx, backend, notices) = setup();
        backend.set_drafts(Ok(vec![Draft::new("d1", "s", "b"), Draft::new("d2", "s", "b")]));

        assert_eq!(DraftLoader::new(ctx.clone()).load().await, WorkflowOutcome::Completed(2));
        assert_eq!(ctx.store.drafts().len(), 2);
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_load_drafts_failure() {
        let (ctx, backend, notices) = setup();
        backend.set_drafts(Err(BackendError::Network("offline".to_string())));

        let outcome = DraftLoader::new(ctx).load().await;

        assert!(matches!(outcome, WorkflowOutcome::Failed(_)));
        assert_eq!(notices.last().unwrap().title, "Failed to load drafts");
    }

    #[tokio::test]
    async fn test_save_replaces_stored_draft() {
        let (ctx, backend, notices) = setup();
        let original = Draft::new("d1", "Re: Invoice", "Paid");
        ctx.store.add_draft(original.clone());

        let edited = original.edited("Re: Invoice", "Paid yesterday", Utc::now());
        let outcome = DraftSaver::new(ctx.clone()).save(edited.clone()).await;

        assert_eq!(outcome, WorkflowOutcome::Completed(Some(edited.clone())));
        assert_eq!(*ctx.store.draft(&original.id).unwrap(), edited);
        assert_eq!(backend.calls(), vec![BackendCall::SaveDraft(edited)]);
        assert_eq!(notices.titles(), vec!["Draft saved"]);
    }

    #[tokio::test]
    async fn test_save_after_local_delete_stores_nothing() {
        let (ctx, backend, notices) = setup();
        let original = Draft::new("d1", "Re: Invoice", "Paid");
        ctx.store.add_draft(original.clone());
        ctx.store.delete_draft(&original.id);

        let edited = original.edited("Re: Invoice", "Paid yesterday", Utc::now());
        let outcome = DraftSaver::new(ctx.clone()).save(edited.clone()).await;

        assert_eq!(outcome, WorkflowOutcome::Completed(None));
        assert!(ctx.store.draft(&original.id).is_none());
        assert_eq!(backend.calls(), vec![BackendCall::SaveDraft(edited)]);
        let notice = notices.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notices.titles(), vec!["Draft no longer exists"]);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_store() {
        let (ctx, backend, notices) = setup();
        let original = Draft::new("d1", "Re: Invoice", "Paid");
        ctx.store.add_draft(original.clone());
        backend.set_save(Err(BackendError::Rejected("disk full".to_string())));

        let edited = original.edited("x", "y", Utc::now());
        let outcome = DraftSaver::new(ctx.clone()).save(edited).await;

        assert!(matches!(outcome, WorkflowOutcome::Failed(_)));
        assert_eq!(*ctx.store.draft(&original.id).unwrap(), original);
        let notice = notices.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.detail.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_delete_removes_draft() {
        let (ctx, _, notices) = setup();
        ctx.store.add_draft(Draft::new("d1", "s", "b"));
        ctx.store.select_draft(Some(DraftId::new("d1")));

        let outcome = DraftDeleter::new(ctx.clone()).delete(&DraftId::new("d1")).await;

        assert_eq!(outcome, WorkflowOutcome::Completed(()));
        assert!(ctx.store.drafts().is_empty());
        assert_eq!(ctx.store.selected_draft_id(), None);
        assert_eq!(notices.titles(), vec!["Draft deleted"]);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_draft() {
        let (ctx, backend, _) = setup();
        ctx.store.add_draft(Draft::new("d1", "s", "b"));
        backend.set_delete(Err(BackendError::NotFound("/api/drafts/d1".to_string())));

        let outcome = DraftDeleter::new(ctx.clone()).delete(&DraftId::new("d1")).await;

        assert!(matches!(outcome, WorkflowOutcome::Failed(BackendError::NotFound(_))));
        assert_eq!(ctx.store.drafts().len(), 1);
    }
}
