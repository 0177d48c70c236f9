//! Inbox workflows: loading and bulk AI processing

use log::{debug, error, info, warn};

use super::workflow::{BusyFlag, Rejection, WorkflowContext, WorkflowOutcome, WorkflowStatus};
use crate::backend::api::ProcessRequest;
use crate::models::{Email, PromptSet};
use crate::notice::Notice;
use crate::reconcile::{BulkReconcileStats, apply_bulk_results};

/// Loads the inbox from the backend into the store
pub struct InboxLoader {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl InboxLoader {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    /// Replace the email collection with the backend inbox.
    ///
    /// Completes with the number of emails loaded.
    pub async fn load(&self) -> WorkflowOutcome<usize> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Inbox load already in progress");
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        info!("Loading inbox");
        match self.ctx.backend.load_inbox().await {
            Ok(emails) => {
                let count = emails.len();
                self.ctx.store.set_emails(emails);
                info!("Loaded {} emails", count);
                self.ctx.notify(
                    Notice::success("Inbox loaded")
                        .with_detail(format!("{} emails loaded successfully", count)),
                );
                WorkflowOutcome::Completed(count)
            }
            Err(e) => {
                error!("Failed to load emails: {}", e);
                self.ctx
                    .notify(Notice::error("Failed to load emails").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}

/// Summary of a completed bulk processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    /// Emails the backend reported as processed
    pub processed: usize,
    /// Failures the backend reported
    pub failed: usize,
    /// What reconciliation did with the results
    pub stats: BulkReconcileStats,
}

/// Categorizes every email and extracts action items in one batch
pub struct BulkProcessor {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl BulkProcessor {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    /// Send the current emails and prompts for processing and reconcile
    /// the per-email results.
    ///
    /// The email and prompt snapshots are taken when the run starts; later
    /// store changes do not affect the request.
    pub async fn process(&self) -> WorkflowOutcome<BulkSummary> {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Bulk processing already in progress");
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        let emails = self.ctx.store.emails();
        if emails.is_empty() {
            self.ctx.notify(
                Notice::info("No emails to process").with_detail("Load the inbox first"),
            );
            return WorkflowOutcome::Rejected(Rejection::EmptyInput);
        }

        let request = ProcessRequest {
            emails: emails.iter().map(|email| Email::clone(email)).collect(),
            prompts: PromptSet::clone(&self.ctx.store.prompts()),
        };

        info!("Processing {} emails", request.emails.len());
        match self.ctx.backend.process_emails(request).await {
            Ok(response) => {
                let stats = apply_bulk_results(&self.ctx.store, &response.results);
                for err in &response.errors {
                    warn!("Processing error: {}", err);
                }
                info!(
                    "Bulk processing done: {} processed, {} failed, {} applied, {} skipped",
                    response.processed, response.failed, stats.applied, stats.skipped
                );

                let detail = if response.failed > 0 {
                    format!("{} emails failed to process", response.failed)
                } else {
                    "All emails categorized successfully".to_string()
                };
                self.ctx.notify(
                    Notice::success(format!("Processed {} emails!", response.processed))
                        .with_detail(detail),
                );

                WorkflowOutcome::Completed(BulkSummary {
                    processed: response.processed,
                    failed: response.failed,
                    stats,
                })
            }
            Err(e) => {
                error!("Failed to process emails: {}", e);
                self.ctx
                    .notify(Notice::error("Failed to process emails").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}
