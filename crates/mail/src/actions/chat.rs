//! Chat workflow: ask the assistant about the inbox or the selected email

use log::{debug, error, info};

use super::workflow::{BusyFlag, Rejection, WorkflowContext, WorkflowOutcome, WorkflowStatus};
use crate::backend::api::ChatRequest;
use crate::models::{ChatMessage, DraftId, Email, PromptSet};
use crate::notice::Notice;
use crate::reconcile::{apply_chat_failure, apply_chat_reply};

/// Sends chat queries and records the conversation in the store
pub struct ChatAgent {
    ctx: WorkflowContext,
    busy: BusyFlag,
}

impl ChatAgent {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            busy: BusyFlag::new(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.busy.status()
    }

    /// Ask a question.
    ///
    /// The trimmed query is appended to the transcript before the backend
    /// is called, together with the selected email as context. Every user
    /// message receives an assistant reply, an apology when the call fails.
    /// Completes with the id of the draft the assistant created, if any.
    pub async fn ask(&self, query: &str) -> WorkflowOutcome<Option<DraftId>> {
        let query = query.trim();
        if query.is_empty() {
            return WorkflowOutcome::Rejected(Rejection::EmptyInput);
        }
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Chat request already in progress, ignoring {:?}", query);
            return WorkflowOutcome::Rejected(Rejection::Busy);
        };

        let store = &self.ctx.store;
        store.push_chat_message(ChatMessage::user(query));

        let request = ChatRequest {
            query: query.to_string(),
            email_id: store.selected_email_id(),
            emails: store.emails().iter().map(|email| Email::clone(email)).collect(),
            prompts: PromptSet::clone(&store.prompts()),
        };

        info!(
            "Sending chat query{}",
            request
                .email_id
                .as_ref()
                .map(|id| format!(" about {}", id))
                .unwrap_or_default()
        );
        match self.ctx.backend.chat(request).await {
            Ok(reply) => {
                let draft = apply_chat_reply(store, reply);
                if let Some(id) = &draft {
                    info!("Assistant created draft {}", id);
                    self.ctx.notify(
                        Notice::success("Draft saved")
                            .with_detail("You can find it in the Drafts tab"),
                    );
                }
                WorkflowOutcome::Completed(draft)
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                apply_chat_failure(store);
                self.ctx
                    .notify(Notice::error("Chat error").with_detail(e.to_string()));
                WorkflowOutcome::Failed(e)
            }
        }
    }
}
