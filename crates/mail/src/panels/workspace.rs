//! The workspace: shared services and panel factories

use std::sync::Arc;

use log::{info, warn};

use super::{ChatPanel, DraftsPanel, InboxPanel, PromptsPanel};
use crate::actions::{
    BulkProcessor, BulkSummary, ChatAgent, DraftDeleter, DraftLoader, DraftSaver, InboxLoader,
    WorkflowContext, WorkflowOutcome, WorkflowStatus,
};
use crate::backend::MailBackend;
use crate::config::PromptStorage;
use crate::intent::{IntentChannel, PENDING_CHAT_QUERY};
use crate::models::Tab;
use crate::notice::NoticeSink;
use crate::query::InboxProjector;
use crate::storage::EntityStore;

/// Where the startup prompt set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Persisted,
    Defaults,
    /// Neither was available; the store keeps its current prompts
    Unavailable,
}

/// Owns the store, the backend and the workflow orchestrators, and hands
/// out panels that share them.
///
/// Cloning is cheap; clones share everything, including busy flags and the
/// intent channel.
#[derive(Clone)]
pub struct Workspace {
    pub(super) ctx: WorkflowContext,
    pub(super) prompt_storage: Arc<dyn PromptStorage>,
    pub(super) chat_intent: Arc<IntentChannel>,
    pub(super) projector: Arc<InboxProjector>,
    pub(super) inbox_loader: Arc<InboxLoader>,
    pub(super) bulk: Arc<BulkProcessor>,
    pub(super) chat: Arc<ChatAgent>,
    pub(super) draft_loader: Arc<DraftLoader>,
    pub(super) draft_saver: Arc<DraftSaver>,
    pub(super) draft_deleter: Arc<DraftDeleter>,
}

impl Workspace {
    pub fn new(
        store: Arc<EntityStore>,
        backend: Arc<dyn MailBackend>,
        notices: Arc<dyn NoticeSink>,
        prompt_storage: Arc<dyn PromptStorage>,
    ) -> Self {
        let ctx = WorkflowContext::new(store, backend, notices);
        Self {
            prompt_storage,
            chat_intent: Arc::new(IntentChannel::new(PENDING_CHAT_QUERY)),
            projector: Arc::new(InboxProjector::new()),
            inbox_loader: Arc::new(InboxLoader::new(ctx.clone())),
            bulk: Arc::new(BulkProcessor::new(ctx.clone())),
            chat: Arc::new(ChatAgent::new(ctx.clone())),
            draft_loader: Arc::new(DraftLoader::new(ctx.clone())),
            draft_saver: Arc::new(DraftSaver::new(ctx.clone())),
            draft_deleter: Arc::new(DraftDeleter::new(ctx.clone())),
            ctx,
        }
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.ctx.store
    }

    pub fn backend(&self) -> &Arc<dyn MailBackend> {
        &self.ctx.backend
    }

    pub fn chat_intent(&self) -> &Arc<IntentChannel> {
        &self.chat_intent
    }

    /// Load the prompt set: the persisted one if present, otherwise the
    /// backend defaults. Failures are logged and never fatal.
    pub async fn start(&self) -> PromptSource {
        match self.prompt_storage.load() {
            Ok(Some(prompts)) => {
                info!("Using saved prompts");
                self.ctx.store.set_prompts(prompts);
                return PromptSource::Persisted;
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load saved prompts: {:#}", e),
        }

        match self.ctx.backend.default_prompts().await {
            Ok(prompts) => {
                info!("Using default prompts");
                self.ctx.store.set_prompts(prompts);
                PromptSource::Defaults
            }
            Err(e) => {
                warn!("Failed to load default prompts: {}", e);
                PromptSource::Unavailable
            }
        }
    }

    /// Run bulk AI processing over the whole inbox
    pub async fn process_emails(&self) -> WorkflowOutcome<BulkSummary> {
        self.bulk.process().await
    }

    pub fn processing_status(&self) -> WorkflowStatus {
        self.bulk.status()
    }

    pub fn active_tab(&self) -> Tab {
        self.ctx.store.active_tab()
    }

    pub fn switch_tab(&self, tab: Tab) {
        self.ctx.store.set_active_tab(tab);
    }

    /// Mount a fresh inbox panel
    pub fn inbox_panel(&self) -> InboxPanel {
        InboxPanel::new(self.clone())
    }

    /// Mount a fresh chat panel with its own intent consumer
    pub fn chat_panel(&self) -> ChatPanel {
        ChatPanel::new(self.clone())
    }

    pub fn drafts_panel(&self) -> DraftsPanel {
        DraftsPanel::new(self.clone())
    }

    pub fn prompts_panel(&self) -> PromptsPanel {
        PromptsPanel::new(self.clone())
    }
}
