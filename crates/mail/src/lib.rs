//! Mail crate - client-side state core of the Ocean AI email workspace
//!
//! This crate provides platform-independent workspace functionality including:
//! - Domain models (Email, Draft, ChatMessage, PromptSet)
//! - An in-memory entity store with structural sharing
//! - Reconciliation of AI backend results into the store
//! - Query API (filtered inbox projection) for UI consumption
//! - A cross-view intent channel
//! - Workflow orchestrators with busy exclusion
//! - Panel view-models tying the above together
//!
//! This crate has zero UI dependencies.

pub mod actions;
pub mod backend;
pub mod config;
pub mod intent;
pub mod models;
pub mod notice;
pub mod panels;
pub mod query;
pub mod reconcile;
pub mod storage;

pub use actions::{
    BulkProcessor, BulkSummary, BusyFlag, ChatAgent, DraftDeleter, DraftLoader, DraftSaver,
    InboxLoader, Rejection, WorkflowContext, WorkflowOutcome, WorkflowStatus,
};
pub use backend::{BackendCall, BackendError, HttpBackend, MailBackend, ScriptedBackend};
pub use config::{BackendConfig, FilePromptStorage, InMemoryPromptStorage, PromptStorage};
pub use intent::{IntentChannel, IntentConsumer, PENDING_CHAT_QUERY};
pub use models::{
    ActionItem, Category, ChatMessage, ChatRole, Draft, DraftId, DraftMetadata, Email, EmailId,
    Priority, PromptKind, PromptSet, PromptTemplate, Tab,
};
pub use notice::{LogNotices, Notice, NoticeLevel, NoticeLog, NoticeSink};
pub use panels::{ChatPanel, DraftsPanel, InboxPanel, PromptSource, PromptsPanel, Workspace};
pub use query::{InboxFilter, InboxProjector, InboxView, filter_emails};
pub use reconcile::{
    BulkReconcileStats, apply_bulk_results, apply_chat_failure, apply_chat_reply,
    apply_deleted_draft, apply_saved_draft,
};
pub use storage::{EntityStore, UiState};
