//! Workflow orchestrators
//!
//! Each orchestrator runs one backend workflow at a time: it snapshots its
//! input from the store, calls the backend, reconciles the result and
//! raises a notice. A second call while one is in flight is rejected.

mod chat;
mod drafts;
mod inbox;
mod workflow;

pub use chat::ChatAgent;
pub use drafts::{DraftDeleter, DraftLoader, DraftSaver};
pub use inbox::{BulkProcessor, BulkSummary, InboxLoader};
pub use workflow::{BusyFlag, BusyGuard, Rejection, WorkflowContext, WorkflowOutcome, WorkflowStatus};
