//! AI backend collaborator
//!
//! This module provides:
//! - The `MailBackend` trait consumed by the workflow orchestrators
//! - An HTTP implementation against the REST API
//! - A scripted in-memory implementation for tests and offline use
//! - Wire types for every endpoint

pub mod api;
mod error;
mod http;
mod scripted;

use async_trait::async_trait;

pub use error::BackendError;
pub use http::HttpBackend;
pub use scripted::{BackendCall, ScriptedBackend};

use api::{ChatRequest, ChatResponse, ProcessRequest, ProcessResponse};
use crate::models::{Draft, DraftId, Email, PromptSet};

/// Operations the workspace needs from the AI backend
///
/// An `Ok` value always means the backend reported success; `success: false`
/// envelopes surface as [`BackendError::Rejected`].
#[async_trait]
pub trait MailBackend: Send + Sync {
    /// Load the inbox
    async fn load_inbox(&self) -> Result<Vec<Email>, BackendError>;

    /// Categorize emails and extract action items in one batch.
    ///
    /// A partially failed batch is still `Ok`; per-email errors are carried
    /// in the results.
    async fn process_emails(&self, request: ProcessRequest) -> Result<ProcessResponse, BackendError>;

    /// Ask the assistant a question, optionally about one email
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError>;

    async fn load_drafts(&self) -> Result<Vec<Draft>, BackendError>;

    /// Persist a draft, returning the persisted version when echoed back
    async fn save_draft(&self, draft: &Draft) -> Result<Option<Draft>, BackendError>;

    async fn delete_draft(&self, id: &DraftId) -> Result<(), BackendError>;

    /// Default prompt templates shipped with the backend
    async fn default_prompts(&self) -> Result<PromptSet, BackendError>;
}
