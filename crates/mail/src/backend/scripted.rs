//! Scripted in-memory backend
//!
//! Answers every call from canned responses and records what was asked.
//! Calls can be held at a gate to observe workflows while they are in
//! flight.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::api::{ChatRequest, ChatResponse, ProcessRequest, ProcessResponse};
use super::{BackendError, MailBackend};
use crate::models::{Draft, DraftId, Email, EmailId, PromptSet};

/// A call received by [`ScriptedBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    LoadInbox,
    Process { email_ids: Vec<EmailId> },
    Chat { query: String, email_id: Option<EmailId> },
    LoadDrafts,
    SaveDraft(Draft),
    DeleteDraft(DraftId),
    DefaultPrompts,
}

struct Script {
    inbox: Result<Vec<Email>, BackendError>,
    process: Result<ProcessResponse, BackendError>,
    chat: VecDeque<Result<ChatResponse, BackendError>>,
    drafts: Result<Vec<Draft>, BackendError>,
    save: Result<(), BackendError>,
    delete: Result<(), BackendError>,
    prompts: Result<PromptSet, BackendError>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            inbox: Ok(Vec::new()),
            process: Ok(ProcessResponse::default()),
            chat: VecDeque::new(),
            drafts: Ok(Vec::new()),
            save: Ok(()),
            delete: Ok(()),
            prompts: Ok(PromptSet::default()),
        }
    }
}

/// [`MailBackend`] answering from canned responses
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<Vec<BackendCall>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_inbox(&self, inbox: Result<Vec<Email>, BackendError>) {
        lock(&self.script).inbox = inbox;
    }

    pub fn set_process(&self, response: Result<ProcessResponse, BackendError>) {
        lock(&self.script).process = response;
    }

    /// Queue a chat response. With an empty queue the assistant echoes the query.
    pub fn push_chat(&self, response: Result<ChatResponse, BackendError>) {
        lock(&self.script).chat.push_back(response);
    }

    pub fn set_drafts(&self, drafts: Result<Vec<Draft>, BackendError>) {
        lock(&self.script).drafts = drafts;
    }

    pub fn set_save(&self, result: Result<(), BackendError>) {
        lock(&self.script).save = result;
    }

    pub fn set_delete(&self, result: Result<(), BackendError>) {
        lock(&self.script).delete = result;
    }

    pub fn set_prompts(&self, prompts: Result<PromptSet, BackendError>) {
        lock(&self.script).prompts = prompts;
    }

    /// Hold every subsequent call until [`ScriptedBackend::release`]
    pub fn hold(&self) {
        *lock(&self.gate) = Some(Arc::new(Notify::new()));
    }

    /// Let one held call (the current or the next one) complete
    pub fn release(&self) {
        if let Some(gate) = lock(&self.gate).as_ref() {
            gate.notify_one();
        }
    }

    /// Stop holding calls. Calls already waiting still need a release.
    pub fn open(&self) {
        *lock(&self.gate) = None;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| pred(call)).count()
    }

    async fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl MailBackend for ScriptedBackend {
    async fn load_inbox(&self) -> Result<Vec<Email>, BackendError> {
        self.record(BackendCall::LoadInbox).await;
        lock(&self.script).inbox.clone()
    }

    async fn process_emails(&self, request: ProcessRequest) -> Result<ProcessResponse, BackendError> {
        let email_ids = request.emails.iter().map(|e| e.id.clone()).collect();
        self.record(BackendCall::Process { email_ids }).await;
        lock(&self.script).process.clone()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        self.record(BackendCall::Chat {
            query: request.query.clone(),
            email_id: request.email_id.clone(),
        })
        .await;
        lock(&self.script)
            .chat
            .pop_front()
            .unwrap_or_else(|| Ok(ChatResponse::reply(format!("You asked: {}", request.query))))
    }

    async fn load_drafts(&self) -> Result<Vec<Draft>, BackendError> {
        self.record(BackendCall::LoadDrafts).await;
        lock(&self.script).drafts.clone()
    }

    async fn save_draft(&self, draft: &Draft) -> Result<Option<Draft>, BackendError> {
        self.record(BackendCall::SaveDraft(draft.clone())).await;
        lock(&self.script).save.clone().map(|()| Some(draft.clone()))
    }

    async fn delete_draft(&self, id: &DraftId) -> Result<(), BackendError> {
        self.record(BackendCall::DeleteDraft(id.clone())).await;
        lock(&self.script).delete.clone()
    }

    async fn default_prompts(&self) -> Result<PromptSet, BackendError> {
        self.record(BackendCall::DefaultPrompts).await;
        lock(&self.script).prompts.clone()
    }
}
