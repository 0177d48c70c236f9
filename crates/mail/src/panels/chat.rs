//! Chat panel: transcript, input box and email context

use std::sync::Arc;

use log::info;

use super::Workspace;
use crate::actions::{Rejection, WorkflowOutcome, WorkflowStatus};
use crate::intent::IntentConsumer;
use crate::models::{ChatMessage, DraftId, Email};
use crate::notice::Notice;

/// Canned queries offered when the transcript is empty
pub const SUGGESTED_QUERIES: [&str; 4] = [
    "Summarize this email",
    "What tasks do I need to do?",
    "Draft a reply to this email",
    "Show me all important emails",
];

pub struct ChatPanel {
    ws: Workspace,
    consumer: IntentConsumer,
    input: String,
}

impl ChatPanel {
    pub(super) fn new(ws: Workspace) -> Self {
        let consumer = IntentConsumer::new(ws.chat_intent().clone());
        Self {
            ws,
            consumer,
            input: String::new(),
        }
    }

    /// Run a query handed over by another panel, if one is pending.
    ///
    /// Returns `None` when there was nothing to run.
    pub async fn mount(&mut self) -> Option<WorkflowOutcome<Option<DraftId>>> {
        let query = self.consumer.consume()?;
        info!("Running query handed over to chat: {}", query);
        self.input = query;
        Some(self.submit().await)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTED_QUERIES
    }

    /// Fill the input with a suggested query
    pub fn use_suggestion(&mut self, index: usize) -> bool {
        match SUGGESTED_QUERIES.get(index) {
            Some(query) => {
                self.input = query.to_string();
                true
            }
            None => false,
        }
    }

    /// Send the input. It is cleared once the query was accepted.
    pub async fn submit(&mut self) -> WorkflowOutcome<Option<DraftId>> {
        let query = self.input.clone();
        let outcome = self.ws.chat.ask(&query).await;
        if !matches!(outcome, WorkflowOutcome::Rejected(Rejection::Busy)) {
            self.input.clear();
        }
        outcome
    }

    /// Send a query directly, leaving the input untouched
    pub async fn ask(&self, query: &str) -> WorkflowOutcome<Option<DraftId>> {
        self.ws.chat.ask(query).await
    }

    pub fn is_loading(&self) -> bool {
        self.ws.chat.status() == WorkflowStatus::Busy
    }

    pub fn messages(&self) -> Arc<Vec<ChatMessage>> {
        self.ws.store().chat_messages()
    }

    pub fn clear_chat(&self) {
        self.ws.store().clear_chat();
        self.ws.ctx.notify(Notice::success("Chat cleared"));
    }

    /// The email the conversation is about
    pub fn context(&self) -> Option<Arc<Email>> {
        self.ws.store().selected_email()
    }

    pub fn clear_context(&self) {
        self.ws.store().select_email(None);
    }
}
