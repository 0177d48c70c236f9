//! Backend wire types
//!
//! Every response is an envelope with a `success` flag; a `false` flag comes
//! with an `error` string instead of the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ActionItem, Category, Draft, DraftId, Email, EmailId, PromptSet, lenient};

/// Response from `GET /api/emails/load`
#[derive(Debug, Deserialize)]
pub struct InboxResponse {
    pub success: bool,
    #[serde(default)]
    pub emails: Vec<Email>,
    pub count: Option<usize>,
    pub error: Option<String>,
}

/// Body of `POST /api/emails/process`
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub emails: Vec<Email>,
    pub prompts: PromptSet,
}

/// Per-email outcome of bulk processing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEmail {
    pub id: EmailId,
    #[serde(default, deserialize_with = "lenient::category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient::action_items")]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessedEmail {
    pub fn new(id: impl Into<EmailId>) -> Self {
        Self {
            id: id.into(),
            category: None,
            action_items: Vec::new(),
            error: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_action_items(mut self, action_items: Vec<ActionItem>) -> Self {
        self.action_items = action_items;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Response from `POST /api/emails/process`
///
/// `success` is false as soon as any batch-level error occurred, even when
/// results for individual emails are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default)]
    pub processed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub results: Vec<ProcessedEmail>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub error: Option<String>,
}

impl ProcessResponse {
    /// Build a successful response from per-email results
    pub fn from_results(results: Vec<ProcessedEmail>) -> Self {
        let failed = results.iter().filter(|r| r.error.is_some()).count();
        Self {
            success: true,
            processed: results.len() - failed,
            failed,
            results,
            errors: Vec::new(),
            error: None,
        }
    }
}

/// Body of `POST /api/chat/query`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<EmailId>,
    pub emails: Vec<Email>,
    pub prompts: PromptSet,
}

/// Response from `POST /api/chat/query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub draft: Option<Draft>,
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn reply(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
            ..Self::default()
        }
    }

    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }
}

/// Response from `GET /api/drafts`
///
/// Drafts are kept as raw values so one malformed entry does not discard
/// the whole list.
#[derive(Debug, Deserialize)]
pub struct DraftsResponse {
    pub success: bool,
    #[serde(default)]
    pub drafts: Vec<Value>,
    pub error: Option<String>,
}

/// Draft as accepted (and echoed back) by `POST /api/drafts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub id: Option<DraftId>,
    pub email_id: Option<EmailId>,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub timestamp: Option<String>,
}

impl SaveDraftRequest {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            id: Some(draft.id.clone()),
            email_id: draft.original_email_id.clone(),
            to: draft
                .metadata
                .as_ref()
                .and_then(|m| m.original_sender.clone())
                .unwrap_or_default(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            timestamp: draft.updated_at.map(|t| t.to_rfc3339()),
        }
    }

    /// Merge the persisted echo onto the draft that was submitted
    pub fn apply_to(&self, submitted: &Draft) -> Draft {
        Draft {
            subject: self.subject.clone(),
            body: self.body.clone(),
            ..submitted.clone()
        }
    }
}

/// Response from `POST /api/drafts`
#[derive(Debug, Deserialize)]
pub struct SaveDraftResponse {
    pub success: bool,
    pub draft: Option<SaveDraftRequest>,
    pub error: Option<String>,
}

/// Response carrying only the success flag (`DELETE /api/drafts/{id}`)
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DraftMetadata;

    #[test]
    fn test_process_response_with_odd_values() {
        let json = r#"{
            "success": false,
            "processed": 1,
            "failed": 1,
            "results": [
                {"id": "email-001", "category": "Important", "actionItems": [
                    {"task": "Pay invoice", "deadline": "none", "priority": "urgent"},
                    {"deadline": "Friday"}
                ]},
                {"id": "email-002", "category": "Uncategorized", "actionItems": [], "error": "timeout"}
            ],
            "errors": ["Batch processing error: timeout"]
        }"#;

        let response: ProcessResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.results.len(), 2);

        let first = &response.results[0];
        assert_eq!(first.category, Some(Category::Important));
        assert_eq!(first.action_items, vec![ActionItem::new("Pay invoice")]);

        let second = &response.results[1];
        assert_eq!(second.category, None);
        assert_eq!(second.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_process_response_from_results_counts_errors() {
        let response = ProcessResponse::from_results(vec![
            ProcessedEmail::new("a").with_category(Category::Spam),
            ProcessedEmail::new("b").with_error("boom"),
        ]);
        assert!(response.success);
        assert_eq!(response.processed, 1);
        assert_eq!(response.failed, 1);
    }

    #[test]
    fn test_chat_request_omits_missing_email_id() {
        let request = ChatRequest {
            query: "What tasks do I need to do?".to_string(),
            email_id: None,
            emails: Vec::new(),
            prompts: PromptSet::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("emailId").is_none());
        assert!(value["prompts"].get("autoReply").is_some());
    }

    #[test]
    fn test_chat_failure_envelope() {
        let json = r#"{"success": false, "error": "LLM unavailable", "response": "An error occurred processing your request."}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("LLM unavailable"));
        assert!(response.draft.is_none());
    }

    #[test]
    fn test_save_request_from_draft() {
        let draft = Draft::new("d1", "Re: Invoice", "Paid")
            .with_original_email("email-001")
            .with_metadata(DraftMetadata {
                original_sender: Some("Billing".to_string()),
                ..DraftMetadata::default()
            });

        let request = SaveDraftRequest::from_draft(&draft);
        assert_eq!(request.id, Some(DraftId::new("d1")));
        assert_eq!(request.email_id, Some(EmailId::new("email-001")));
        assert_eq!(request.to, "Billing");
        assert_eq!(request.timestamp, None);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["emailId"], "email-001");
    }

    #[test]
    fn test_echo_keeps_local_fields() {
        let draft = Draft::new("d1", "Re: Invoice", "Paid").with_original_email("email-001");
        let echo = SaveDraftRequest {
            subject: "Re: Invoice (persisted)".to_string(),
            ..SaveDraftRequest::from_draft(&draft)
        };

        let merged = echo.apply_to(&draft);
        assert_eq!(merged.subject, "Re: Invoice (persisted)");
        assert_eq!(merged.created_at, draft.created_at);
        assert_eq!(merged.original_email_id, draft.original_email_id);
    }
}
