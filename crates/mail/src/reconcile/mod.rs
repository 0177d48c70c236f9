//! Reconciliation of backend results into the entity store
//!
//! Each function translates one completed backend call into store
//! mutations. They never fail: results addressed to unknown entities are
//! skipped and partial batches are applied entry by entry.

use log::{debug, warn};

use crate::backend::api::{ChatResponse, ProcessedEmail};
use crate::models::{ChatMessage, Draft, DraftId};
use crate::storage::EntityStore;

/// Outcome of applying a bulk processing batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReconcileStats {
    /// Results that changed an email
    pub applied: usize,
    /// Results that carried nothing to apply or named an unknown email
    pub skipped: usize,
    /// Results that reported a per-email error
    pub errored: usize,
}

/// Apply per-email categorization results.
///
/// A category is set when present; action items are set when non-empty.
/// Entries are independent, so one bad entry never affects the others.
pub fn apply_bulk_results(store: &EntityStore, results: &[ProcessedEmail]) -> BulkReconcileStats {
    let mut stats = BulkReconcileStats::default();

    for result in results {
        if let Some(error) = &result.error {
            warn!("Email {} failed to process: {}", result.id, error);
            stats.errored += 1;
        }

        let action_items = (!result.action_items.is_empty()).then(|| result.action_items.clone());
        if store.enrich_email(&result.id, result.category, action_items) {
            debug!(
                "Enriched email {} (category: {:?}, {} action items)",
                result.id,
                result.category,
                result.action_items.len()
            );
            stats.applied += 1;
        } else {
            stats.skipped += 1;
        }
    }

    stats
}

/// Apply a successful chat reply: the assistant message, then any draft
/// the assistant produced.
///
/// Returns the id of the inserted draft.
pub fn apply_chat_reply(store: &EntityStore, reply: ChatResponse) -> Option<DraftId> {
    store.push_chat_message(ChatMessage::assistant(reply.response));

    let draft = reply.draft?;
    let id = draft.id.clone();
    debug!("Chat produced draft {}", id);
    store.add_draft(draft);
    Some(id)
}

/// Answer a failed chat request with the fixed apology message
pub fn apply_chat_failure(store: &EntityStore) {
    store.push_chat_message(ChatMessage::failure_reply());
}

/// Store the persisted version of a saved draft.
///
/// Falls back to the submitted draft when the backend did not echo one.
/// Returns false if the draft no longer exists in the store.
pub fn apply_saved_draft(store: &EntityStore, submitted: Draft, persisted: Option<Draft>) -> bool {
    let draft = persisted.unwrap_or(submitted);
    let id = draft.id.clone();
    if store.draft(&id).is_none() {
        warn!("Saved draft {} is no longer in the store", id);
        return false;
    }
    store.replace_draft(draft);
    true
}

/// Remove a deleted draft (and its selection)
pub fn apply_deleted_draft(store: &EntityStore, id: &DraftId) -> bool {
    let removed = store.delete_draft(id);
    if !removed {
        debug!("Deleted draft {} was not in the store", id);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionItem, Category, ChatRole, Email, EmailId, CHAT_FAILURE_REPLY};
    use std::sync::Arc;

    fn setup_store() -> EntityStore {
        let store = EntityStore::new();
        store.set_emails(vec![
            Email::builder("e1").subject("Invoice").build(),
            Email::builder("e2").subject("Newsletter").build(),
            Email::builder("e3").subject("Lunch").build(),
        ]);
        store
    }

    #[test]
    fn test_bulk_partial_batch_applies_each_entry() {
        let store = setup_store();
        let results = vec![
            ProcessedEmail::new("e1")
                .with_category(Category::Important)
                .with_action_items(vec![ActionItem::new("Pay invoice")]),
            ProcessedEmail::new("e2").with_error("timeout"),
            ProcessedEmail::new("missing").with_category(Category::Spam),
            ProcessedEmail::new("e3").with_category(Category::ToDo),
        ];

        let stats = apply_bulk_results(&store, &results);

        assert_eq!(stats, BulkReconcileStats { applied: 2, skipped: 2, errored: 1 });
        let e1 = store.email(&EmailId::new("e1")).unwrap();
        assert_eq!(e1.category, Some(Category::Important));
        assert_eq!(e1.action_items.len(), 1);
        assert_eq!(store.email(&EmailId::new("e2")).unwrap().category, None);
        assert_eq!(store.email(&EmailId::new("e3")).unwrap().category, Some(Category::ToDo));
    }

    #[test]
    fn test_bulk_empty_action_items_keep_existing() {
        let store = setup_store();
        let id = EmailId::new("e1");
        store.update_email_action_items(&id, vec![ActionItem::new("Keep me")]);

        apply_bulk_results(&store, &[ProcessedEmail::new("e1").with_category(Category::Important)]);

        let email = store.email(&id).unwrap();
        assert_eq!(email.action_items, vec![ActionItem::new("Keep me")]);
    }

    #[test]
    fn test_bulk_is_idempotent() {
        let store = setup_store();
        let results = vec![ProcessedEmail::new("e1").with_category(Category::Important)];

        apply_bulk_results(&store, &results);
        let emails = store.emails();
        let revision = store.revision();

        let stats = apply_bulk_results(&store, &results);
        assert_eq!(stats.applied, 0);
        assert_eq!(store.revision(), revision);
        assert!(Arc::ptr_eq(&emails, &store.emails()));
    }

    #[test]
    fn test_chat_reply_with_draft() {
        let store = EntityStore::new();
        let reply = ChatResponse::reply("Here is a draft").with_draft(Draft::new("d1", "Re: Invoice", "Paid"));

        let id = apply_chat_reply(&store, reply);

        assert_eq!(id, Some(DraftId::new("d1")));
        let messages = store.chat_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::Assistant);
        assert_eq!(store.drafts().len(), 1);
    }

    #[test]
    fn test_chat_failure_appends_apology() {
        let store = EntityStore::new();
        apply_chat_failure(&store);
        assert_eq!(store.chat_messages()[0].content, CHAT_FAILURE_REPLY);
        assert!(store.drafts().is_empty());
    }

    #[test]
    fn test_saved_draft_prefers_echo() {
        let store = EntityStore::new();
        let original = Draft::new("d1", "Re: Invoice", "Paid");
        store.add_draft(original.clone());

        let submitted = original.edited("Re: Invoice", "Paid today", chrono::Utc::now());
        let mut persisted = submitted.clone();
        persisted.body = "Paid today (saved)".to_string();

        assert!(apply_saved_draft(&store, submitted.clone(), Some(persisted)));
        assert_eq!(store.draft(&original.id).unwrap().body, "Paid today (saved)");

        assert!(apply_saved_draft(&store, submitted, None));
        assert_eq!(store.draft(&original.id).unwrap().body, "Paid today");
    }

    #[test]
    fn test_saved_draft_deleted_meanwhile() {
        let store = EntityStore::new();
        let draft = Draft::new("gone", "s", "b");
        assert!(!apply_saved_draft(&store, draft, None));
        assert!(store.drafts().is_empty());
    }

    #[test]
    fn test_deleted_draft_clears_selection() {
        let store = EntityStore::new();
        store.add_draft(Draft::new("d1", "s", "b"));
        store.select_draft(Some(DraftId::new("d1")));

        assert!(apply_deleted_draft(&store, &DraftId::new("d1")));
        assert_eq!(store.selected_draft_id(), None);
        assert!(!apply_deleted_draft(&store, &DraftId::new("d1")));
    }
}
