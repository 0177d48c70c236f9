//! In-memory entity store
//!
//! The single source of truth for the workspace. Collections are held as
//! `Arc<Vec<Arc<T>>>`: reads hand out cheap snapshots, and a mutation
//! rebuilds only the touched item plus the outer vector of pointers, so
//! untouched items keep their identity across mutations.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use tokio::sync::watch;

use super::UiState;
use crate::models::{
    ActionItem, Category, ChatMessage, Draft, DraftId, Email, EmailId, PromptSet, Tab,
};
use crate::query::InboxFilter;

/// Snapshot of the email collection
pub type EmailList = Arc<Vec<Arc<Email>>>;

/// Snapshot of the draft collection
pub type DraftList = Arc<Vec<Arc<Draft>>>;

#[derive(Default)]
struct StoreState {
    emails: EmailList,
    drafts: DraftList,
    chat: Arc<Vec<ChatMessage>>,
    prompts: Arc<PromptSet>,
    ui: UiState,
}

/// Shared, synchronous store for emails, drafts, the chat transcript,
/// prompts and UI state.
///
/// Mutators never fail. Updates addressed to unknown ids are silent no-ops
/// and report `false`. Every effective mutation bumps the revision
/// published to [`EntityStore::subscribe`] receivers.
pub struct EntityStore {
    state: RwLock<StoreState>,
    revision: watch::Sender<u64>,
}

impl EntityStore {
    /// Create a new empty store
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            revision,
        }
    }

    // Writes are whole-field swaps, so a poisoned lock still guards valid state.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, changed: bool) -> bool {
        if changed {
            self.revision.send_modify(|rev| *rev += 1);
        }
        changed
    }

    /// Current revision (number of effective mutations so far)
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Watch the revision counter to learn about changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // === Emails ===

    pub fn emails(&self) -> EmailList {
        self.read().emails.clone()
    }

    pub fn email(&self, id: &EmailId) -> Option<Arc<Email>> {
        self.read().emails.iter().find(|e| &e.id == id).cloned()
    }

    pub fn email_count(&self) -> usize {
        self.read().emails.len()
    }

    /// Replace the whole email collection
    ///
    /// A selection pointing at an email absent from the new collection is cleared.
    pub fn set_emails(&self, emails: Vec<Email>) {
        let mut state = self.write();
        state.emails = Arc::new(emails.into_iter().map(Arc::new).collect());
        let dangling = state
            .ui
            .selected_email
            .as_ref()
            .is_some_and(|id| !state.emails.iter().any(|e| &e.id == id));
        if dangling {
            debug!("Clearing selection of email missing from the new collection");
            state.ui.selected_email = None;
        }
        drop(state);
        self.commit(true);
    }

    /// Apply `f` to the email with the given id, rebuilding only that item.
    fn update_email(&self, id: &EmailId, f: impl FnOnce(&mut Email)) -> bool {
        let mut state = self.write();
        let Some(index) = state.emails.iter().position(|e| &e.id == id) else {
            return false;
        };

        let mut updated = Email::clone(&state.emails[index]);
        f(&mut updated);
        if updated == *state.emails[index] {
            return false;
        }

        let mut next = Vec::clone(&state.emails);
        next[index] = Arc::new(updated);
        state.emails = Arc::new(next);
        drop(state);
        self.commit(true)
    }

    pub fn update_email_category(&self, id: &EmailId, category: Category) -> bool {
        self.update_email(id, |email| email.category = Some(category))
    }

    pub fn update_email_action_items(&self, id: &EmailId, action_items: Vec<ActionItem>) -> bool {
        self.update_email(id, |email| email.action_items = action_items)
    }

    /// Set category and/or action items of one email in a single step
    pub fn enrich_email(
        &self,
        id: &EmailId,
        category: Option<Category>,
        action_items: Option<Vec<ActionItem>>,
    ) -> bool {
        if category.is_none() && action_items.is_none() {
            return false;
        }
        self.update_email(id, |email| {
            if let Some(category) = category {
                email.category = Some(category);
            }
            if let Some(items) = action_items {
                email.action_items = items;
            }
        })
    }

    /// Remove an email, clearing the selection if it pointed at it
    pub fn remove_email(&self, id: &EmailId) -> bool {
        let mut state = self.write();
        if !state.emails.iter().any(|e| &e.id == id) {
            return false;
        }
        let next: Vec<Arc<Email>> = state.emails.iter().filter(|e| &e.id != id).cloned().collect();
        state.emails = Arc::new(next);
        if state.ui.selected_email.as_ref() == Some(id) {
            state.ui.selected_email = None;
        }
        drop(state);
        self.commit(true)
    }

    // === Drafts ===

    pub fn drafts(&self) -> DraftList {
        self.read().drafts.clone()
    }

    pub fn draft(&self, id: &DraftId) -> Option<Arc<Draft>> {
        self.read().drafts.iter().find(|d| &d.id == id).cloned()
    }

    /// Replace the whole draft collection
    pub fn set_drafts(&self, drafts: Vec<Draft>) {
        let mut state = self.write();
        state.drafts = Arc::new(drafts.into_iter().map(Arc::new).collect());
        let dangling = state
            .ui
            .selected_draft
            .as_ref()
            .is_some_and(|id| !state.drafts.iter().any(|d| &d.id == id));
        if dangling {
            state.ui.selected_draft = None;
        }
        drop(state);
        self.commit(true);
    }

    /// Append a new draft. A draft already stored under the same id is
    /// replaced in place so ids stay unique.
    pub fn add_draft(&self, draft: Draft) {
        let mut state = self.write();
        let mut next = Vec::clone(&state.drafts);
        match next.iter().position(|d| d.id == draft.id) {
            Some(index) => next[index] = Arc::new(draft),
            None => next.push(Arc::new(draft)),
        }
        state.drafts = Arc::new(next);
        drop(state);
        self.commit(true);
    }

    /// Replace the stored draft having `draft.id`. Unknown ids are ignored.
    pub fn replace_draft(&self, draft: Draft) -> bool {
        let mut state = self.write();
        let Some(index) = state.drafts.iter().position(|d| d.id == draft.id) else {
            return false;
        };
        if *state.drafts[index] == draft {
            return false;
        }
        let mut next = Vec::clone(&state.drafts);
        next[index] = Arc::new(draft);
        state.drafts = Arc::new(next);
        drop(state);
        self.commit(true)
    }

    /// Delete a draft, clearing the selection if it pointed at it
    pub fn delete_draft(&self, id: &DraftId) -> bool {
        let mut state = self.write();
        if !state.drafts.iter().any(|d| &d.id == id) {
            return false;
        }
        let next: Vec<Arc<Draft>> = state.drafts.iter().filter(|d| &d.id != id).cloned().collect();
        state.drafts = Arc::new(next);
        if state.ui.selected_draft.as_ref() == Some(id) {
            state.ui.selected_draft = None;
        }
        drop(state);
        self.commit(true)
    }

    // === Chat ===

    pub fn chat_messages(&self) -> Arc<Vec<ChatMessage>> {
        self.read().chat.clone()
    }

    pub fn push_chat_message(&self, message: ChatMessage) {
        let mut state = self.write();
        let mut next = Vec::clone(&state.chat);
        next.push(message);
        state.chat = Arc::new(next);
        drop(state);
        self.commit(true);
    }

    pub fn clear_chat(&self) -> bool {
        let mut state = self.write();
        if state.chat.is_empty() {
            return false;
        }
        state.chat = Arc::new(Vec::new());
        drop(state);
        self.commit(true)
    }

    // === Prompts ===

    pub fn prompts(&self) -> Arc<PromptSet> {
        self.read().prompts.clone()
    }

    pub fn set_prompts(&self, prompts: PromptSet) -> bool {
        let mut state = self.write();
        if *state.prompts == prompts {
            return false;
        }
        state.prompts = Arc::new(prompts);
        drop(state);
        self.commit(true)
    }

    // === UI state ===

    pub fn ui_state(&self) -> UiState {
        self.read().ui.clone()
    }

    /// Select an email by id, or clear the selection with `None`.
    ///
    /// Selecting an id that is not in the collection is a no-op.
    pub fn select_email(&self, id: Option<EmailId>) -> bool {
        let mut state = self.write();
        if let Some(id) = &id
            && !state.emails.iter().any(|e| &e.id == id)
        {
            return false;
        }
        if state.ui.selected_email == id {
            return false;
        }
        state.ui.selected_email = id;
        drop(state);
        self.commit(true)
    }

    pub fn selected_email_id(&self) -> Option<EmailId> {
        self.read().ui.selected_email.clone()
    }

    /// The currently selected email, resolved against the live collection
    pub fn selected_email(&self) -> Option<Arc<Email>> {
        let state = self.read();
        let id = state.ui.selected_email.as_ref()?;
        state.emails.iter().find(|e| &e.id == id).cloned()
    }

    /// Select a draft by id, or clear the selection with `None`.
    pub fn select_draft(&self, id: Option<DraftId>) -> bool {
        let mut state = self.write();
        if let Some(id) = &id
            && !state.drafts.iter().any(|d| &d.id == id)
        {
            return false;
        }
        if state.ui.selected_draft == id {
            return false;
        }
        state.ui.selected_draft = id;
        drop(state);
        self.commit(true)
    }

    pub fn selected_draft_id(&self) -> Option<DraftId> {
        self.read().ui.selected_draft.clone()
    }

    pub fn selected_draft(&self) -> Option<Arc<Draft>> {
        let state = self.read();
        let id = state.ui.selected_draft.as_ref()?;
        state.drafts.iter().find(|d| &d.id == id).cloned()
    }

    pub fn active_tab(&self) -> Tab {
        self.read().ui.active_tab
    }

    pub fn set_active_tab(&self, tab: Tab) -> bool {
        let mut state = self.write();
        if state.ui.active_tab == tab {
            return false;
        }
        state.ui.active_tab = tab;
        drop(state);
        self.commit(true)
    }

    pub fn filter(&self) -> InboxFilter {
        self.read().ui.filter.clone()
    }

    pub fn set_search_query(&self, query: impl Into<String>) -> bool {
        let query = query.into();
        let mut state = self.write();
        if state.ui.filter.query == query {
            return false;
        }
        state.ui.filter.query = query;
        drop(state);
        self.commit(true)
    }

    /// Toggle a category in the filter. Returns whether it is now selected.
    pub fn toggle_category(&self, category: Category) -> bool {
        let mut state = self.write();
        let categories = &mut state.ui.filter.categories;
        let selected = if categories.remove(&category) {
            false
        } else {
            categories.insert(category);
            true
        };
        drop(state);
        self.commit(true);
        selected
    }

    pub fn set_categories(&self, categories: BTreeSet<Category>) -> bool {
        let mut state = self.write();
        if state.ui.filter.categories == categories {
            return false;
        }
        state.ui.filter.categories = categories;
        drop(state);
        self.commit(true)
    }

    pub fn clear_filters(&self) -> bool {
        let mut state = self.write();
        if state.ui.filter.is_empty() {
            return false;
        }
        state.ui.filter = InboxFilter::default();
        drop(state);
        self.commit(true)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_email(id: &str, subject: &str) -> Email {
        Email::builder(id)
            .sender(format!("{}@example.com", id))
            .sender_name("Test User")
            .subject(subject)
            .body("Test body")
            .build()
    }

    fn setup_store() -> EntityStore {
        let store = EntityStore::new();
        store.set_emails(vec![
            make_email("e1", "Invoice"),
            make_email("e2", "Newsletter weekly"),
            make_email("e3", "Lunch?"),
        ]);
        store
    }

    #[test]
    fn test_update_category_keeps_untouched_identity() {
        let store = setup_store();
        let before = store.emails();

        assert!(store.update_email_category(&EmailId::new("e2"), Category::Newsletter));
        let after = store.emails();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(!Arc::ptr_eq(&before[1], &after[1]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
        assert_eq!(after[1].category, Some(Category::Newsletter));
        // The old snapshot is untouched
        assert_eq!(before[1].category, None);
    }

    #[test]
    fn test_update_unknown_email_is_noop() {
        let store = setup_store();
        let before = store.emails();
        let rev = store.revision();

        assert!(!store.update_email_category(&EmailId::new("missing"), Category::Spam));
        assert!(!store.update_email_action_items(&EmailId::new("missing"), vec![]));

        assert!(Arc::ptr_eq(&before, &store.emails()));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_unchanged_update_does_not_rebuild() {
        let store = setup_store();
        store.update_email_category(&EmailId::new("e1"), Category::Important);
        let before = store.emails();
        let rev = store.revision();

        assert!(!store.update_email_category(&EmailId::new("e1"), Category::Important));
        assert!(Arc::ptr_eq(&before, &store.emails()));
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn test_enrich_sets_both_fields() {
        let store = setup_store();
        let items = vec![ActionItem::new("Pay invoice")];

        assert!(store.enrich_email(&EmailId::new("e1"), Some(Category::ToDo), Some(items.clone())));
        let email = store.email(&EmailId::new("e1")).unwrap();
        assert_eq!(email.category, Some(Category::ToDo));
        assert_eq!(email.action_items, items);

        assert!(!store.enrich_email(&EmailId::new("e1"), None, None));
    }

    #[test]
    fn test_selection_resolves_live_email() {
        let store = setup_store();
        assert!(store.select_email(Some(EmailId::new("e1"))));
        store.update_email_category(&EmailId::new("e1"), Category::Important);

        let selected = store.selected_email().unwrap();
        assert_eq!(selected.category, Some(Category::Important));
    }

    #[test]
    fn test_select_unknown_email_is_rejected() {
        let store = setup_store();
        assert!(!store.select_email(Some(EmailId::new("nope"))));
        assert_eq!(store.selected_email_id(), None);
    }

    #[test]
    fn test_remove_email_clears_selection() {
        let store = setup_store();
        store.select_email(Some(EmailId::new("e2")));

        assert!(store.remove_email(&EmailId::new("e2")));
        assert_eq!(store.email_count(), 2);
        assert_eq!(store.selected_email_id(), None);
        assert!(!store.remove_email(&EmailId::new("e2")));
    }

    #[test]
    fn test_reload_clears_dangling_selection() {
        let store = setup_store();
        store.select_email(Some(EmailId::new("e3")));

        store.set_emails(vec![make_email("e1", "Invoice")]);
        assert_eq!(store.selected_email_id(), None);

        store.select_email(Some(EmailId::new("e1")));
        store.set_emails(vec![make_email("e1", "Invoice v2")]);
        assert_eq!(store.selected_email_id(), Some(EmailId::new("e1")));
    }

    #[test]
    fn test_draft_lifecycle() {
        let store = EntityStore::new();
        store.add_draft(Draft::new("d1", "Re: Invoice", "Thanks"));
        store.add_draft(Draft::new("d2", "Re: Lunch", "Sure"));
        assert_eq!(store.drafts().len(), 2);

        // Same id replaces instead of duplicating
        store.add_draft(Draft::new("d1", "Re: Invoice", "Thanks again"));
        assert_eq!(store.drafts().len(), 2);
        assert_eq!(store.draft(&DraftId::new("d1")).unwrap().body, "Thanks again");

        store.select_draft(Some(DraftId::new("d1")));
        assert!(store.delete_draft(&DraftId::new("d1")));
        assert_eq!(store.selected_draft_id(), None);
        assert!(!store.delete_draft(&DraftId::new("d1")));
    }

    #[test]
    fn test_replace_unknown_draft_is_noop() {
        let store = EntityStore::new();
        assert!(!store.replace_draft(Draft::new("ghost", "s", "b")));
        assert!(store.drafts().is_empty());
    }

    #[test]
    fn test_chat_append_and_clear() {
        let store = EntityStore::new();
        assert!(!store.clear_chat());

        store.push_chat_message(ChatMessage::user("hi"));
        store.push_chat_message(ChatMessage::assistant("hello"));
        assert_eq!(store.chat_messages().len(), 2);

        assert!(store.clear_chat());
        assert!(store.chat_messages().is_empty());
    }

    #[test]
    fn test_filter_mutators() {
        let store = EntityStore::new();
        assert!(store.toggle_category(Category::Spam));
        assert!(store.set_search_query("invoice"));
        assert!(!store.set_search_query("invoice"));
        assert!(!store.toggle_category(Category::Spam));
        assert!(store.filter().categories.is_empty());

        store.toggle_category(Category::Important);
        assert!(store.clear_filters());
        assert!(store.filter().is_empty());
        assert!(!store.clear_filters());
    }

    #[test]
    fn test_subscribe_sees_revisions() {
        let store = EntityStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set_active_tab(Tab::Chat);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        // No-op mutation does not notify
        store.set_active_tab(Tab::Chat);
        assert!(!rx.has_changed().unwrap());
    }
}
