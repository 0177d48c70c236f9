//! Inbox filtering: free-text search plus category filter

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{Category, Email};
use crate::storage::EmailList;

/// Search query and category selection applied to the inbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxFilter {
    /// Free-text query matched against subject, sender and body
    pub query: String,
    /// Categories to keep; empty means "any category"
    pub categories: BTreeSet<Category>,
}

impl InboxFilter {
    pub fn new(query: impl Into<String>, categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            query: query.into(),
            categories: categories.into_iter().collect(),
        }
    }

    /// True when neither a query nor a category is set
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.categories.is_empty()
    }

    fn needle(&self) -> Option<String> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

/// The filtered inbox along with the size of the unfiltered collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxView {
    /// Matching emails, in source order
    pub emails: Vec<Arc<Email>>,
    /// Size of the unfiltered collection
    pub total: usize,
}

impl InboxView {
    /// Number of emails matching the filter
    pub fn matched(&self) -> usize {
        self.emails.len()
    }

    /// The inbox holds no emails at all
    pub fn is_inbox_empty(&self) -> bool {
        self.total == 0
    }

    /// The inbox has emails, but none match the filter
    pub fn has_no_matches(&self) -> bool {
        self.total > 0 && self.emails.is_empty()
    }
}

/// Filter emails by query and category.
///
/// Query and categories are conjunctive; categories within the set are
/// disjunctive. Source order is preserved, and an empty filter returns the
/// collection unchanged.
pub fn filter_emails(emails: &[Arc<Email>], filter: &InboxFilter) -> InboxView {
    let needle = filter.needle();
    let matched = emails
        .iter()
        .filter(|email| needle.as_deref().is_none_or(|n| email.matches_text(n)))
        .filter(|email| {
            filter.categories.is_empty()
                || email.category.is_some_and(|c| filter.categories.contains(&c))
        })
        .cloned()
        .collect();

    InboxView {
        emails: matched,
        total: emails.len(),
    }
}

struct Memo {
    source: EmailList,
    filter: InboxFilter,
    view: Arc<InboxView>,
}

/// Memoizing wrapper around [`filter_emails`].
///
/// The cache is keyed on the identity of the email snapshot plus the filter,
/// so it is invalidated by any store mutation that touched the collection.
#[derive(Default)]
pub struct InboxProjector {
    memo: Mutex<Option<Memo>>,
}

impl InboxProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, emails: &EmailList, filter: &InboxFilter) -> Arc<InboxView> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = memo.as_ref()
            && Arc::ptr_eq(&cached.source, emails)
            && &cached.filter == filter
        {
            return cached.view.clone();
        }

        let view = Arc::new(filter_emails(emails, filter));
        *memo = Some(Memo {
            source: emails.clone(),
            filter: filter.clone(),
            view: view.clone(),
        });
        view
    }
}
