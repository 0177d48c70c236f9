//! Shared workflow plumbing: busy exclusion and outcomes

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{BackendError, MailBackend};
use crate::notice::{Notice, NoticeSink};
use crate::storage::EntityStore;

/// Whether a workflow is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowStatus {
    #[default]
    Idle,
    Busy,
}

/// Why a workflow call was refused without contacting the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The same workflow is already in flight
    Busy,
    /// There was nothing to act on (blank query, empty inbox)
    EmptyInput,
}

/// Result of one workflow invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome<T> {
    /// The backend succeeded and its result was reconciled
    Completed(T),
    /// The backend failed; a notice was raised
    Failed(BackendError),
    /// Refused before any backend call
    Rejected(Rejection),
}

impl<T> WorkflowOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, WorkflowOutcome::Rejected(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            WorkflowOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Per-workflow mutual exclusion flag
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> WorkflowStatus {
        if self.is_busy() {
            WorkflowStatus::Busy
        } else {
            WorkflowStatus::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Enter Busy, or `None` if already Busy.
    ///
    /// The flag returns to Idle when the guard drops, including on panic
    /// or when the owning future is dropped mid-flight.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { flag: self })
    }
}

/// Holds a [`BusyFlag`] in the Busy state
#[must_use = "the flag returns to Idle as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

/// Everything a workflow talks to
#[derive(Clone)]
pub struct WorkflowContext {
    pub store: Arc<EntityStore>,
    pub backend: Arc<dyn MailBackend>,
    pub notices: Arc<dyn NoticeSink>,
}

impl WorkflowContext {
    pub fn new(
        store: Arc<EntityStore>,
        backend: Arc<dyn MailBackend>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            store,
            backend,
            notices,
        }
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notices.notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_excludes_second_holder() {
        let flag = BusyFlag::new();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert_eq!(flag.status(), WorkflowStatus::Busy);
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert_eq!(flag.status(), WorkflowStatus::Idle);
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn test_flag_resets_on_panic() {
        let flag = BusyFlag::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = flag.try_acquire();
            panic!("workflow blew up");
        }));
        assert!(result.is_err());
        assert!(!flag.is_busy());
    }

    #[test]
    fn test_outcome_helpers() {
        let done: WorkflowOutcome<usize> = WorkflowOutcome::Completed(3);
        assert!(done.is_completed());
        assert_eq!(done.completed(), Some(3));

        let busy: WorkflowOutcome<usize> = WorkflowOutcome::Rejected(Rejection::Busy);
        assert!(busy.is_rejected());
        assert_eq!(busy.completed(), None);
    }
}
