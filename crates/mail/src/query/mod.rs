//! Query API for UI consumption
//!
//! Provides pure projections of the entity store that views render from.

mod inbox;

pub use inbox::{InboxFilter, InboxProjector, InboxView, filter_emails};
