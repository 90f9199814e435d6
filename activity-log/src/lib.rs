//! User activity: the append-only event log and the per-user aggregation
//! the recommender feeds on.
//!
//! - [`ActivityLog`]: store trait with [`MemoryActivityLog`] and
//!   [`JsonlActivityLog`] implementations.
//! - [`ActivityAggregator::derive`]: priority-ordered interaction list plus
//!   the fixed-length [`UserState`].

mod aggregator;
pub mod errors;
mod jsonl_log;
mod store;
pub mod structs;

pub use aggregator::{ActivityAggregator, UserActivity, summarize};
pub use errors::activity_log_error::ActivityLogError;
pub use jsonl_log::JsonlActivityLog;
pub use store::{ActivityLog, MemoryActivityLog};
pub use structs::activity_event::ActivityEvent;
pub use structs::activity_type::ActivityType;
pub use structs::user_state::UserState;
