//! Scheduler lifecycle tracking
//!
//! # Components
//!
//! - `SchedulerState`: where a per-seed scheduler is in its run (idle, running, draining, done)

mod scheduler_state;

pub use scheduler_state::SchedulerState;
