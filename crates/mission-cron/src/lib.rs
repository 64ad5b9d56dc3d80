//! mission-cron: Scheduled job records.
//!
//! Jobs are stored in the agent runtime's `cron/jobs.json` and listed or
//! edited here. Nothing in this crate runs them; the runtime that owns the
//! file does.

pub mod store;

pub use mission_types::{CronDocument, CronJob, CronJobPatch, NewCronJob};
pub use store::CronStore;
