//! Background jobs executed by the job scheduler.
//!
//! Jobs here are idempotent (re-running over an unchanged article window
//! inserts nothing new), fault-tolerant per article, and report a
//! structured result for logging.

pub mod news_scan_job;
