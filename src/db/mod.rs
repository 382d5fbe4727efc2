pub mod alert_queries;
pub mod alert_store;

pub use alert_store::{AlertStore, PgAlertStore};
