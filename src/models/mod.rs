mod alert;
mod article;

pub use alert::{Alert, AlertView, NewAlert, PaginatedAlerts};
pub use article::Article;
