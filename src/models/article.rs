use chrono::{DateTime, Utc};

/// One discovered news item. Transient: lives only for the duration of a
/// single pipeline pass.
#[derive(Debug, Clone)]
pub struct Article {
    /// Canonical article URL; the dedup key.
    pub url: String,
    pub company_name: String,
    pub published_at: DateTime<Utc>,
    pub subject: String,
    /// Preamble plus truncated detail text, bounded length.
    pub body_text: String,
}
