use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}
