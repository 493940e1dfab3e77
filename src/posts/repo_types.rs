use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub author_id: i64,
}

/// Writable columns of a post, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub limit: i64,
    pub skip: i64,
    pub search: String,
}
