use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    error::{ApiError, ApiResult},
    posts::repo_types::{Post, PostFields, PostFilter},
};

pub const MAX_LIMIT: i64 = 100;

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}
fn default_published() -> bool {
    true
}

impl PostInput {
    pub fn into_fields(self) -> ApiResult<PostFields> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("title", "title must not be blank"));
        }
        Ok(PostFields {
            title: self.title,
            content: self.content,
            published: self.published,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub search: String,
}
fn default_limit() -> i64 {
    10
}

impl PostQuery {
    pub fn into_filter(self) -> ApiResult<PostFilter> {
        if !(0..=MAX_LIMIT).contains(&self.limit) {
            return Err(ApiError::validation(
                "limit",
                format!("limit must be between 0 and {MAX_LIMIT}"),
            ));
        }
        if self.skip < 0 {
            return Err(ApiError::validation("skip", "skip must not be negative"));
        }
        Ok(PostFilter {
            limit: self.limit,
            skip: self.skip,
            search: self.search,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author_id: i64,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            published: p.published,
            created_at: p.created_at,
            author_id: p.author_id,
        }
    }
}
