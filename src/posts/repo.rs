use async_trait::async_trait;
use sqlx::PgPool;

use crate::posts::repo_types::{Post, PostFields, PostFilter};

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create(&self, author_id: i64, fields: &PostFields) -> anyhow::Result<Post>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Post>>;

    async fn list(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>>;

    /// `None` when the row vanished before the update ran.
    async fn update(&self, id: i64, fields: &PostFields) -> anyhow::Result<Option<Post>>;

    /// `false` when there was nothing to delete.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn create(&self, author_id: i64, fields: &PostFields) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, published, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, published, created_at, author_id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(fields.published)
        .bind(author_id)
        .fetch_one(&self.db)
        .await?;
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, published, created_at, author_id
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn list(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>> {
        // strpos keeps the search literal; LIKE would treat % and _ as wildcards
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, published, created_at, author_id
            FROM posts
            WHERE $1 = '' OR strpos(title, $1) > 0
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&filter.search)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: i64, fields: &PostFields) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, published = $4
            WHERE id = $1
            RETURNING id, title, content, published, created_at, author_id
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(fields.published)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
