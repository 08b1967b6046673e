use async_trait::async_trait;
use tracing::debug;

use crate::{
    models::posts::{Post, PostListing},
    Error, Result,
};

use super::PostgresRepo;

/// Durable storage of posts keyed by slug.
///
/// Each call is atomic on its own. Slug uniqueness is enforced here, not by
/// callers. `delete_by_slug` is idempotent: removing an absent slug succeeds.
#[async_trait]
pub trait PostRepository: Sync + Send {
    async fn list_all(&self) -> Result<Vec<PostListing>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    async fn create(&self, title: &str, slug: &str, markdown: &str) -> Result<Post>;
    async fn update(&self, slug: &str, title: &str, markdown: &str) -> Result<Post>;
    async fn delete_by_slug(&self, slug: &str) -> Result<()>;
}

#[async_trait]
impl PostRepository for PostgresRepo {
    async fn list_all(&self) -> Result<Vec<PostListing>> {
        let posts = sqlx::query_as::<_, PostListing>(
            r#"
            SELECT title, slug FROM posts ORDER BY created_at, slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT slug, title, markdown, created_at, updated_at FROM posts WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn create(&self, title: &str, slug: &str, markdown: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (slug, title, markdown)
            VALUES ($1, $2, $3)
            RETURNING slug, title, markdown, created_at, updated_at
            "#,
        )
        .bind(slug)
        .bind(title)
        .bind(markdown)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::DuplicateSlug(slug.to_string())
            }
            other => Error::from(other),
        })?;
        Ok(post)
    }

    async fn update(&self, slug: &str, title: &str, markdown: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2,
                markdown = $3,
                updated_at = NOW()
            WHERE slug = $1
            RETURNING slug, title, markdown, created_at, updated_at
            "#,
        )
        .bind(slug)
        .bind(title)
        .bind(markdown)
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or_else(|| Error::PostNotFound(slug.to_string()))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts WHERE slug = $1
            "#,
        )
        .bind(slug)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(slug, "delete of absent post treated as success");
        }

        Ok(())
    }
}
