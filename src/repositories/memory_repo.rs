//! In-memory post storage, used by tests and when no database is configured.
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    models::posts::{Post, PostListing},
    Error, Result,
};

use super::PostRepository;

#[derive(Default)]
pub struct InMemoryPostRepo {
    posts: RwLock<HashMap<String, Post>>,
}

impl InMemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepo {
    async fn list_all(&self) -> Result<Vec<PostListing>> {
        let posts = self.posts.read().await;
        let mut ordered: Vec<&Post> = posts.values().collect();
        ordered.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(ordered.into_iter().map(PostListing::from).collect())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(slug).cloned())
    }

    async fn create(&self, title: &str, slug: &str, markdown: &str) -> Result<Post> {
        // Check and insert under one write lock so racing creates cannot both win.
        let mut posts = self.posts.write().await;
        if posts.contains_key(slug) {
            return Err(Error::DuplicateSlug(slug.to_string()));
        }

        let now = Utc::now();
        let post = Post {
            slug: slug.to_string(),
            title: title.to_string(),
            markdown: markdown.to_string(),
            created_at: now,
            updated_at: now,
        };
        posts.insert(post.slug.clone(), post.clone());
        Ok(post)
    }

    async fn update(&self, slug: &str, title: &str, markdown: &str) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(slug)
            .ok_or_else(|| Error::PostNotFound(slug.to_string()))?;

        post.title = title.to_string();
        post.markdown = markdown.to_string();
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<()> {
        if self.posts.write().await.remove(slug).is_none() {
            debug!(slug, "delete of absent post treated as success");
        }
        Ok(())
    }
}
