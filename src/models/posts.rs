use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Slug reserved for the empty "new post" form.
pub const NEW_POST_SLUG: &str = "new";

/// Slug shadowed by the admin listing route under `/posts`.
pub const ADMIN_SLUG: &str = "admin";

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub markdown: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection, markdown is not loaded.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct PostListing {
    pub title: String,
    pub slug: String,
}

impl From<&Post> for PostListing {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
        }
    }
}

/// What the public single-post view gets: never the markdown source.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RenderedPost {
    pub title: String,
    pub slug: String,
    pub html: String,
}

/// Raw form body of `POST /posts/admin/{slug}`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PostDraft {
    pub intent: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Update,
    Delete,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Resolves the submitted intent token. Without a token the target slug
    /// decides: the `new` sentinel creates, anything else updates.
    pub fn resolve(token: Option<&str>, target_slug: &str) -> Result<Self> {
        match token.map(str::trim) {
            Some("create") => Ok(Self::Create),
            Some("update") => Ok(Self::Update),
            Some("delete") => Ok(Self::Delete),
            None | Some("") if target_slug == NEW_POST_SLUG => Ok(Self::Create),
            None | Some("") => Ok(Self::Update),
            Some(other) => Err(Error::BadRequest(format!("Unknown intent '{other}'"))),
        }
    }
}

/// Per-field validation messages. `None` means the field is fine.
#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub markdown: Option<String>,
}

impl FieldErrors {
    pub fn slug(message: impl Into<String>) -> Self {
        Self {
            slug: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.title, &self.slug, &self.markdown]
            .iter()
            .all(|message| message.as_deref().map_or(true, str::is_empty))
    }

    pub fn len(&self) -> usize {
        [&self.title, &self.slug, &self.markdown]
            .iter()
            .filter(|message| message.as_deref().is_some_and(|m| !m.is_empty()))
            .count()
    }
}
