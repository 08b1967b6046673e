use askama::Template;

use crate::models::{
    admin::AdminIdentity,
    posts::{FieldErrors, Intent, Post, PostListing, RenderedPost},
};

/// Which mutation, if any, is in flight for the form being shown.
/// Drives button labels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingIntent {
    #[default]
    None,
    Creating,
    Updating,
    Deleting,
}

impl PendingIntent {
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("create") => Self::Creating,
            Some("update") => Self::Updating,
            Some("delete") => Self::Deleting,
            _ => Self::None,
        }
    }

    pub fn is_pending(self, intent: Intent) -> bool {
        matches!(
            (self, intent),
            (Self::Creating, Intent::Create)
                | (Self::Updating, Intent::Update)
                | (Self::Deleting, Intent::Delete)
        )
    }
}

pub fn action_label(intent: Intent, pending: PendingIntent) -> &'static str {
    match (intent, pending.is_pending(intent)) {
        (Intent::Create, false) => "Create",
        (Intent::Create, true) => "Creating...",
        (Intent::Update, false) => "Update",
        (Intent::Update, true) => "Updating...",
        (Intent::Delete, false) => "Delete Post",
        (Intent::Delete, true) => "Deleting...",
    }
}

/// A submit control of the post form.
///
/// Pages are always rendered idle. `pending_label` is emitted as
/// `data-pending-label` and swapped in client-side while the submission is
/// in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub intent: &'static str,
    pub label: &'static str,
    pub pending_label: &'static str,
    pub destructive: bool,
}

impl ActionButton {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent: intent.as_str(),
            label: action_label(intent, PendingIntent::None),
            pending_label: action_label(intent, PendingIntent::from_token(Some(intent.as_str()))),
            destructive: intent == Intent::Delete,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct PostsIndexPage<'a> {
    pub posts: &'a [PostListing],
}

#[derive(Template)]
#[template(path = "posts/show.html")]
pub struct PostPage<'a> {
    pub post: &'a RenderedPost,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts/admin_index.html")]
pub struct AdminIndexPage<'a> {
    pub admin: &'a AdminIdentity,
    pub posts: &'a [PostListing],
}

#[derive(Template)]
#[template(path = "posts/admin_form.html")]
pub struct PostFormPage {
    pub action: String,
    pub is_new: bool,
    pub title: String,
    pub slug: String,
    pub markdown: String,
    pub errors: FieldErrors,
    pub buttons: Vec<ActionButton>,
}

impl PostFormPage {
    fn new(target_slug: &str, is_new: bool) -> Self {
        let buttons = if is_new {
            vec![ActionButton::new(Intent::Create)]
        } else {
            vec![ActionButton::new(Intent::Delete), ActionButton::new(Intent::Update)]
        };

        Self {
            action: format!("/posts/admin/{}", urlencoding::encode(target_slug)),
            is_new,
            title: String::new(),
            slug: String::new(),
            markdown: String::new(),
            errors: FieldErrors::default(),
            buttons,
        }
    }

    pub fn empty(target_slug: &str) -> Self {
        Self::new(target_slug, true)
    }

    pub fn existing(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            markdown: post.markdown.clone(),
            ..Self::new(&post.slug, false)
        }
    }

    /// Re-renders a rejected submission with what the admin typed.
    pub fn rejected(
        target_slug: &str,
        is_new: bool,
        title: &str,
        slug: &str,
        markdown: &str,
        errors: FieldErrors,
    ) -> Self {
        Self {
            title: title.to_string(),
            slug: (if is_new { slug } else { target_slug }).to_string(),
            markdown: markdown.to_string(),
            errors,
            ..Self::new(target_slug, is_new)
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub redirect_to: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub message: &'a str,
}

impl<'a> ErrorPage<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    pub fn render_html(&self) -> askama::Result<String> {
        self.render()
    }
}
