use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    middleware::RequestContext,
    models::{
        admin::AdminIdentity,
        posts::{FieldErrors, Intent, Post, PostDraft, PostListing, RenderedPost, NEW_POST_SLUG},
    },
    repositories::PostRepository,
    services::{auth::AdminAuthorizer, markdown, validation::PostFormValidator},
    Error, Result,
};

pub const ADMIN_LISTING_PATH: &str = "/posts/admin";

/// What the admin form route should show for a target slug.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminDraft {
    New,
    Existing(Post),
}

/// Result of a mutation that passed authorization.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Redirect(&'static str),
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminListing {
    pub admin: AdminIdentity,
    pub posts: Vec<PostListing>,
}

/// Orchestrates the post lifecycle: public reads, admin reads and the
/// authorize, validate, write pipeline for mutations.
#[derive(Clone)]
pub struct PostLifecycleController {
    repo: Arc<dyn PostRepository>,
    authorizer: Arc<dyn AdminAuthorizer>,
}

impl PostLifecycleController {
    pub fn new(repo: Arc<dyn PostRepository>, authorizer: Arc<dyn AdminAuthorizer>) -> Self {
        Self { repo, authorizer }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostListing>> {
        self.repo.list_all().await
    }

    pub async fn view_post(&self, slug: &str) -> Result<RenderedPost> {
        debug_assert!(!slug.is_empty(), "post route matched without a slug");

        let post = self
            .repo
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| Error::PostNotFound(slug.to_string()))?;

        Ok(RenderedPost {
            html: markdown::render(&post.markdown),
            title: post.title,
            slug: post.slug,
        })
    }

    /// Admin presence for decorating public pages. Never a gate.
    pub async fn viewer_is_admin(&self, ctx: &RequestContext) -> bool {
        self.authorizer.optional_admin(ctx).await.is_some()
    }

    pub async fn admin_listing(&self, ctx: &RequestContext) -> Result<AdminListing> {
        let admin = self.authorizer.require_admin(ctx).await?;
        let posts = self.repo.list_all().await?;
        Ok(AdminListing { admin, posts })
    }

    pub async fn load_draft(&self, ctx: &RequestContext, slug: &str) -> Result<AdminDraft> {
        self.authorizer.require_admin(ctx).await?;
        debug_assert!(!slug.is_empty(), "admin route matched without a slug");

        if slug == NEW_POST_SLUG {
            return Ok(AdminDraft::New);
        }

        self.repo
            .get_by_slug(slug)
            .await?
            .map(AdminDraft::Existing)
            .ok_or_else(|| Error::PostNotFound(slug.to_string()))
    }

    /// Handles `POST /posts/admin/{target_slug}`.
    ///
    /// Authorization runs first, then validation, then at most one write.
    /// Field errors come back as `Invalid` with storage untouched.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        target_slug: &str,
        draft: &PostDraft,
    ) -> Result<MutationOutcome> {
        let admin = self.authorizer.require_admin(ctx).await?;
        debug_assert!(!target_slug.is_empty(), "admin route matched without a slug");

        let intent = Intent::resolve(draft.intent.as_deref(), target_slug)?;

        match intent {
            Intent::Delete => {
                self.repo.delete_by_slug(target_slug).await?;
                info!(admin = %admin.email, slug = target_slug, "post deleted");
            }
            Intent::Create => {
                let valid = match PostFormValidator::validate(draft, intent) {
                    Ok(valid) => valid,
                    Err(errors) => return Ok(Self::rejected(intent, target_slug, errors)),
                };
                match self
                    .repo
                    .create(&valid.title, &valid.slug, &valid.markdown)
                    .await
                {
                    Ok(post) => {
                        info!(admin = %admin.email, slug = %post.slug, "post created");
                    }
                    Err(Error::DuplicateSlug(_)) => {
                        return Ok(Self::rejected(
                            intent,
                            target_slug,
                            FieldErrors::slug("A post with this slug already exists"),
                        ));
                    }
                    Err(err) => return Err(err),
                }
            }
            Intent::Update => {
                let valid = match PostFormValidator::validate(draft, intent) {
                    Ok(valid) => valid,
                    Err(errors) => return Ok(Self::rejected(intent, target_slug, errors)),
                };
                self.repo
                    .update(target_slug, &valid.title, &valid.markdown)
                    .await?;
                info!(admin = %admin.email, slug = target_slug, "post updated");
            }
        }

        Ok(MutationOutcome::Redirect(ADMIN_LISTING_PATH))
    }

    fn rejected(intent: Intent, target_slug: &str, errors: FieldErrors) -> MutationOutcome {
        debug!(
            intent = intent.as_str(),
            slug = target_slug,
            fields = errors.len(),
            "submission rejected"
        );
        MutationOutcome::Invalid(errors)
    }
}
