use std::sync::Arc;

use askama::Template;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};

use crate::{
    middleware::RequestContext,
    models::posts::{PostDraft, NEW_POST_SLUG},
    services::posts::{AdminDraft, MutationOutcome},
    views::{AdminIndexPage, PostFormPage, PostPage, PostsIndexPage},
    AppState, Result,
};

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", get(list_posts))
        .route("/admin", get(admin_index))
        .route("/admin/{slug}", get(edit_post).post(submit_post))
        .route("/{slug}", get(show_post))
}

async fn list_posts(Extension(app_state): Extension<Arc<AppState>>) -> Result<impl IntoResponse> {
    let posts = app_state.posts_controller.list_posts().await?;
    Ok(Html(PostsIndexPage { posts: &posts }.render()?))
}

async fn show_post(
    Extension(app_state): Extension<Arc<AppState>>,
    ctx: RequestContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let controller = &app_state.posts_controller;
    let post = controller.view_post(&slug).await?;
    let can_edit = controller.viewer_is_admin(&ctx).await;

    Ok(Html(
        PostPage {
            post: &post,
            can_edit,
        }
        .render()?,
    ))
}

async fn admin_index(
    Extension(app_state): Extension<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let listing = app_state.posts_controller.admin_listing(&ctx).await?;

    Ok(Html(
        AdminIndexPage {
            admin: &listing.admin,
            posts: &listing.posts,
        }
        .render()?,
    ))
}

async fn edit_post(
    Extension(app_state): Extension<Arc<AppState>>,
    ctx: RequestContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = match app_state.posts_controller.load_draft(&ctx, &slug).await? {
        AdminDraft::New => PostFormPage::empty(&slug),
        AdminDraft::Existing(post) => PostFormPage::existing(&post),
    };
    Ok(Html(page.render()?))
}

async fn submit_post(
    Extension(app_state): Extension<Arc<AppState>>,
    ctx: RequestContext,
    Path(slug): Path<String>,
    Form(draft): Form<PostDraft>,
) -> Result<Response> {
    let outcome = app_state
        .posts_controller
        .submit(&ctx, &slug, &draft)
        .await?;

    match outcome {
        MutationOutcome::Redirect(location) => Ok(Redirect::to(location).into_response()),
        MutationOutcome::Invalid(errors) => {
            let page = PostFormPage::rejected(
                &slug,
                slug == NEW_POST_SLUG,
                draft.title.as_deref().unwrap_or_default(),
                draft.slug.as_deref().unwrap_or_default(),
                draft.markdown.as_deref().unwrap_or_default(),
                errors,
            );
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.render()?)).into_response())
        }
    }
}
