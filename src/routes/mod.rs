use std::sync::Arc;

use axum::{response::Redirect, routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth::auth_handler, posts::posts_handler},
    AppState,
};

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/posts") }))
        .nest("/posts", posts_handler())
        .merge(auth_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{
        repositories::InMemoryPostRepo,
        services::auth::tests::{admin_token, auth_service, ADMIN_EMAIL, ADMIN_PASSWORD},
    };

    use super::*;

    struct TestApp {
        router: Router,
        repo: Arc<InMemoryPostRepo>,
        token: String,
    }

    fn test_app() -> TestApp {
        let auth = auth_service();
        let token = admin_token(&auth);
        let repo = Arc::new(InMemoryPostRepo::new());
        let state = AppState::new(repo.clone(), auth);
        TestApp {
            router: create_routes(Arc::new(state)),
            repo,
            token,
        }
    }

    impl TestApp {
        async fn get(&self, uri: &str, as_admin: bool) -> Response {
            let mut request = Request::get(uri);
            if as_admin {
                request = request.header(header::COOKIE, format!("token={}", self.token));
            }
            self.router
                .clone()
                .oneshot(request.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }

        async fn post_form(&self, uri: &str, body: &str, as_admin: bool) -> Response {
            let mut request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if as_admin {
                request = request.header(header::COOKIE, format!("token={}", self.token));
            }
            self.router
                .clone()
                .oneshot(request.body(Body::from(body.to_string())).unwrap())
                .await
                .unwrap()
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn create_list_and_view_a_post() {
        let app = test_app();

        let created = app
            .post_form(
                "/posts/admin/new",
                "intent=create&title=Hello&slug=hello&markdown=%23+Hi",
                true,
            )
            .await;
        assert_eq!(created.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&created), "/posts/admin");

        let listing = body_text(app.get("/posts", false).await).await;
        assert!(listing.contains(r#"<a href="/posts/hello">Hello</a>"#));

        let page = app.get("/posts/hello", false).await;
        assert_eq!(page.status(), StatusCode::OK);
        let page = body_text(page).await;
        assert!(page.contains("<h1>Hi</h1>"));
        assert!(!page.contains("# Hi"));
        assert!(!page.contains("/posts/admin/hello"));
    }

    #[tokio::test]
    async fn admin_sees_edit_link_on_public_view() {
        let app = test_app();
        app.post_form(
            "/posts/admin/new",
            "intent=create&title=Hello&slug=hello&markdown=body",
            true,
        )
        .await;

        let page = body_text(app.get("/posts/hello", true).await).await;
        assert!(page.contains(r#"href="/posts/admin/hello""#));
    }

    #[tokio::test]
    async fn missing_post_is_a_404_page() {
        let app = test_app();
        let response = app.get("/posts/does-not-exist", false).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = body_text(response).await;
        assert!(page.contains("No post found with the slug"));
        assert!(page.contains("does-not-exist"));
    }

    #[tokio::test]
    async fn admin_views_redirect_anonymous_callers_to_login() {
        let app = test_app();
        for uri in ["/posts/admin", "/posts/admin/new"] {
            let response = app.get(uri, false).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert!(location(&response).starts_with("/login?redirectTo=%2Fposts%2Fadmin"));
        }
    }

    #[tokio::test]
    async fn anonymous_post_cannot_write() {
        let app = test_app();
        let response = app
            .post_form(
                "/posts/admin/new",
                "intent=create&title=Evil&slug=evil&markdown=x",
                false,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login"));
        assert_eq!(app.repo.len().await, 0);
    }

    #[tokio::test]
    async fn validation_errors_render_next_to_fields() {
        let app = test_app();
        let response = app
            .post_form("/posts/admin/new", "intent=create&title=&slug=&markdown=", true)
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let page = body_text(response).await;
        assert!(page.contains("Title is required"));
        assert!(page.contains("Slug is required"));
        assert!(page.contains("Markdown is required"));
        assert_eq!(app.repo.len().await, 0);
    }

    #[tokio::test]
    async fn slug_shadowed_by_admin_route_is_rejected() {
        let app = test_app();
        let response = app
            .post_form(
                "/posts/admin/new",
                "intent=create&title=About+admin&slug=admin&markdown=x",
                true,
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("is reserved"));
        assert_eq!(app.repo.len().await, 0);
    }

    #[tokio::test]
    async fn edit_form_then_update_and_delete() {
        let app = test_app();
        app.post_form(
            "/posts/admin/new",
            "intent=create&title=Hello&slug=hello&markdown=%23+Hi",
            true,
        )
        .await;

        let form = body_text(app.get("/posts/admin/hello", true).await).await;
        assert!(form.contains(r#"value="update""#));
        assert!(form.contains(r#"data-pending-label="Deleting...""#));

        let updated = app
            .post_form(
                "/posts/admin/hello",
                "intent=update&title=Hello%21&markdown=%23+Hi+there",
                true,
            )
            .await;
        assert_eq!(updated.status(), StatusCode::SEE_OTHER);
        let page = body_text(app.get("/posts/hello", false).await).await;
        assert!(page.contains("Hello!"));
        assert!(page.contains("Hi there"));

        let deleted = app
            .post_form("/posts/admin/hello", "intent=delete", true)
            .await;
        assert_eq!(location(&deleted), "/posts/admin");
        assert_eq!(
            app.get("/posts/hello", false).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn login_sets_session_cookie_and_returns_to_target() {
        let app = test_app();
        let body = format!(
            "email={}&password={}&redirectTo=%2Fposts%2Fadmin%2Fnew",
            urlencoding::encode(ADMIN_EMAIL),
            urlencoding::encode(ADMIN_PASSWORD)
        );
        let response = app.post_form("/login", &body, false).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/posts/admin/new");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn login_never_redirects_off_site() {
        let app = test_app();
        let body = format!(
            "email={}&password={}&redirectTo=%2F%5Cevil.example",
            urlencoding::encode(ADMIN_EMAIL),
            urlencoding::encode(ADMIN_PASSWORD)
        );
        let response = app.post_form("/login", &body, false).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/posts/admin");
    }

    #[tokio::test]
    async fn login_with_wrong_password_shows_form_again() {
        let app = test_app();
        let body = format!("email={}&password=nope", urlencoding::encode(ADMIN_EMAIL));
        let response = app.post_form("/login", &body, false).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Invalid email or password"));
    }
}
