use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;

pub const TOKEN_COOKIE: &str = "token";

/// Per-request session context handed explicitly to every handler that needs
/// to know who is calling. Holds the raw credential, not a verified identity.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub token: Option<String>,
    pub path: String,
}

#[cfg(test)]
impl RequestContext {
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self {
            token: None,
            path: path.into(),
        }
    }

    pub fn with_token(path: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            path: path.into(),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies = CookieJar::from_headers(&parts.headers);

        let token = cookies
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(header::AUTHORIZATION)
                    .and_then(|auth_header| auth_header.to_str().ok())
                    .and_then(|auth_value| {
                        auth_value
                            .strip_prefix("Bearer ")
                            .map(|stripped| stripped.to_string())
                    })
            })
            .filter(|token| !token.is_empty());

        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Self { token, path })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> RequestContext {
        let (mut parts, _) = request.into_parts();
        RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reads_token_from_cookie_first() {
        let request = Request::builder()
            .uri("/posts/admin")
            .header(header::COOKIE, "token=from-cookie")
            .header(header::AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap();

        let ctx = extract(request).await;
        assert_eq!(ctx.token.as_deref(), Some("from-cookie"));
        assert_eq!(ctx.path, "/posts/admin");
    }

    #[tokio::test]
    async fn falls_back_to_bearer_header() {
        let request = Request::builder()
            .uri("/posts/admin/new")
            .header(header::AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap();

        assert_eq!(extract(request).await.token.as_deref(), Some("from-header"));
    }

    #[tokio::test]
    async fn no_credentials_means_no_token() {
        let request = Request::builder().uri("/posts").body(()).unwrap();
        assert!(extract(request).await.token.is_none());
    }
}
