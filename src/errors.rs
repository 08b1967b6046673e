use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::views::ErrorPage;

pub type Result<T> = core::result::Result<T, Error>;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug)]
pub enum Error {
    /// No valid admin session; carries the path to come back to after login.
    Unauthorized { redirect_to: String },
    PostNotFound(String),
    DuplicateSlug(String),
    BadRequest(String),
    StorageUnavailable(sqlx::Error),
    InternalServerError,
    Config(String),
}

impl Error {
    pub fn unauthorized(redirect_to: impl Into<String>) -> Self {
        Self::Unauthorized {
            redirect_to: redirect_to.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized { redirect_to } => {
                let location = format!(
                    "/login?redirectTo={}",
                    urlencoding::encode(&redirect_to)
                );
                return Redirect::to(&location).into_response();
            }
            Self::PostNotFound(slug) => (
                StatusCode::NOT_FOUND,
                format!("No post found with the slug: '{slug}'"),
            ),
            Self::DuplicateSlug(slug) => (
                StatusCode::CONFLICT,
                format!("A post with the slug '{slug}' already exists"),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::StorageUnavailable(_) | Self::InternalServerError | Self::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
        };

        match ErrorPage::new(&message).render_html() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::StorageUnavailable(err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        error!("Migration error: {:?}", err);
        Self::StorageUnavailable(sqlx::Error::Migrate(Box::new(err)))
    }
}

impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        error!("Template error: {:?}", err);
        Self::InternalServerError
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn unauthorized_redirects_to_login_with_encoded_return_path() {
        let response = Error::unauthorized("/posts/admin/hello world").into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?redirectTo=%2Fposts%2Fadmin%2Fhello%20world"
        );
    }

    #[test]
    fn not_found_is_distinct_from_storage_failure() {
        let not_found = Error::PostNotFound("missing".into()).into_response();
        let storage = Error::StorageUnavailable(sqlx::Error::PoolTimedOut).into_response();

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_failures_share_one_neutral_page() {
        for err in [
            Error::InternalServerError,
            Error::Config("bad hash".into()),
            Error::StorageUnavailable(sqlx::Error::PoolTimedOut),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let page = String::from_utf8(bytes.to_vec()).unwrap();
            assert!(page.contains(INTERNAL_ERROR_MESSAGE));
            assert!(!page.contains("bad hash"));
        }
    }
}
