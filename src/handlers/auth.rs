use std::sync::Arc;

use askama::Template;
use axum::{
    extract::Query,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use tower_cookies::{cookie::SameSite, Cookie};
use validator::Validate;

use crate::{
    middleware::TOKEN_COOKIE,
    models::admin::{LoginAdminDto, LoginQueryDto},
    services::posts::ADMIN_LISTING_PATH,
    views::LoginPage,
    AppState, Error, Result,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Only local absolute paths are honoured, anything else lands on the admin listing.
/// Browsers read `/\host` like `//host` and drop tabs and newlines, so those are refused too.
fn safe_redirect(target: Option<&str>) -> String {
    match target {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => ADMIN_LISTING_PATH.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !path.chars().any(char::is_control)
}

fn session_cookie(value: String, max_age: time::Duration) -> Result<HeaderValue> {
    let cookie = Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    cookie
        .to_string()
        .parse()
        .map_err(|_| Error::InternalServerError)
}

async fn login_page(Query(params): Query<LoginQueryDto>) -> Result<impl IntoResponse> {
    let page = LoginPage {
        redirect_to: safe_redirect(params.redirect_to.as_deref()),
        error: None,
    };
    Ok(Html(page.render()?))
}

async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Form(body): Form<LoginAdminDto>,
) -> Result<Response> {
    let redirect_to = safe_redirect(body.redirect_to.as_deref());

    let token = body
        .validate()
        .map_err(|e| Error::BadRequest(e.to_string()))
        .and_then(|_| app_state.auth_service.login(&body.email, &body.password));

    let token = match token {
        Ok(token) => token,
        Err(Error::BadRequest(_)) | Err(Error::Unauthorized { .. }) => {
            let page = LoginPage {
                redirect_to,
                error: Some("Invalid email or password".to_string()),
            };
            return Ok((StatusCode::UNAUTHORIZED, Html(page.render()?)).into_response());
        }
        Err(err) => return Err(err),
    };

    let cookie_duration = time::Duration::minutes(app_state.auth_service.jwt_expiration_hours() * 60);
    let mut response = Redirect::to(&redirect_to).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, session_cookie(token, cookie_duration)?);

    Ok(response)
}

async fn logout() -> Result<Response> {
    let mut response = Redirect::to("/posts").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie(String::new(), time::Duration::ZERO)?,
    );
    Ok(response)
}
