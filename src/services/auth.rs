use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{middleware::RequestContext, models::admin::AdminIdentity, Error, Result};

/// Decides whether a request comes from the blog administrator.
///
/// Every admin view and every mutation calls `require_admin` before touching
/// storage. Public views may use `optional_admin` to decorate output, never
/// to gate it.
#[async_trait]
pub trait AdminAuthorizer: Send + Sync {
    async fn require_admin(&self, ctx: &RequestContext) -> Result<AdminIdentity>;

    async fn optional_admin(&self, ctx: &RequestContext) -> Option<AdminIdentity> {
        self.require_admin(ctx).await.ok()
    }
}

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    jwt_expiration_hours: i64,
    admin_email: String,
    admin_password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

impl AuthService {
    pub fn new(
        jwt_secret: String,
        jwt_expiration_hours: i64,
        admin_email: String,
        admin_password_hash: String,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_hours,
            admin_email,
            admin_password_hash,
        }
    }

    pub fn jwt_expiration_hours(&self) -> i64 {
        self.jwt_expiration_hours
    }

    /// Verifies the admin credentials and returns a session token.
    pub fn login(&self, email: &str, password: &str) -> Result<String> {
        if !email.trim().eq_ignore_ascii_case(&self.admin_email) {
            warn!("login attempt for non-admin email");
            return Err(Error::unauthorized("/posts/admin"));
        }

        let parsed_hash =
            PasswordHash::new(&self.admin_password_hash).map_err(|_| Error::InternalServerError)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| {
                warn!("login attempt with wrong password");
                Error::unauthorized("/posts/admin")
            })?;

        self.generate_token(&self.admin_email, self.jwt_expiration_hours * 60)
    }

    fn generate_token(&self, subject: &str, expires_in_minutes: i64) -> Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(expires_in_minutes)).timestamp() as usize;
        let iat = now.timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| Error::InternalServerError)
    }

    pub fn decode_token<T: Into<String>>(&self, token: T) -> Option<String> {
        decode::<Claims>(
            &token.into(),
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .ok()
        .map(|data| data.claims.sub)
    }
}

#[async_trait]
impl AdminAuthorizer for AuthService {
    async fn require_admin(&self, ctx: &RequestContext) -> Result<AdminIdentity> {
        let Some(token) = ctx.token.as_deref() else {
            return Err(Error::unauthorized(&ctx.path));
        };

        match self.decode_token(token) {
            Some(email) if email.eq_ignore_ascii_case(&self.admin_email) => {
                Ok(AdminIdentity { email })
            }
            _ => {
                warn!(path = %ctx.path, "rejected admin request with invalid session");
                Err(Error::unauthorized(&ctx.path))
            }
        }
    }
}
