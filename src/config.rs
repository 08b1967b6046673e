use std::env;

use argon2::PasswordHash;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the service on the in-memory repository.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Session lifetime in hours.
    pub jwt_maxage: i64,
    pub admin_email: String,
    pub admin_password_hash: String,
    pub port: u16,
    pub json_logs: bool,
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "{name} environment variable must be set and non-empty"
        ))),
    }
}

/// The admin hash must be a PHC string, e.g. `$argon2id$v=19$...`.
fn password_hash(value: String) -> Result<String> {
    PasswordHash::new(&value).map_err(|e| {
        Error::Config(format!("ADMIN_PASSWORD_HASH is not a valid password hash: {e}"))
    })?;
    Ok(value)
}

impl Config {
    pub fn init() -> Result<Config> {
        let jwt_maxage = match env::var("JWT_MAXAGE") {
            Ok(value) => value
                .parse()
                .map_err(|_| Error::Config(format!("JWT_MAXAGE must be a number of hours, got '{value}'")))?,
            Err(_) => 24,
        };

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{value}'")))?,
            Err(_) => 8080,
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_maxage,
            admin_email: required("ADMIN_EMAIL")?,
            admin_password_hash: password_hash(required("ADMIN_PASSWORD_HASH")?)?,
            port,
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}
