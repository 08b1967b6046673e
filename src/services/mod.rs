pub mod auth;
pub mod markdown;
pub mod posts;
pub mod validation;
