use serde::{Deserialize, Serialize};
use validator::Validate;

/// The caller behind a verified admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub email: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginAdminDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQueryDto {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}
