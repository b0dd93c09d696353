use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{into_result, FieldErrors};

/// Roles seeded at startup; registrations may only request these.
pub const ROLES: &[&str] = &["Manager", "Administrator"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForRegistrationDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserForRegistrationDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.user_name.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.insert("userName".into(), "Username is required".into());
        }
        if self.password.as_deref().map_or(true, str::is_empty) {
            errors.insert("password".into(), "Password is required".into());
        }
        let unknown: Vec<&str> = self
            .roles
            .iter()
            .map(String::as_str)
            .filter(|role| !ROLES.iter().any(|known| known.eq_ignore_ascii_case(role)))
            .collect();
        if !unknown.is_empty() {
            errors.insert("roles".into(), format!("Unknown roles: {}", unknown.join(", ")));
        }
        into_result(errors)
    }

    /// Roles normalised to their seeded spelling.
    pub fn canonical_roles(&self) -> Vec<String> {
        self.roles
            .iter()
            .filter_map(|role| ROLES.iter().find(|known| known.eq_ignore_ascii_case(role)))
            .map(|role| role.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForAuthenticationDto {
    pub user_name: Option<String>,
    pub password: Option<String>,
}

impl UserForAuthenticationDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.user_name.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.insert("userName".into(), "User name is required".into());
        }
        if self.password.as_deref().map_or(true, str::is_empty) {
            errors.insert("password".into(), "Password name is required".into());
        }
        into_result(errors)
    }
}
