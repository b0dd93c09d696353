// handlers/authentication.rs - user registration and token issuance

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{generate_jwt, hash_password, verify_password, AuthError, Claims};
use crate::error::ApiError;
use crate::handlers::extract::JsonBody;
use crate::models::{User, UserForAuthenticationDto, UserForRegistrationDto};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/authentication - register a user with one or more roles
pub async fn register(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<UserForRegistrationDto>,
) -> Result<StatusCode, ApiError> {
    dto.validate().map_err(ApiError::validation)?;

    let roles = dto.canonical_roles();
    let password_hash = hash_password(dto.password.as_deref().unwrap_or_default())?;
    let user = User {
        id: Uuid::new_v4(),
        user_name: dto.user_name.unwrap_or_default().trim().to_string(),
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
        phone_number: dto.phone_number,
        password_hash,
        roles,
    };

    let user = state.repository.user.create_user(user).await?;
    tracing::info!("Registered user '{}' with roles {:?}", user.user_name, user.roles);
    Ok(StatusCode::CREATED)
}

/// POST /api/authentication/login - exchange credentials for a JWT
pub async fn login(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<UserForAuthenticationDto>,
) -> Result<Json<TokenResponse>, ApiError> {
    dto.validate().map_err(ApiError::validation)?;

    let user_name = dto.user_name.unwrap_or_default();
    let password = dto.password.unwrap_or_default();

    let user = state.repository.user.find_by_user_name(user_name.trim()).await?;
    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Authentication failed for '{}'. Wrong user name or password.", user_name);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let claims = Claims::new(&user, &state.config.security);
    let token = generate_jwt(&claims, &state.config.security)?;
    Ok(Json(TokenResponse { token }))
}
