//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, token checks and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use camptime_core::domain::{AuthToken, User};
use camptime_core::ports::PortError;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::http_error;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `tokencheck` and `logout`.
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub stamm: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            stamm: user.stamm,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".to_string());
        }
        if !self.email.contains('@') {
            return Err("A valid email address is required".to_string());
        }
        if self.password.len() < 8 {
            return Err("Password must be at least 8 characters".to_string());
        }
        Ok(())
    }
}

fn invalid_credentials() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account without a stamm
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate().map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed".to_string())
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(
            req.first_name.trim(),
            req.last_name.trim(),
            req.email.trim(),
            &password_hash,
        )
        .await
        .map_err(http_error("register user"))?;

    info!(user_id = %user.id, "Registered new user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/login - Login with an existing account
///
/// Any token issued earlier to the same user stops working.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Get user by email
    let credentials = match state.db.get_credentials_by_email(req.email.trim()).await {
        Ok(credentials) => credentials,
        Err(PortError::NotFound(_)) => return Err(invalid_credentials()),
        Err(e) => return Err(http_error("log in")(e)),
    };

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
    })?;
    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(invalid_credentials());
    }

    // 3. Issue a fresh token, dropping the old ones
    let token = AuthToken {
        token: Uuid::new_v4().simple().to_string(),
        user_id: credentials.user.id,
        expires_at: Utc::now() + Duration::days(state.config.token_ttl_days),
    };
    state
        .db
        .replace_tokens(&token)
        .await
        .map_err(http_error("log in"))?;

    info!(user_id = %credentials.user.id, "User logged in");
    Ok(Json(LoginResponse {
        user: credentials.user.into(),
        token: token.token,
    }))
}

/// POST /api/auth/tokencheck - Resolve a token to its user
#[utoipa::path(
    post,
    path = "/api/auth/tokencheck",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = UserResponse),
        (status = 401, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn tokencheck_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.token.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Token is required".to_string()));
    }
    let identity = state
        .db
        .identity_for_token(req.token.trim())
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            other => http_error("validate token")(other),
        })?;
    let user = state
        .db
        .get_user(identity.user_id)
        .await
        .map_err(http_error("validate token"))?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /api/auth/logout - Invalidate a token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .delete_token(req.token.trim())
        .await
        .map_err(http_error("log out"))?;
    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}
