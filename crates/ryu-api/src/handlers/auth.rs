//! Signup and login handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ryu_models::Role;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
}

fn default_role() -> String {
    "candidate".to_string()
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

/// Create an account. Only recruiter/candidate roles are accepted here;
/// admin provisioning goes through the bootstrap binary.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let user = state
        .accounts
        .signup(
            &request.name,
            &request.email,
            &request.password,
            &request.role,
            request.company,
        )
        .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
    }))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user payload embedded in a login response.
#[derive(Serialize)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub company: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: LoginUser,
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (token, user) = state
        .accounts
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            company: user.company,
        },
    }))
}
