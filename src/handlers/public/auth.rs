// handlers/public/auth.rs - POST /api/auth/login, /api/auth/register, /api/auth/signup
use axum::{extract::State, http::header::SET_COOKIE, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ValidJson, Validator};
use crate::auth;
use crate::config::{Environment, SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{new_id, Role, User, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
}

/// Token plus the user it was issued to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
    pub expires_in: String,
}

impl AuthSession {
    fn issue(user: &User, state: &AppState) -> Result<Self, ApiError> {
        let security = &state.config.security;
        Ok(Self {
            user: UserProfile::from(user),
            token: auth::issue_token(user, security)?,
            expires_in: format!("{}h", security.jwt_expiry_hours),
        })
    }
}

/// POST /api/auth/login - exchange username and password for a token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let username = body.username.as_deref().filter(|s| !s.is_empty());
    let password = body.password.as_deref().filter(|s| !s.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::bad_request(
            "Missing required fields: username, password",
            ErrorCode::MissingRequiredField,
        ));
    };

    let users = state.users.all().await?;
    let user = users
        .iter()
        .find(|u| u.username == username)
        .filter(|u| {
            u.password_hash
                .as_deref()
                .is_some_and(|hash| auth::verify_password(password, hash))
        });

    let Some(user) = user else {
        warn!("Failed login for '{}'", username);
        return Err(ApiError::bad_request("Invalid credentials", ErrorCode::ValidationError));
    };

    info!("User '{}' logged in", user.username);
    Ok(ApiResponse::success(AuthSession::issue(user, &state)?).message("Login successful"))
}

/// POST /api/auth/register - create an operator account and sign it in
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let mut v = Validator::new();
    let username = v.require_text("username", &body.username, "Username is required");
    if let Some(name) = username {
        v.check("username", name.chars().count() >= 2, "Username must be at least 2 characters");
    }
    let email = v.require_text("email", &body.email, "Email is required");
    v.email("email", email);
    let password = body.password.as_deref().filter(|p| !p.is_empty());
    if v.check("password", password.is_some(), "Password is required") {
        v.check(
            "password",
            password.is_some_and(|p| p.chars().count() >= 8),
            "Password must be at least 8 characters",
        );
    }

    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(v.into_error());
    };
    v.finish()?;

    let user = User {
        id: new_id("user"),
        username: username.to_string(),
        email: email.to_string(),
        role: Role::Operator,
        password_hash: Some(auth::hash_password(password)?),
        created_at: Utc::now(),
        updated_at: None,
    };
    let user = state.users.insert(user).await?;

    info!("Registered user '{}'", user.username);
    Ok(ApiResponse::created(AuthSession::issue(&user, &state)?).message("Registration successful"))
}

/// `token` cookie carrying a freshly issued JWT; `Secure` outside development
fn session_cookie(token: &str, security: &SecurityConfig, environment: Environment) -> String {
    let mut cookie = format!(
        "token={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token,
        security.jwt_expiry_hours.min(MAX_JWT_EXPIRY_HOURS) * 3600
    );
    if environment != Environment::Development {
        cookie.push_str("; Secure");
    }
    cookie
}

/// POST /api/auth/signup - create an operator for a new email and set the token cookie.
///
/// An email that already belongs to an account is a 409; existing users sign in
/// through `/api/auth/login`.
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    let email = v.require_text("email", &body.email, "Email is required");
    v.email("email", email);
    let Some(email) = email else {
        return Err(v.into_error());
    };
    v.finish()?;

    let user = User {
        id: new_id("user"),
        username: email.to_string(),
        email: email.to_string(),
        role: Role::Operator,
        password_hash: None,
        created_at: Utc::now(),
        updated_at: None,
    };
    let user = state.users.insert(user).await.map_err(|e| {
        warn!("Signup refused for '{}': {}", email, e);
        ApiError::from(e)
    })?;
    info!("Signed up user '{}'", user.email);

    let token = auth::issue_token(&user, &state.config.security)?;
    let cookie = session_cookie(&token, &state.config.security, state.config.environment);

    let response = ApiResponse::success(UserProfile::from(user)).message("Signup successful");
    Ok(([(SET_COOKIE, cookie)], response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn cookie_is_secure_outside_development() {
        let config = AppConfig::production();
        let cookie = session_cookie("abc", &config.security, Environment::Production);
        assert!(cookie.starts_with("token=abc; Path=/; HttpOnly; SameSite=Lax"));
        assert!(cookie.ends_with("; Secure"));

        let dev = AppConfig::development();
        let cookie = session_cookie("abc", &dev.security, Environment::Development);
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=86400"));
    }
}
