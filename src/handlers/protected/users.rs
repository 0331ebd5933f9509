// handlers/protected/users.rs - /api/users and /api/users/:id/orders
use axum::extract::{Path, Query, State};
use axum::Extension;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use super::orders;
use crate::api::{filter, paginate, PageRequest, ValidJson, Validator};
use crate::auth;
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{new_id, Order, OrderStatus, Role, User, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub role: Option<String>,
}

/// Body for both create and partial update
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserOrderQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderRequest {
    pub items: Option<Vec<String>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
}

fn not_found() -> ApiError {
    ApiError::not_found_with("User not found", ErrorCode::UserNotFound)
}

/// Only admins may grant the admin role, change a role, or touch an admin account
fn ensure_may_manage(caller: &AuthUser, target: Option<&User>, role: Option<Role>) -> Result<(), ApiError> {
    if caller.role == Role::Admin {
        return Ok(());
    }
    let grants_admin = role == Some(Role::Admin);
    let changes_role = matches!((target, role), (Some(user), Some(role)) if user.role != role);
    let targets_admin = target.is_some_and(|user| user.role == Role::Admin);

    if grants_admin || changes_role || targets_admin {
        warn!("Denied user management by {} (role {})", caller.username, caller.role);
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(())
}

fn check_username(v: &mut Validator, username: Option<&str>) {
    if let Some(name) = username {
        v.check("username", name.chars().count() >= 2, "Username must be at least 2 characters");
    }
}

fn parse_role(v: &mut Validator, raw: &str) -> Option<Role> {
    let role = raw.parse::<Role>().ok();
    v.check("role", role.is_some(), format!("Role must be one of: {}", Role::expected()));
    role
}

fn check_password(v: &mut Validator, password: Option<&str>) {
    if let Some(password) = password {
        v.check("password", password.chars().count() >= 8, "Password must be at least 8 characters");
    }
}

/// GET /api/users - list users, optionally filtered by role
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<UserProfile>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let role: Option<Role> = filter::enum_param("role", query.role.as_deref(), ErrorCode::InvalidInputFormat)?;

    let users: Vec<UserProfile> = state
        .users
        .all()
        .await?
        .iter()
        .filter(|u| role.map_or(true, |r| u.role == r))
        .map(UserProfile::from)
        .collect();

    Ok(ApiResponse::page(paginate(users, page)).message("Users retrieved successfully"))
}

/// POST /api/users - create a user
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidJson(body): ValidJson<UserRequest>,
) -> ApiResult<UserProfile> {
    let mut v = Validator::new();
    let username = v.require_text("username", &body.username, "Username is required");
    check_username(&mut v, username);
    let email = v.require_text("email", &body.email, "Email is required");
    v.email("email", email);
    let role = v
        .require_text("role", &body.role, "Role is required")
        .and_then(|raw| parse_role(&mut v, raw));
    check_password(&mut v, body.password.as_deref());

    let (Some(username), Some(email), Some(role)) = (username, email, role) else {
        return Err(v.into_error());
    };
    v.finish()?;
    ensure_may_manage(&caller, None, Some(role))?;

    let password_hash = body.password.as_deref().map(auth::hash_password).transpose()?;
    let user = User {
        id: new_id("user"),
        username: username.to_string(),
        email: email.to_string(),
        role,
        password_hash,
        created_at: Utc::now(),
        updated_at: None,
    };
    let user = state.users.insert(user).await?;

    info!("Created user '{}' ({})", user.username, user.role);
    Ok(ApiResponse::created(UserProfile::from(user)).message("User created successfully"))
}

/// GET /api/users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserProfile> {
    let user = state.users.find(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(UserProfile::from(user)).message("User retrieved successfully"))
}

/// PUT /api/users/:id - partial update; only supplied fields change.
/// Username and email uniqueness is enforced by the store.
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UserRequest>,
) -> ApiResult<UserProfile> {
    let mut user = state.users.find(&id).await?.ok_or_else(not_found)?;

    let mut v = Validator::new();
    let username = body.username.as_deref().map(str::trim);
    let email = body.email.as_deref().map(str::trim);
    check_username(&mut v, username);
    v.email("email", email);
    let role = filter::non_empty(body.role.as_deref()).and_then(|raw| parse_role(&mut v, raw));
    check_password(&mut v, body.password.as_deref());
    v.finish()?;
    ensure_may_manage(&caller, Some(&user), role)?;

    if let Some(username) = username {
        user.username = username.to_string();
    }
    if let Some(email) = email {
        user.email = email.to_string();
    }
    if let Some(role) = role {
        user.role = role;
    }
    if let Some(password) = body.password.as_deref() {
        user.password_hash = Some(auth::hash_password(password)?);
    }
    user.updated_at = Some(Utc::now());

    let user = state.users.replace(user).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(UserProfile::from(user)).message("User updated successfully"))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<UserProfile> {
    let target = state.users.find(&id).await?.ok_or_else(not_found)?;
    ensure_may_manage(&caller, Some(&target), None)?;

    let user = state.users.remove(&id).await?.ok_or_else(not_found)?;
    info!("Deleted user '{}'", user.username);
    Ok(ApiResponse::success(UserProfile::from(user)).message("User deleted successfully"))
}

/// GET /api/users/:id/orders - orders placed by a numeric user id
pub async fn list_orders(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UserOrderQuery>,
) -> ApiResult<Vec<Order>> {
    let user_id = filter::path_id(&id, "Invalid user ID", ErrorCode::InvalidUserId)?;
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status: Option<OrderStatus> =
        filter::enum_param("status", query.status.as_deref(), ErrorCode::InvalidStatus)?;

    let orders: Vec<Order> = state
        .orders
        .all()
        .await?
        .into_iter()
        .filter(|o| o.user_id == user_id)
        .filter(|o| status.map_or(true, |s| o.status == s))
        .collect();

    Ok(ApiResponse::page(paginate(orders, page)).message("User orders retrieved successfully"))
}

/// POST /api/users/:id/orders - place a pending order for the user
pub async fn create_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UserOrderRequest>,
) -> ApiResult<Order> {
    let user_id = filter::path_id(&id, "Invalid user ID", ErrorCode::InvalidUserId)?;
    let items = orders::validate_items(body.items)?;
    let total_amount = orders::validate_amount(body.total_amount)?;

    let order_id = state.orders.next_id();
    let order = Order {
        id: order_id,
        user_id,
        order_number: Order::number_for(order_id),
        total_amount,
        status: OrderStatus::Pending,
        items,
        order_date: Utc::now(),
        delivered_date: None,
    };
    let order = state.orders.insert(order).await?;

    info!("Created order {} for user {}", order.order_number, user_id);
    Ok(ApiResponse::created(order).message("Order created successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> AuthUser {
        AuthUser {
            id: "user-9".into(),
            username: "caller".into(),
            email: "caller@example.com".into(),
            role,
        }
    }

    fn user(role: Role) -> User {
        User {
            id: "user-3".into(),
            username: "field-tech".into(),
            email: "tech@example.com".into(),
            role,
            password_hash: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn operators_manage_operators_only() {
        let operator = caller(Role::Operator);
        assert!(ensure_may_manage(&operator, None, Some(Role::Operator)).is_ok());
        assert!(ensure_may_manage(&operator, Some(&user(Role::Operator)), None).is_ok());
        assert!(ensure_may_manage(&operator, Some(&user(Role::Operator)), Some(Role::Operator)).is_ok());

        let denied = [
            ensure_may_manage(&operator, None, Some(Role::Admin)),
            ensure_may_manage(&operator, Some(&user(Role::Operator)), Some(Role::Admin)),
            ensure_may_manage(&operator, Some(&user(Role::Admin)), Some(Role::Operator)),
            ensure_may_manage(&operator, Some(&user(Role::Admin)), None),
        ];
        for result in denied {
            assert_eq!(result.unwrap_err().code(), ErrorCode::Forbidden);
        }
    }

    #[test]
    fn admins_manage_everyone() {
        let admin = caller(Role::Admin);
        assert!(ensure_may_manage(&admin, None, Some(Role::Admin)).is_ok());
        assert!(ensure_may_manage(&admin, Some(&user(Role::Admin)), Some(Role::Operator)).is_ok());
    }
}
