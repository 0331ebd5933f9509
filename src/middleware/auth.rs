use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::models::Role;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_USERNAME_HEADER: &str = "x-user-username";

/// Routes reachable without a token
const PUBLIC_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/register", "/api/auth/signup"];

/// Routes restricted to specific roles; first match wins
const ROUTE_PERMISSIONS: &[(&str, &[Role])] = &[
    ("/api/admin", &[Role::Admin]),
    ("/api/users", &[Role::Admin, Role::Operator]),
    ("/api/stations", &[Role::Admin, Role::Operator]),
    ("/api/readings", &[Role::Admin, Role::Operator]),
    ("/api/alerts", &[Role::Admin, Role::Operator]),
];

/// Authenticated user context extracted from the bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// What a request path requires before it reaches a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

/// `route` matches itself and anything below it, but not `/api/usersfoo`
fn matches_route(path: &str, route: &str) -> bool {
    match path.strip_prefix(route) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn access_for(path: &str) -> Access {
    if !matches_route(path, "/api") {
        return Access::Public;
    }
    if PUBLIC_ROUTES.iter().any(|route| matches_route(path, route)) {
        return Access::Public;
    }
    ROUTE_PERMISSIONS
        .iter()
        .find(|(route, _)| matches_route(path, route))
        .map_or(Access::Authenticated, |&(_, roles)| Access::Roles(roles))
}

/// Identity headers are only ever set by this middleware
fn strip_identity_headers(headers: &mut HeaderMap) {
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_ROLE_HEADER);
    headers.remove(USER_USERNAME_HEADER);
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::unauthorized("Invalid token"))
}

/// Authorization middleware for `/api/*`.
///
/// Resolves the route's access rule, verifies the bearer token and role, then
/// hands the user to handlers as `x-user-*` headers and an [`AuthUser`] extension.
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    strip_identity_headers(request.headers_mut());

    let path = request.uri().path().to_string();
    let allowed_roles = match access_for(&path) {
        Access::Public => return Ok(next.run(request).await),
        Access::Authenticated => None,
        Access::Roles(roles) => Some(roles),
    };

    let claims = {
        let token = auth::bearer_token(request.headers()).map_err(|e| {
            warn!("Rejected {}: {}", path, e);
            ApiError::unauthorized("Authentication required")
        })?;

        auth::verify_token(token, &state.config.security).map_err(|e| {
            warn!("Rejected {}: {}", path, e);
            ApiError::from(e)
        })?
    };

    if let Some(roles) = allowed_roles {
        if !roles.contains(&claims.role) {
            warn!("Denied {} to {} (role {})", path, claims.username, claims.role);
            return Err(ApiError::forbidden("Access denied"));
        }
    }

    debug!("Granted {} to {} (role {})", path, claims.username, claims.role);

    let headers = request.headers_mut();
    headers.insert(USER_ID_HEADER, header_value(&claims.user_id)?);
    headers.insert(USER_ROLE_HEADER, header_value(claims.role.as_str())?);
    headers.insert(USER_USERNAME_HEADER, header_value(&claims.username)?);

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}
