use crate::{
    auth::verify_jwt,
    common::roles,
    error::{AppError, LOGIN_INVALID},
    state::AppState,
};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub user_id: i32,
    pub organization_id: i32,
    pub role_id: i32,
    pub email: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized(LOGIN_INVALID.to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized(LOGIN_INVALID.to_string()))?;

    let claims = verify_jwt(token, &state.config.jwt_secret)?;

    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized(LOGIN_INVALID.to_string()))?;

    req.extensions_mut().insert(CurrentUser {
        user_id,
        organization_id: claims.organization_id,
        role_id: claims.role_id,
        email: claims.email,
    });

    Ok(next.run(req).await)
}

// Extractor for the identity stored by `auth_middleware`
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized(LOGIN_INVALID.to_string()))
    }
}

pub fn require_general_manager(user: &CurrentUser) -> Result<(), AppError> {
    if roles::is_general_manager(user.role_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You dont have permission to do this action".to_string(),
        ))
    }
}
