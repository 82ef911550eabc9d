use super::{
    auth_dto::{AuthResponse, GoogleCallbackQuery, GoogleLoginQuery, LoginRequest},
    oauth::{state_with_tag, tag_from_state, GoogleUserInfo, GOOGLE_USERINFO_URL},
};
use crate::{
    common::JsonResponse,
    error::{AppError, Result},
    middleware::ValidJson,
    organization::organization_models::normalize_tag,
    state::AppState,
    user::user_models::User,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, Scope, TokenResponse};

async fn auth_response(state: &AppState, user: User, access_token: String) -> Result<Json<JsonResponse<AuthResponse>>> {
    let profile = state
        .user_repository
        .find_profile(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile does not exist".to_string()))?;

    Ok(Json(JsonResponse::success(
        "Login successful",
        AuthResponse {
            access_token,
            user: profile,
        },
    )))
}

/// Login with organization tag, email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Email or password is incorrect")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<JsonResponse<AuthResponse>>> {
    let (user, access_token) = state
        .auth_service
        .login(&payload.organization_tag, payload.email.trim(), &payload.password)
        .await?;

    auth_response(&state, user, access_token).await
}

/// Start the Google OAuth flow for one organization
#[utoipa::path(
    get,
    path = "/auth/google",
    params(GoogleLoginQuery),
    responses((status = 303, description = "Redirect to Google OAuth")),
    tag = "auth"
)]
pub async fn google_login(
    State(state): State<AppState>,
    Query(params): Query<GoogleLoginQuery>,
) -> Result<impl IntoResponse> {
    let tag = normalize_tag(&params.organization_tag)
        .ok_or_else(|| AppError::BadRequest("Invalid params".to_string()))?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (auth_url, csrf_token) = state
        .oauth_client
        .authorize_url(|| CsrfToken::new(state_with_tag(&tag, CsrfToken::new_random().secret())))
        .add_scope(Scope::new("email".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    state
        .pending_logins
        .insert(csrf_token.secret().clone(), pkce_verifier);

    Ok(Redirect::to(auth_url.as_str()))
}

/// Handle the Google OAuth callback
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    params(GoogleCallbackQuery),
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Your account is not registered")
    ),
    tag = "auth"
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<GoogleCallbackQuery>,
) -> Result<Json<JsonResponse<AuthResponse>>> {
    let verifier = state
        .pending_logins
        .take(&params.state)
        .ok_or_else(|| AppError::Unauthorized("Login session expired. Please try again".to_string()))?;
    let tag = tag_from_state(&params.state)
        .ok_or_else(|| AppError::BadRequest("Invalid params".to_string()))?
        .to_string();

    let token_result = state
        .oauth_client
        .exchange_code(AuthorizationCode::new(params.code))
        .set_pkce_verifier(verifier)
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .map_err(|e| AppError::Unauthorized(format!("Failed to exchange code: {}", e)))?;

    let user_info: GoogleUserInfo = reqwest::Client::new()
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(token_result.access_token().secret())
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to get user info: {}", e)))?
        .json()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to parse user info: {}", e)))?;

    tracing::debug!(email = %user_info.email, name = ?user_info.name, picture = ?user_info.picture, "Google user resolved");

    let (user, access_token) = state.auth_service.login_with_google(&tag, &user_info).await?;

    auth_response(&state, user, access_token).await
}
