//! Auth handlers — session, two-factor, and password flows.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use corehr_core::error::AppError;

use crate::dto::request::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LogoutRequest,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TwoFactorVerifyRequest,
};
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, TokenResponse, TwoFactorSetupResponse,
    TwoFactorVerifyResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state.auth_service.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::ok(LoginResponse::from(&outcome))))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (user, tokens) = state
        .auth_service
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        user: UserResponse::from(&user),
        access_token: Some(tokens.access_token),
        refresh_token: Some(tokens.refresh_token),
        access_expires_at: Some(tokens.access_expires_at),
        refresh_expires_at: Some(tokens.refresh_expires_at),
        requires_two_factor: false,
    })))
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let pair = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(TokenResponse::from(&pair))))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state.auth_service.logout(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /auth/2fa/setup (authenticated)
pub async fn setup_two_factor(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<TwoFactorSetupResponse>>, ApiError> {
    let enrollment = state.two_factor.setup(auth.user_id).await?;

    Ok(Json(ApiResponse::ok(TwoFactorSetupResponse {
        secret: enrollment.secret,
        otpauth_url: enrollment.otpauth_url,
        qr_code: enrollment.qr_code,
    })))
}

/// POST /auth/2fa/verify
pub async fn verify_two_factor(
    State(state): State<AppState>,
    Json(req): Json<TwoFactorVerifyRequest>,
) -> Result<Json<ApiResponse<TwoFactorVerifyResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state
        .auth_service
        .verify_two_factor(req.user_id, &req.token)
        .await?;

    Ok(Json(ApiResponse::ok(TwoFactorVerifyResponse::from(
        &outcome,
    ))))
}

/// POST /auth/forgot-password
///
/// Always succeeds with a generic message, whether or not the account
/// exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state.recovery_service.forgot_password(&req.email).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "If the account exists, a password reset link has been sent",
    ))))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .recovery_service
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password reset successfully",
    ))))
}

/// POST /auth/change-password (authenticated)
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .recovery_service
        .change_password(auth.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// GET /auth/me (authenticated)
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .store
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}
