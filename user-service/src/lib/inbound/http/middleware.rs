use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_TOKEN_MESSAGE;
use crate::inbound::http::router::AppState;

/// Extension type holding the identity resolved from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub auth::Identity);

/// Middleware that resolves the bearer token and adds the caller's identity
/// to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let identity = state
        .auth_service
        .resolve(token)
        .await
        .map_err(ApiError::from_token_error)?;

    tracing::debug!(username = %identity.username, "Request authenticated");
    req.extensions_mut().insert(CurrentUser(identity));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let rejected = || ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string());

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            rejected()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| rejected())?;

    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => {
            tracing::debug!("Malformed Authorization header");
            Err(rejected())
        }
    }
}
