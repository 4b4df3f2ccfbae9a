use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod create_user;
pub mod login;
pub mod read_own_items;
pub mod read_users_me;

pub const INVALID_LOGIN_MESSAGE: &str = "Incorrect username or password";
pub const INVALID_TOKEN_MESSAGE: &str = "Could not validate credentials";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    /// Rendered with a `WWW-Authenticate: Bearer` challenge.
    Unauthorized(String),
    ServiceUnavailable(String),
}

impl ApiError {
    /// Map a failed login onto the single public rejection.
    pub fn from_login_error(err: auth::AuthError) -> Self {
        Self::from_auth_error(err, INVALID_LOGIN_MESSAGE)
    }

    /// Map a failed bearer-token resolution onto the single public rejection.
    pub fn from_token_error(err: auth::AuthError) -> Self {
        Self::from_auth_error(err, INVALID_TOKEN_MESSAGE)
    }

    fn from_auth_error(err: auth::AuthError, unauthorized_message: &str) -> Self {
        if err.is_unauthorized() {
            ApiError::Unauthorized(unauthorized_message.to_string())
        } else if err.is_transient() {
            tracing::error!(error = %err, "Authentication backend unavailable");
            ApiError::ServiceUnavailable("Authentication backend unavailable".to_string())
        } else {
            tracing::error!(error = %err, "Authentication failed unexpectedly");
            ApiError::InternalServerError("Internal server error".to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => {
                let status = StatusCode::UNAUTHORIZED;
                return (
                    status,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(ApiResponseBody::new_error(status, msg)),
                )
                    .into_response();
            }
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFoundByUsername(_) => ApiError::NotFound(err.to_string()),
            UserError::UsernameAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidUserId(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::Password(_) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "User operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_rejections_collapse() {
        for err in [
            auth::AuthError::InvalidCredentials,
            auth::AuthError::AccountDisabled,
        ] {
            assert_eq!(
                ApiError::from_login_error(err),
                ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string())
            );
        }
    }

    #[test]
    fn test_token_rejections_collapse() {
        for err in [
            auth::AuthError::TokenExpired,
            auth::AuthError::TokenInvalid(auth::TokenError::Forged),
            auth::AuthError::MissingSubjectClaim,
            auth::AuthError::InvalidCredentials,
            auth::AuthError::AccountDisabled,
        ] {
            assert_eq!(
                ApiError::from_token_error(err),
                ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
            );
        }
    }

    #[test]
    fn test_store_unavailable_is_not_unauthorized() {
        let err = auth::AuthError::StoreUnavailable("connection refused".to_string());
        assert!(matches!(
            ApiError::from_token_error(err),
            ApiError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_unauthorized_response_has_bearer_challenge() {
        let response = ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_user_error_mapping() {
        assert!(matches!(
            ApiError::from(UserError::UsernameAlreadyExists("johndoe".to_string())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::NotFoundByUsername("ghost".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::DatabaseError("disk full".to_string())),
            ApiError::InternalServerError(msg) if !msg.contains("disk full")
        ));
    }
}
