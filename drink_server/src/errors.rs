use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use drink_engine::DrinkApiError;
use log::*;
use thiserror::Error;

use crate::data_objects::ErrorResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request: {0}")]
    InvalidRequestBody(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Method not allowed. {0}")]
    MethodNotAllowed(String),
    #[error("The request could not be processed. {0}")]
    Unprocessable(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
}

impl ServerError {
    /// The `message` field of the failure envelope. Details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::AuthenticationError(e) => e.code(),
            Self::InvalidRequestBody(_) => "Bad request",
            Self::NoRecordFound(_) => "Not found",
            Self::MethodNotAllowed(_) => "Method not allowed",
            Self::Unprocessable(_) => "Unprocessable",
            _ => "Internal server error",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationError(e) => e.status_code(),
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        } else {
            debug!("💻️ {self}");
        }
        let body = ErrorResponse::new(status, self.public_message());
        HttpResponse::build(status).json(body)
    }
}

impl From<DrinkApiError> for ServerError {
    fn from(e: DrinkApiError) -> Self {
        match e {
            DrinkApiError::DuplicateTitle(_) => Self::Unprocessable(e.to_string()),
            DrinkApiError::InvalidDrink(_) => Self::InvalidRequestBody(e.to_string()),
            DrinkApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

/// Reasons a bearer token can be turned away. Each variant carries a status code and a short machine-readable code,
/// which is what clients see in the `message` field of the response.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,
    #[error("Authorization header must start with \"Bearer\".")]
    InvalidScheme,
    #[error("Token not found.")]
    TokenNotFound,
    #[error("Authorization header must be bearer token.")]
    MalformedHeader,
    #[error("Authorization malformed.")]
    MalformedToken,
    #[error("Unable to find the appropriate key.")]
    KeyNotFound,
    #[error("Token expired.")]
    TokenExpired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    #[error("Unable to parse authentication token. {0}")]
    UnparseableToken(String),
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    #[error("Permission not found. {0}")]
    PermissionDenied(String),
    #[error("The signing key set could not be retrieved. {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HeaderMissing => StatusCode::UNAUTHORIZED,
            Self::InvalidScheme => StatusCode::UNAUTHORIZED,
            Self::TokenNotFound => StatusCode::UNAUTHORIZED,
            Self::MalformedHeader => StatusCode::UNAUTHORIZED,
            Self::MalformedToken => StatusCode::UNAUTHORIZED,
            Self::KeyNotFound => StatusCode::BAD_REQUEST,
            Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidClaims => StatusCode::UNAUTHORIZED,
            Self::UnparseableToken(_) => StatusCode::BAD_REQUEST,
            Self::PermissionsMissing => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::UNAUTHORIZED,
            Self::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::InvalidScheme => "invalid_header",
            Self::TokenNotFound => "invalid_header",
            Self::MalformedHeader => "invalid_header",
            Self::MalformedToken => "invalid_header",
            Self::KeyNotFound => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims => "invalid_claims",
            Self::UnparseableToken(_) => "invalid_header",
            Self::PermissionsMissing => "invalid_claims",
            Self::PermissionDenied(_) => "unauthorized",
            Self::KeySetUnavailable(_) => "key_set_unavailable",
        }
    }
}
