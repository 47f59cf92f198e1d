use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use stablepay_engine::traits::{MerchantApiError, PaymentGatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer credential was supplied.")]
    MissingCredential,
    #[error("The presented API key is malformed.")]
    MalformedApiKey,
    #[error("The presented API key is not valid.")]
    InvalidApiKey,
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::OrderNotFound(_) |
            PaymentGatewayError::MemoNotFound(_) |
            PaymentGatewayError::PaymentLinkNotFound(_) => Self::NoRecordFound(e.to_string()),
            PaymentGatewayError::MerchantNotConfigured(_) => Self::InvalidRequestBody(e.to_string()),
            PaymentGatewayError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<MerchantApiError> for ServerError {
    fn from(e: MerchantApiError) -> Self {
        match e {
            MerchantApiError::MalformedApiKey => Self::AuthenticationError(AuthError::MalformedApiKey),
            MerchantApiError::InvalidApiKey => Self::AuthenticationError(AuthError::InvalidApiKey),
            MerchantApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            e => Self::BackendError(e.to_string()),
        }
    }
}
