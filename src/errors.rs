use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// Machine-readable error codes returned in API error bodies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    ExceededLimit,
    NotFound,
    Conflict,
    UnprocessableEntity,
    RateLimitExceeded,
    InternalServerError,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden | ErrorCode::ExceededLimit => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Anchor used in `doc_url`, e.g. `exceeded-limit`
    pub fn doc_anchor(&self) -> String {
        self.as_ref().replace('_', "-")
    }
}

#[derive(Debug, Clone)]
pub enum LinkhubError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    DateParse(String),
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    ExceededLimit(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    RateLimited(String),
}

impl LinkhubError {
    pub fn code(&self) -> &'static str {
        match self {
            LinkhubError::DatabaseConfig(_) => "E001",
            LinkhubError::DatabaseConnection(_) => "E002",
            LinkhubError::DatabaseOperation(_) => "E003",
            LinkhubError::FileOperation(_) => "E004",
            LinkhubError::Serialization(_) => "E005",
            LinkhubError::DateParse(_) => "E006",
            LinkhubError::Validation(_) => "E007",
            LinkhubError::Unauthorized(_) => "E008",
            LinkhubError::Forbidden(_) => "E009",
            LinkhubError::ExceededLimit(_) => "E010",
            LinkhubError::NotFound(_) => "E011",
            LinkhubError::Conflict(_) => "E012",
            LinkhubError::Unprocessable(_) => "E013",
            LinkhubError::RateLimited(_) => "E014",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LinkhubError::DatabaseConfig(_) => "Database Configuration Error",
            LinkhubError::DatabaseConnection(_) => "Database Connection Error",
            LinkhubError::DatabaseOperation(_) => "Database Operation Error",
            LinkhubError::FileOperation(_) => "File Operation Error",
            LinkhubError::Serialization(_) => "Serialization Error",
            LinkhubError::DateParse(_) => "Date Parse Error",
            LinkhubError::Validation(_) => "Validation Error",
            LinkhubError::Unauthorized(_) => "Unauthorized",
            LinkhubError::Forbidden(_) => "Forbidden",
            LinkhubError::ExceededLimit(_) => "Limit Exceeded",
            LinkhubError::NotFound(_) => "Resource Not Found",
            LinkhubError::Conflict(_) => "Conflict",
            LinkhubError::Unprocessable(_) => "Unprocessable Entity",
            LinkhubError::RateLimited(_) => "Rate Limited",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkhubError::DatabaseConfig(msg)
            | LinkhubError::DatabaseConnection(msg)
            | LinkhubError::DatabaseOperation(msg)
            | LinkhubError::FileOperation(msg)
            | LinkhubError::Serialization(msg)
            | LinkhubError::DateParse(msg)
            | LinkhubError::Validation(msg)
            | LinkhubError::Unauthorized(msg)
            | LinkhubError::Forbidden(msg)
            | LinkhubError::ExceededLimit(msg)
            | LinkhubError::NotFound(msg)
            | LinkhubError::Conflict(msg)
            | LinkhubError::Unprocessable(msg)
            | LinkhubError::RateLimited(msg) => msg,
        }
    }

    /// API error code for this error
    pub fn api_code(&self) -> ErrorCode {
        match self {
            LinkhubError::Validation(_) | LinkhubError::DateParse(_) => ErrorCode::BadRequest,
            LinkhubError::Unauthorized(_) => ErrorCode::Unauthorized,
            LinkhubError::Forbidden(_) => ErrorCode::Forbidden,
            LinkhubError::ExceededLimit(_) => ErrorCode::ExceededLimit,
            LinkhubError::NotFound(_) => ErrorCode::NotFound,
            LinkhubError::Conflict(_) => ErrorCode::Conflict,
            LinkhubError::Unprocessable(_) => ErrorCode::UnprocessableEntity,
            LinkhubError::RateLimited(_) => ErrorCode::RateLimitExceeded,
            LinkhubError::DatabaseConfig(_)
            | LinkhubError::DatabaseConnection(_)
            | LinkhubError::DatabaseOperation(_)
            | LinkhubError::FileOperation(_)
            | LinkhubError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }

    /// Colored single-line output for the binary
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkhubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkhubError {}

impl LinkhubError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Forbidden(msg.into())
    }

    pub fn exceeded_limit<T: Into<String>>(msg: T) -> Self {
        LinkhubError::ExceededLimit(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkhubError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Conflict(msg.into())
    }

    pub fn unprocessable<T: Into<String>>(msg: T) -> Self {
        LinkhubError::Unprocessable(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T) -> Self {
        LinkhubError::RateLimited(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkhubError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkhubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkhubError {
    fn from(err: std::io::Error) -> Self {
        LinkhubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkhubError {
    fn from(err: serde_json::Error) -> Self {
        LinkhubError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for LinkhubError {
    fn from(err: csv::Error) -> Self {
        LinkhubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkhubError {
    fn from(err: chrono::ParseError) -> Self {
        LinkhubError::DateParse(err.to_string())
    }
}

/// Body of every API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub doc_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let base = crate::config::try_get_config()
            .map(|c| c.api.doc_url.clone())
            .unwrap_or_else(crate::config::default_doc_url);
        Self {
            error: ErrorBody {
                doc_url: format!("{}#{}", base, code.doc_anchor()),
                code,
                message: message.into(),
            },
        }
    }
}

impl ResponseError for LinkhubError {
    fn status_code(&self) -> StatusCode {
        self.api_code().http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.api_code();
        // Internal details stay in the logs
        let message = if code == ErrorCode::InternalServerError {
            tracing::error!("{}", self.format_simple());
            "An internal server error occurred.".to_string()
        } else {
            self.message().to_string()
        };
        HttpResponse::build(code.http_status())
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .json(ErrorEnvelope::new(code, message))
    }
}

pub type Result<T> = std::result::Result<T, LinkhubError>;
