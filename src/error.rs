use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Unique constraint on `bookings.booking_ref`, named in the schema created by
/// `PgStore`.
pub const BOOKING_REF_CONSTRAINT: &str = "bookings_booking_ref_key";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    CatalogUnavailable,
    PersistenceError,
    DuplicateReference,
    InvalidRequest,
    InvalidDraft,
    NotFound,
    InvalidTransition,
    Unauthorized,
}

impl ErrorKind {
    pub fn code(&self) -> i32 {
        match self {
            Self::Configuration => 1,
            Self::CatalogUnavailable => 2,
            Self::PersistenceError => 3,
            Self::DuplicateReference => 4,
            Self::InvalidRequest => 100,
            Self::InvalidDraft => 101,
            Self::NotFound => 102,
            Self::InvalidTransition => 103,
            Self::Unauthorized => 104,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Infrastructure failures that are safe to retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::CatalogUnavailable | ErrorKind::PersistenceError
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_invalid_transition(&self) -> bool {
        self.kind == ErrorKind::InvalidTransition
    }

    pub fn is_duplicate_reference(&self) -> bool {
        self.kind == ErrorKind::DuplicateReference
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        configuration_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if is_reference_clash(db_err.code().as_deref(), db_err.constraint()) {
                return duplicate_reference_error();
            }
        }

        persistence_error(err)
    }
}

/// Only a clash on the booking reference is worth retrying with a new one;
/// any other unique violation is a plain store failure.
fn is_reference_clash(code: Option<&str>, constraint: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION) && constraint == Some(BOOKING_REF_CONSTRAINT)
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        configuration_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::Configuration | ErrorKind::DuplicateReference => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorKind::CatalogUnavailable | ErrorKind::PersistenceError => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorKind::InvalidRequest | ErrorKind::InvalidDraft => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidTransition => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        };

        let error_message = match self.code() {
            1..=99 => "Internal Server Error",
            _ => self.message.as_str(),
        };

        let body = Json(json!({
            "code": self.code(),
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_request_error(message: impl Into<String>) -> Error {
    Error {
        kind: ErrorKind::InvalidRequest,
        message: message.into(),
    }
}

pub fn invalid_draft_error(message: impl Into<String>) -> Error {
    Error {
        kind: ErrorKind::InvalidDraft,
        message: message.into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        kind: ErrorKind::NotFound,
        message: "booking not found".into(),
    }
}

pub fn vehicle_not_found_error() -> Error {
    Error {
        kind: ErrorKind::NotFound,
        message: "vehicle not found".into(),
    }
}

pub fn invalid_transition_error(message: impl Into<String>) -> Error {
    Error {
        kind: ErrorKind::InvalidTransition,
        message: message.into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        kind: ErrorKind::Unauthorized,
        message: "unauthorized".into(),
    }
}

pub fn configuration_error<T: Debug>(err: T) -> Error {
    Error {
        kind: ErrorKind::Configuration,
        message: format!("configuration error: {:?}", err),
    }
}

pub fn catalog_unavailable_error<T: Debug>(err: T) -> Error {
    Error {
        kind: ErrorKind::CatalogUnavailable,
        message: format!("vehicle catalog unavailable: {:?}", err),
    }
}

pub fn persistence_error<T: Debug>(err: T) -> Error {
    Error {
        kind: ErrorKind::PersistenceError,
        message: format!("booking store error: {:?}", err),
    }
}

pub fn duplicate_reference_error() -> Error {
    Error {
        kind: ErrorKind::DuplicateReference,
        message: "booking reference already exists".into(),
    }
}
