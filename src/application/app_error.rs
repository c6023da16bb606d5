use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected request input. The message is returned to the caller verbatim.
    #[error("{0}")]
    InvalidInput(String),

    /// A paid checkout session without the metadata the checkout step is
    /// supposed to attach.
    #[error("Missing metadata in checkout session")]
    MissingMetadata,

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Unique violation on the checkout session id of a subscription.
    #[error("A subscription already exists for this checkout session")]
    DuplicateSession,

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::MissingMetadata => ErrorCode::MissingMetadata,
            AppError::PaymentProvider(_) => ErrorCode::PaymentProviderError,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DuplicateSession => ErrorCode::DuplicateSession,
            AppError::Timeout(_) => ErrorCode::Timeout,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    MissingMetadata,
    PaymentProviderError,
    DatabaseError,
    DuplicateSession,
    Timeout,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::MissingMetadata => "MISSING_METADATA",
            ErrorCode::PaymentProviderError => "PAYMENT_PROVIDER_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::DuplicateSession => "DUPLICATE_SESSION",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
