use axum::http::StatusCode;
use thiserror::Error;

use crate::models::{ExpenseId, ExpenseStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Failed to process password")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Expense #{0} not found")]
    NotFound(ExpenseId),
    #[error("Expense #{id} is already {status} and cannot be changed")]
    InvalidTransition { id: ExpenseId, status: ExpenseStatus },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("You are not allowed to perform this action")]
    Forbidden,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to issue session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Failure of a dispatched session command.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Please log in first")]
    NotAuthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ActionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::NotAuthenticated | ActionError::Auth(_) => StatusCode::UNAUTHORIZED,
            ActionError::Registration(RegistrationError::DuplicateEmail) => StatusCode::CONFLICT,
            ActionError::Registration(RegistrationError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::Registration(RegistrationError::PasswordHash(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::Ledger(LedgerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ActionError::Ledger(LedgerError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            ActionError::Authorization(_) => StatusCode::FORBIDDEN,
            ActionError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
