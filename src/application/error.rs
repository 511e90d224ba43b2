use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    application::{
        authoring::AuthoringError, blog::BlogError, repos::RepoError,
        syndication::SyndicationError,
    },
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic chain attached to error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": self.status.as_u16(),
            "error": self.public_message,
        }));
        let mut response = (self.status, body).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Map a repository failure onto a status code; store errors are never masked.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::NotFound => HttpError::from_error(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            &err,
        ),
        RepoError::Duplicate { .. } => {
            HttpError::from_error(source, StatusCode::CONFLICT, "Duplicate record", &err)
        }
        RepoError::InvalidInput { .. } => {
            HttpError::from_error(source, StatusCode::BAD_REQUEST, "Invalid input", &err)
        }
        RepoError::Timeout => HttpError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            &err,
        ),
        RepoError::Persistence(_) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            &err,
        ),
    }
}

impl From<BlogError> for HttpError {
    fn from(error: BlogError) -> Self {
        const SOURCE: &str = "infra::http::blog_error_to_http_error";
        match error {
            BlogError::NotFound => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Article not found",
                "No visible post matches the requested slug",
            ),
            BlogError::InvalidPeriod(period) => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Unknown archive period",
                format!("Archive period `{period}` is not a valid date"),
            ),
            BlogError::Repo(err) => repo_error_to_http(SOURCE, err),
        }
    }
}

impl From<SyndicationError> for HttpError {
    fn from(error: SyndicationError) -> Self {
        const SOURCE: &str = "infra::http::syndication_error_to_http_error";
        match error {
            SyndicationError::UnknownCategory(slug) => HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Unknown category",
                format!("No category uses the slug `{slug}`"),
            ),
            SyndicationError::Repo(err) => repo_error_to_http(SOURCE, err),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
