//! Neutral failure shape consumed by the normalizer
//!
//! Framework and service errors are converted into a [`Failure`] at the
//! boundary through [`IntoFailure`]; the normalizer never inspects concrete
//! error types.

use crate::core::{panic_message, LoggerError};
use serde_json::Value;
use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Carries an explicit HTTP status
    Http(u16),
    /// Validation failure with structured detail
    BadRequest,
    /// Error with a message but no status
    Runtime,
    /// Anything that is not an error value
    Opaque,
}

#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: Option<String>,
    pub detail: Option<Value>,
    pub stack: Option<String>,
}

impl Failure {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: FailureKind::Http(status),
            stack: Some(capture_stack(&format!("HttpError {}: {}", status, message))),
            message: Some(message),
            detail: None,
        }
    }

    /// Validation failure; `detail` is merged into the response message
    pub fn bad_request(message: impl Into<String>, detail: Value) -> Self {
        let message = message.into();
        Self {
            kind: FailureKind::BadRequest,
            stack: Some(capture_stack(&format!("BadRequest: {}", message))),
            message: Some(message),
            detail: Some(detail),
        }
    }

    /// Runtime failure from any error; the stack lists the source chain
    /// followed by a backtrace of the conversion point.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut headline = format!("Error: {}", error);
        let mut source = error.source();
        while let Some(cause) = source {
            headline.push_str(&format!("\nCaused by: {}", cause));
            source = cause.source();
        }

        Self {
            kind: FailureKind::Runtime,
            message: Some(error.to_string()),
            detail: None,
            stack: Some(capture_stack(&headline)),
        }
    }

    /// A failure value that is not an error; only its description is kept
    /// for the log.
    pub fn opaque(description: impl Into<Value>) -> Self {
        Self {
            kind: FailureKind::Opaque,
            message: None,
            detail: Some(description.into()),
            stack: None,
        }
    }

    /// Convert a caught panic. String payloads become runtime failures,
    /// anything else is opaque.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if payload.is::<&str>() || payload.is::<String>() {
            let message = panic_message(payload.as_ref());
            Self {
                kind: FailureKind::Runtime,
                stack: Some(capture_stack(&format!("panic: {}", message))),
                message: Some(message),
                detail: None,
            }
        } else {
            Self::opaque("non-string panic payload")
        }
    }

    /// Status implied by the kind
    pub fn status(&self) -> u16 {
        match self.kind {
            FailureKind::Http(status) => status,
            FailureKind::BadRequest => 400,
            FailureKind::Runtime | FailureKind::Opaque => 500,
        }
    }
}

fn capture_stack(headline: &str) -> String {
    format!("{}\n{}", headline, Backtrace::force_capture())
}

/// Adapter from concrete error types to [`Failure`]
pub trait IntoFailure {
    fn into_failure(self) -> Failure;
}

impl IntoFailure for Failure {
    fn into_failure(self) -> Failure {
        self
    }
}

impl IntoFailure for LoggerError {
    fn into_failure(self) -> Failure {
        Failure::from_error(&self)
    }
}

impl IntoFailure for std::io::Error {
    fn into_failure(self) -> Failure {
        Failure::from_error(&self)
    }
}

impl IntoFailure for Box<dyn Error + Send + Sync> {
    fn into_failure(self) -> Failure {
        Failure::from_error(&*self)
    }
}
