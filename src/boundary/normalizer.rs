//! Boundary exception normalizer
//!
//! Turns any failure that reaches the request boundary into a status code
//! and an [`ErrorEnvelope`], logging it at ERROR first.

use super::envelope::{ErrorEnvelope, RequestContext};
use super::failure::{Failure, FailureKind, IntoFailure};
use crate::core::{timestamp, ContextValue, Environment, Logger, LoggingConfig};
use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Message used when the failure carries no usable message
pub const GENERIC_MESSAGE: &str = "Unexpected error occurred.";

/// Status and JSON body, written back verbatim by the HTTP layer
pub type BoundaryResponse = (u16, String);

pub struct ExceptionNormalizer {
    logger: Arc<Logger>,
    environment: Environment,
}

impl ExceptionNormalizer {
    pub fn new(logger: Arc<Logger>, environment: Environment) -> Self {
        Self {
            logger,
            environment,
        }
    }

    pub fn from_config(logger: Arc<Logger>, config: &LoggingConfig) -> Self {
        Self::new(logger, config.environment)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn normalize(
        &self,
        failure: impl IntoFailure,
        request: &RequestContext,
    ) -> (u16, ErrorEnvelope) {
        let failure = failure.into_failure();
        let status = failure.status();
        let message = message_for(&failure);

        let envelope = ErrorEnvelope {
            status_code: status,
            timestamp: timestamp::iso8601(&Utc::now()),
            path: request.url().map(str::to_string),
            message,
            request_id: request.request_id().map(str::to_string),
            stack: if self.environment.is_production() {
                None
            } else {
                failure.stack.clone()
            },
        };

        self.logger
            .error_with(envelope.message.clone(), log_context(&failure, &envelope));

        (status, envelope)
    }

    /// Normalize and encode the envelope as the response body
    pub fn respond(&self, failure: impl IntoFailure, request: &RequestContext) -> BoundaryResponse {
        let (status, envelope) = self.normalize(failure, request);
        let body = serde_json::to_string(&envelope).unwrap_or_else(|e| {
            serde_json::json!({ "statusCode": status, "message": GENERIC_MESSAGE, "error": e.to_string() })
                .to_string()
        });
        (status, body)
    }

    /// Run a request handler, converting an `Err` or a panic into a
    /// response.
    pub fn guard<T, E, F>(&self, request: &RequestContext, handler: F) -> Result<T, BoundaryResponse>
    where
        E: IntoFailure,
        F: FnOnce() -> Result<T, E>,
    {
        match panic::catch_unwind(AssertUnwindSafe(handler)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.respond(e, request)),
            Err(payload) => Err(self.respond(Failure::from_panic(payload), request)),
        }
    }
}

impl std::fmt::Debug for ExceptionNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionNormalizer")
            .field("logger", &self.logger.name())
            .field("environment", &self.environment)
            .finish()
    }
}

fn message_for(failure: &Failure) -> String {
    let message = match (failure.kind, failure.message.as_deref()) {
        (FailureKind::Opaque, _) | (_, None) => return GENERIC_MESSAGE.to_string(),
        (_, Some(message)) => message,
    };

    match (failure.kind, &failure.detail) {
        (FailureKind::BadRequest, Some(detail)) => format!("{}: {}", message, detail),
        _ => message.to_string(),
    }
}

fn log_context(failure: &Failure, envelope: &ErrorEnvelope) -> ContextValue {
    let mut context = ContextValue::map()
        .with("statusCode", u32::from(envelope.status_code))
        .with("path", envelope.path.clone())
        .with("requestId", envelope.request_id.clone());
    if let Some(ref detail) = failure.detail {
        context = context.with("detail", ContextValue::from(detail.clone()));
    }
    if let Some(ref stack) = failure.stack {
        context = context.with("stack", stack.as_str());
    }
    context
}
