//! Request boundary: failure classification and safe error responses

pub mod envelope;
pub mod failure;
pub mod normalizer;

pub use envelope::{ErrorEnvelope, RequestContext, REQUEST_ID_HEADER};
pub use failure::{Failure, FailureKind, IntoFailure};
pub use normalizer::{BoundaryResponse, ExceptionNormalizer, GENERIC_MESSAGE};
