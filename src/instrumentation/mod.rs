//! Method instrumentation: entry logging and trace segments

pub mod tracer;
pub mod wrappers;

pub use tracer::{SegmentGuard, SpanTracer, Tracer, TracingIntegration};
pub use wrappers::Instrumented;
