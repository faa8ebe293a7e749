//! Method instrumentation
//!
//! [`Instrumented`] is held by a service next to its logger and wraps the
//! service's methods at call sites:
//!
//! ```
//! use safe_observability::prelude::*;
//! use std::sync::Arc;
//!
//! struct QuoteService {
//!     calls: Instrumented,
//! }
//!
//! impl QuoteService {
//!     fn last_price(&self, symbol: &str) -> f64 {
//!         self.calls.instrument("last_price", || if symbol == "ACME" { 42.0 } else { 0.0 })
//!     }
//! }
//!
//! let logger = Arc::new(Logger::builder("QuoteService").console_enabled(false).build());
//! let service = QuoteService {
//!     calls: Instrumented::new("QuoteService", logger, Arc::new(TracingIntegration::disabled())),
//! };
//! assert_eq!(service.last_price("ACME"), 42.0);
//! ```

use super::tracer::{in_segment, TracingIntegration};
use crate::core::Logger;
use std::future::Future;
use std::sync::Arc;

#[derive(Clone)]
pub struct Instrumented {
    type_name: Arc<str>,
    logger: Arc<Logger>,
    tracing: Arc<TracingIntegration>,
}

impl Instrumented {
    pub fn new(
        type_name: impl Into<String>,
        logger: Arc<Logger>,
        tracing: Arc<TracingIntegration>,
    ) -> Self {
        Self {
            type_name: Arc::from(type_name.into()),
            logger,
            tracing,
        }
    }

    /// Use the last path segment of `T`'s type name
    pub fn for_type<T: ?Sized>(logger: Arc<Logger>, tracing: Arc<TracingIntegration>) -> Self {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        Self::new(short, logger, tracing)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Name of the trace segment recorded for `method`
    pub fn segment_name(&self, method: &str) -> String {
        format!("{}_{}", self.type_name, method)
    }

    /// Log an INFO entry naming the method, then call `f`.
    ///
    /// The result is returned as is; when `f` produces a future, that future
    /// is handed back without being wrapped.
    pub fn log_entry<R>(&self, method: &str, f: impl FnOnce() -> R) -> R {
        self.logger
            .info(format!("Invoking {}.{}", self.type_name, method));
        f()
    }

    /// Run `f` inside the method's trace segment when tracing is active
    pub fn trace_segment<R>(&self, method: &str, f: impl FnOnce() -> R) -> R {
        if !self.tracing.is_active() {
            return f();
        }
        self.tracing.segment(&self.segment_name(method), f)
    }

    /// Async form of [`trace_segment`](Self::trace_segment).
    ///
    /// The segment starts now and ends when the returned future completes
    /// or is dropped.
    pub fn trace_segment_async<F>(&self, method: &str, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        self.tracing.segment_async(&self.segment_name(method), fut)
    }

    /// Entry logging, wrapped in a trace segment if a tracer was loaded
    pub fn instrument<R>(&self, method: &str, f: impl FnOnce() -> R) -> R {
        if self.tracing.is_loaded() {
            self.trace_segment(method, || self.log_entry(method, f))
        } else {
            self.log_entry(method, f)
        }
    }

    pub fn instrument_async<F>(&self, method: &str, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        let guard = if self.tracing.is_loaded() {
            self.tracing.start(&self.segment_name(method))
        } else {
            None
        };
        // The entry log is written inside the segment's span
        let entered = guard.as_ref().map(|guard| guard.span().enter());
        let fut = self.log_entry(method, || fut);
        drop(entered);
        in_segment(guard, fut)
    }

    /// Turn `f` into a callable that is instrumented on every call.
    ///
    /// Multiple arguments can be passed as a tuple.
    pub fn wrap<A, R, F>(&self, method: impl Into<String>, f: F) -> impl Fn(A) -> R
    where
        F: Fn(A) -> R,
    {
        let this = self.clone();
        let method = method.into();
        move |arg| this.instrument(&method, || f(arg))
    }
}

impl std::fmt::Debug for Instrumented {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumented")
            .field("type_name", &self.type_name)
            .field("logger", &self.logger.name())
            .field("tracing", &self.tracing)
            .finish()
    }
}
