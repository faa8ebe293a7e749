//! Tracing integration
//!
//! A [`Tracer`] reports named segments to an external monitoring backend.
//! [`TracingIntegration`] decides once, at startup, whether a tracer is
//! loaded, and whether segments are recorded at all.

use crate::core::{ContextValue, Environment, Logger, LoggingConfig, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span};

/// Ends a segment when dropped, including while unwinding.
///
/// A guard may carry a `tracing` span; the instrumented call runs inside
/// that span (entered for sync calls, attached with `Instrument` for
/// futures).
#[must_use = "the segment ends as soon as the guard is dropped"]
pub struct SegmentGuard {
    on_end: Option<Box<dyn FnOnce() + Send>>,
    span: Span,
}

impl SegmentGuard {
    pub fn new(on_end: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_end: Some(Box::new(on_end)),
            span: Span::none(),
        }
    }

    /// A guard that does nothing
    pub fn noop() -> Self {
        Self {
            on_end: None,
            span: Span::none(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Span the segment's work runs in; disabled when there is none
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for SegmentGuard {
    fn drop(&mut self) {
        if let Some(on_end) = self.on_end.take() {
            on_end();
        }
    }
}

impl std::fmt::Debug for SegmentGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentGuard")
            .field("active", &self.on_end.is_some())
            .field("span", &self.span.id())
            .finish()
    }
}

/// Backend that records named segments
pub trait Tracer: Send + Sync {
    fn start_segment(&self, name: &str) -> SegmentGuard;

    fn name(&self) -> &str;
}

/// Reports segments as `tracing` spans, with the elapsed time recorded as
/// an event when the segment ends.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanTracer;

impl Tracer for SpanTracer {
    fn start_segment(&self, name: &str) -> SegmentGuard {
        let span = tracing::info_span!("segment", name = %name);
        let finished = span.clone();
        let started = Instant::now();
        SegmentGuard::new(move || {
            tracing::debug!(
                parent: &finished,
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "segment finished"
            );
        })
        .with_span(span)
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

pub struct TracingIntegration {
    tracer: Option<Arc<dyn Tracer>>,
    enabled: bool,
    environment: Environment,
}

impl TracingIntegration {
    /// No tracer, nothing recorded
    pub fn disabled() -> Self {
        Self {
            tracer: None,
            enabled: false,
            environment: Environment::Development,
        }
    }

    /// Use an already constructed tracer
    pub fn with_tracer(tracer: Arc<dyn Tracer>, environment: Environment) -> Self {
        Self {
            tracer: Some(tracer),
            enabled: true,
            environment,
        }
    }

    /// Load the tracer at startup.
    ///
    /// `init` only runs when tracing is enabled in `config`. If it fails the
    /// failure is logged through `logger` and the integration stays
    /// unloaded; the application keeps running without segments.
    pub fn load<F>(config: &LoggingConfig, logger: &Logger, init: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn Tracer>>,
    {
        let mut integration = Self {
            tracer: None,
            enabled: config.tracing_enabled,
            environment: config.environment,
        };
        if !config.tracing_enabled {
            return integration;
        }

        match init() {
            Ok(tracer) => {
                logger.info_with(
                    "Tracing integration loaded",
                    ContextValue::map().with("tracer", tracer.name()),
                );
                integration.tracer = Some(tracer);
            }
            Err(e) => {
                logger.warn_with(
                    "Tracing integration failed to load",
                    ContextValue::map().with("error", e.to_string()),
                );
            }
        }
        integration
    }

    /// A tracer was successfully loaded
    pub fn is_loaded(&self) -> bool {
        self.tracer.is_some()
    }

    /// Segments are recorded: loaded, enabled, and not running tests
    pub fn is_active(&self) -> bool {
        self.is_loaded() && self.enabled && !self.environment.is_test()
    }

    /// Start a segment if active
    pub fn start(&self, name: &str) -> Option<SegmentGuard> {
        if !self.is_active() {
            return None;
        }
        self.tracer.as_ref().map(|tracer| tracer.start_segment(name))
    }

    /// Run `f` inside a segment named `name`; plain call when inactive
    pub fn segment<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let Some(guard) = self.start(name) else {
            return f();
        };
        let _entered = guard.span().enter();
        f()
    }

    /// Run `fut` inside a segment named `name`.
    ///
    /// The segment starts now and ends when the returned future completes
    /// or is dropped; the future is polled inside the segment's span.
    pub fn segment_async<F>(&self, name: &str, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        in_segment(self.start(name), fut)
    }
}

/// Attach `guard`'s span to `fut` and end the segment once `fut` is done
pub(crate) fn in_segment<F>(guard: Option<SegmentGuard>, fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let span = guard
        .as_ref()
        .map_or_else(Span::none, |guard| guard.span().clone());
    let fut = fut.instrument(span);
    async move {
        let _guard = guard;
        fut.await
    }
}

impl std::fmt::Debug for TracingIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingIntegration")
            .field("tracer", &self.tracer.as_ref().map(|t| t.name().to_string()))
            .field("enabled", &self.enabled)
            .field("environment", &self.environment)
            .finish()
    }
}
