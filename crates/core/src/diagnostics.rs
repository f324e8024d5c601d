//! Diagnostic sink handed down from owner to component.
//!
//! Every component receives a [`Diagnostics`] from whoever creates it and
//! emits its events under that span (`tracing::debug!(parent: diag.span(), ..)`).
//! What happens to those events is decided once, by the subscriber the binary
//! installs; [`LogCapture`] is the layer that feeds the editor's log tab.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Span, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Span-scoped diagnostic handle.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    span: Span,
}

impl Diagnostics {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Top-level handle for a process.
    pub fn root() -> Self {
        Self::new(tracing::info_span!("termgui"))
    }

    /// A handle whose events have no parent span and carry no context.
    pub fn detached() -> Self {
        Self::new(Span::none())
    }

    /// Handle for a component owned by this one.
    pub fn child(&self, component: &'static str) -> Self {
        Self::new(tracing::debug_span!(parent: &self.span, "component", name = component))
    }

    /// Handle for one of several identically named components.
    pub fn child_with_id(&self, component: &'static str, id: u64) -> Self {
        Self::new(tracing::debug_span!(parent: &self.span, "component", name = component, id))
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::detached()
    }
}

#[derive(Debug)]
struct LogRing {
    lines: VecDeque<String>,
    capacity: usize,
    total: u64,
}

/// Bounded, shared buffer of formatted log lines (oldest dropped first).
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<LogRing>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(LogRing {
                lines: VecDeque::with_capacity(capacity),
                capacity,
                total: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogRing> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut ring = self.lock();
        if ring.lines.len() == ring.capacity {
            ring.lines.pop_front();
        }
        ring.lines.push_back(line.into());
        ring.total += 1;
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines ever pushed, including those already dropped.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    /// Visit up to `count` lines, oldest first, ending `skip` lines before the newest.
    pub fn for_each_tail(&self, count: usize, skip: usize, mut f: impl FnMut(&str)) {
        let ring = self.lock();
        let end = ring.lines.len().saturating_sub(skip);
        let start = end.saturating_sub(count);
        for line in ring.lines.range(start..end) {
            f(line);
        }
    }

    /// Copy of the retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    /// A subscriber layer that appends every event to this buffer.
    pub fn layer(&self) -> LogCapture {
        LogCapture {
            buffer: self.clone(),
        }
    }
}

/// `tracing_subscriber` layer writing `LEVEL message key=value` lines into a [`LogBuffer`].
#[derive(Debug, Clone)]
pub struct LogCapture {
    buffer: LogBuffer,
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let level = event.metadata().level().as_str();
        self.buffer
            .push(format!("{level:>5} {}{}", visitor.message, visitor.fields));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
