//! Progress reporting hook
//!
//! The migrator announces each decision it makes (checking the tracker,
//! running a step, skipping a step) as a human-readable line. Where those
//! lines go is configurable; they are not a structured log and nothing depends
//! on their content.

use std::fmt;
use std::sync::Arc;

use crate::TRACING_TARGET;

type LineFn = dyn Fn(&str) + Send + Sync;

#[derive(Clone)]
enum Sink {
    Stdout,
    Silent,
    Tracing,
    Custom(Arc<LineFn>),
}

/// Destination for progress lines
#[derive(Clone)]
pub struct Reporter {
    sink: Sink,
}

impl Reporter {
    /// Send lines to a custom function
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use stepwise_migrate::Reporter;
    ///
    /// let lines = Arc::new(Mutex::new(Vec::new()));
    /// let captured = lines.clone();
    /// let reporter = Reporter::new(move |line| captured.lock().unwrap().push(line.to_string()));
    ///
    /// reporter.report(format_args!("Running migration: {}", "001"));
    /// assert_eq!(lines.lock().unwrap()[0], "Running migration: 001");
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            sink: Sink::Custom(Arc::new(f)),
        }
    }

    /// Print lines to standard output
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Discard every line
    pub fn silent() -> Self {
        Self { sink: Sink::Silent }
    }

    /// Forward lines as `info` events to `tracing`
    pub fn tracing() -> Self {
        Self {
            sink: Sink::Tracing,
        }
    }

    /// Emit one progress line
    pub fn report(&self, args: fmt::Arguments<'_>) {
        match &self.sink {
            Sink::Silent => {}
            Sink::Stdout => println!("{}", args),
            Sink::Tracing => tracing::info!(target: TRACING_TARGET, "{}", args),
            Sink::Custom(f) => f(&args.to_string()),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sink {
            Sink::Stdout => "stdout",
            Sink::Silent => "silent",
            Sink::Tracing => "tracing",
            Sink::Custom(_) => "custom",
        };
        f.debug_tuple("Reporter").field(&kind).finish()
    }
}
