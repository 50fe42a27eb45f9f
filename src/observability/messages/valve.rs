// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events raised by the built-in valves.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The redirect valve answered a request.
///
/// # Log Level
/// `info!`
pub struct RedirectIssued<'a> {
    pub valve: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub status: u16,
}

impl Display for RedirectIssued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Valve '{}' redirected '{}' to '{}' with status {}",
            self.valve, self.from, self.to, self.status
        )
    }
}

impl StructuredLog for RedirectIssued<'_> {
    fn log(&self) {
        tracing::info!(
            valve = self.valve,
            from = self.from,
            to = self.to,
            status = self.status,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "redirect_issued",
            span_name = name,
            valve = self.valve,
            from = self.from,
            to = self.to,
        )
    }
}

/// The page cache served a stored response.
///
/// # Log Level
/// `debug!`
pub struct CacheHit<'a> {
    pub valve: &'a str,
    pub path: &'a str,
}

impl Display for CacheHit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Valve '{}' served '{}' from cache", self.valve, self.path)
    }
}

impl StructuredLog for CacheHit<'_> {
    fn log(&self) {
        tracing::debug!(valve = self.valve, path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "cache_hit",
            span_name = name,
            valve = self.valve,
            path = self.path,
        )
    }
}

/// The page cache evicted an entry to stay within its capacity.
///
/// # Log Level
/// `trace!`
pub struct CacheEvicted<'a> {
    pub valve: &'a str,
    pub path: &'a str,
    pub max_entries: usize,
}

impl Display for CacheEvicted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Valve '{}' evicted '{}' (capacity {})",
            self.valve, self.path, self.max_entries
        )
    }
}

impl StructuredLog for CacheEvicted<'_> {
    fn log(&self) {
        tracing::trace!(
            valve = self.valve,
            path = self.path,
            max_entries = self.max_entries,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "cache_evicted",
            span_name = name,
            valve = self.valve,
            path = self.path,
        )
    }
}

/// The downstream chain took longer than the diagnostics threshold.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use valvechain::observability::messages::valve::SlowChainDetected;
/// use std::time::Duration;
///
/// let msg = SlowChainDetected {
///     valve: "diagnostics",
///     path: "/news",
///     elapsed: Duration::from_millis(1200),
///     threshold: Duration::from_millis(500),
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct SlowChainDetected<'a> {
    pub valve: &'a str,
    pub path: &'a str,
    pub elapsed: std::time::Duration,
    pub threshold: std::time::Duration,
}

impl Display for SlowChainDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Request '{}' took {:?} after valve '{}' (threshold {:?})",
            self.path, self.elapsed, self.valve, self.threshold
        )
    }
}

impl StructuredLog for SlowChainDetected<'_> {
    fn log(&self) {
        tracing::warn!(
            valve = self.valve,
            path = self.path,
            elapsed_ms = self.elapsed.as_millis() as u64,
            threshold_ms = self.threshold.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "slow_chain",
            span_name = name,
            valve = self.valve,
            path = self.path,
            elapsed = ?self.elapsed,
        )
    }
}

/// A valve was instantiated by a factory.
///
/// # Log Level
/// `debug!`
pub struct ValveCreated<'a> {
    pub valve: &'a str,
    pub kind: &'a str,
    pub source: &'a str,
}

impl Display for ValveCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created valve '{}' of kind '{}' from {}",
            self.valve, self.kind, self.source
        )
    }
}

impl StructuredLog for ValveCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            valve = self.valve,
            kind = self.kind,
            source = self.source,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "valve_created",
            span_name = name,
            valve = self.valve,
            kind = self.kind,
        )
    }
}
