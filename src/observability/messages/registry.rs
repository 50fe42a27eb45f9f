// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for service registry and plugin context events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A service was added under a name.
///
/// # Log Level
/// `debug!` - Registration happens on every component start
pub struct ServiceRegistered<'a> {
    pub name: &'a str,
    pub service_type: &'a str,
    pub provider_count: usize,
}

impl Display for ServiceRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} under '{}' ({} providers)",
            self.service_type, self.name, self.provider_count
        )
    }
}

impl StructuredLog for ServiceRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            name = self.name,
            service_type = self.service_type,
            provider_count = self.provider_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "service_registered",
            span_name = name,
            name = self.name,
            service_type = self.service_type,
        )
    }
}

/// A service was removed from a name.
///
/// # Log Level
/// `debug!`
pub struct ServiceUnregistered<'a> {
    pub name: &'a str,
    pub service_type: &'a str,
    pub provider_count: usize,
}

impl Display for ServiceUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unregistered {} from '{}' ({} providers left)",
            self.service_type, self.name, self.provider_count
        )
    }
}

impl StructuredLog for ServiceUnregistered<'_> {
    fn log(&self) {
        tracing::debug!(
            name = self.name,
            service_type = self.service_type,
            provider_count = self.provider_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "service_unregistered",
            span_name = name,
            name = self.name,
            service_type = self.service_type,
        )
    }
}

/// The same service instance was registered twice under one name.
///
/// # Log Level
/// `trace!` - Expected when components re-register defensively
pub struct DuplicateRegistrationIgnored<'a> {
    pub name: &'a str,
    pub service_type: &'a str,
}

impl Display for DuplicateRegistrationIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring duplicate registration of {} under '{}'",
            self.service_type, self.name
        )
    }
}

impl StructuredLog for DuplicateRegistrationIgnored<'_> {
    fn log(&self) {
        tracing::trace!(
            name = self.name,
            service_type = self.service_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "duplicate_registration",
            span_name = name,
            name = self.name,
            service_type = self.service_type,
        )
    }
}

/// A tracker started observing a name.
///
/// # Log Level
/// `debug!`
pub struct TrackerRegistered<'a> {
    pub name: &'a str,
    pub service_type: &'a str,
    pub replayed: usize,
}

impl Display for TrackerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tracker for {} registered on '{}', replaying {} services",
            self.service_type, self.name, self.replayed
        )
    }
}

impl StructuredLog for TrackerRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            name = self.name,
            service_type = self.service_type,
            replayed = self.replayed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "tracker_registered",
            span_name = name,
            name = self.name,
            service_type = self.service_type,
        )
    }
}

/// A plugin context released everything it registered.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use valvechain::observability::messages::registry::PluginContextStopped;
///
/// let msg = PluginContextStopped {
///     plugin: "browser",
///     released: 3,
///     registry_alive: true,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct PluginContextStopped<'a> {
    pub plugin: &'a str,
    pub released: usize,
    pub registry_alive: bool,
}

impl Display for PluginContextStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.registry_alive {
            write!(
                f,
                "Plugin '{}' stopped, released {} registrations",
                self.plugin, self.released
            )
        } else {
            write!(
                f,
                "Plugin '{}' stopped after its registry was dropped, {} registrations discarded",
                self.plugin, self.released
            )
        }
    }
}

impl StructuredLog for PluginContextStopped<'_> {
    fn log(&self) {
        tracing::debug!(
            plugin = self.plugin,
            released = self.released,
            registry_alive = self.registry_alive,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "plugin_context_stopped",
            span_name = name,
            plugin = self.plugin,
            released = self.released,
        )
    }
}
