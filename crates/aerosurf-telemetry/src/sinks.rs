//! Pluggable event sinks.

use std::sync::{Arc, Mutex};

use crate::events::MeshEvent;

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &MeshEvent);

    /// Called when the run ends.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// The buffer is shared, so a handle obtained from [`VecSink::events`]
/// stays readable after the sink is boxed into a bus.
#[derive(Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<MeshEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected events.
    pub fn events(&self) -> Arc<Mutex<Vec<MeshEvent>>> {
        Arc::clone(&self.events)
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &MeshEvent) {
        // A poisoned buffer only means another reader panicked; keep collecting
        let mut events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &MeshEvent) {
        let surface = event.surface_id.0;
        if self.level >= tracing::Level::DEBUG {
            tracing::debug!(surface, event = ?event.kind, "mesh_event");
        } else if self.level == tracing::Level::INFO {
            tracing::info!(surface, event = ?event.kind, "mesh_event");
        } else if self.level == tracing::Level::WARN {
            tracing::warn!(surface, event = ?event.kind, "mesh_event");
        } else {
            tracing::error!(surface, event = ?event.kind, "mesh_event");
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
