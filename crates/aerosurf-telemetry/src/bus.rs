//! Event bus with pluggable sinks.
//!
//! Producers `emit` into an `mpsc` channel; `flush` drains the channel into
//! every registered sink. Surfaces are meshed one after another, so the
//! pipeline flushes once per surface.

use std::sync::mpsc;

use crate::events::MeshEvent;
use crate::sinks::EventSink;

/// Event bus for meshing telemetry.
///
/// The producer side (`emit`) sends events to all registered sinks.
/// Each sink runs on the consumer side and processes events independently.
pub struct EventBus {
    sender: mpsc::Sender<MeshEvent>,
    receiver: mpsc::Receiver<MeshEvent>,
    /// Registered sinks.
    sinks: Vec<Box<dyn EventSink>>,
    /// Whether the bus is active. Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. If the bus is disabled, this is a no-op.
    pub fn emit(&self, event: MeshEvent) {
        if !self.enabled {
            return;
        }
        // Send to channel; ignore error if receiver is somehow dropped
        let _ = self.sender.send(event);
    }

    /// Flush all pending events to registered sinks.
    ///
    /// Returns the number of events delivered.
    pub fn flush(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            delivered += 1;
        }
        delivered
    }

    /// Flushes pending events and finalizes every sink.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Names of the registered sinks.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
