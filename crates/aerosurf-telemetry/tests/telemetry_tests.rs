//! Integration tests for aerosurf-telemetry.

use aerosurf_telemetry::bus::EventBus;
use aerosurf_telemetry::events::{EventKind, MeshEvent};
use aerosurf_telemetry::sinks::{TracingSink, VecSink};
use aerosurf_types::SurfaceId;

fn triangulated(id: u32) -> MeshEvent {
    MeshEvent::new(
        SurfaceId(id),
        EventKind::Triangulated {
            nodes: 10,
            triangles: 8,
            collapsed_panels: 0,
        },
    )
}

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.emit(triangulated(0));
    bus.emit(MeshEvent::new(SurfaceId(0), EventKind::KuttaNodesFound { count: 2 }));
    assert_eq!(bus.flush(), 2);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind, EventKind::KuttaNodesFound { count: 2 });
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(triangulated(0));
    assert_eq!(bus.flush(), 0);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn every_sink_sees_every_event() {
    let mut bus = EventBus::new();
    let (a, b) = (VecSink::new(), VecSink::new());
    let (ea, eb) = (a.events(), b.events());
    bus.add_sink(Box::new(a));
    bus.add_sink(Box::new(b));
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::DEBUG)));
    assert_eq!(bus.sink_count(), 3);
    assert_eq!(bus.sink_names(), vec!["vec_sink", "vec_sink", "tracing_sink"]);

    bus.emit(triangulated(1));
    bus.emit(triangulated(2));
    bus.finish();
    assert_eq!(ea.lock().unwrap().len(), 2);
    assert_eq!(eb.lock().unwrap().len(), 2);
}

#[test]
fn event_serialization() {
    let event = MeshEvent::new(
        SurfaceId(5),
        EventKind::Agglomerated {
            levels: 3,
            loops_per_level: vec![128, 64, 32],
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: MeshEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn excluded_event_carries_reason() {
    let event = MeshEvent::new(
        SurfaceId(7),
        EventKind::Excluded {
            reason: "Geometry error: patch too small".into(),
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("patch too small"));
}
