//! Bindings generated from `protocol.yml` by the build script, plus the
//! hand-maintained handlers and the event sink they emit into.

use std::cell::RefCell;

use serde_json::Value;

include!(concat!(env!("OUT_DIR"), "/protocol_decl.rs"));

pub mod marshal {
    include!(concat!(env!("OUT_DIR"), "/protocol_marshal.rs"));
}

pub mod handlers;

thread_local! {
    static EMITTED: RefCell<Vec<(events::Type, Value)>> = const { RefCell::new(Vec::new()) };
}

/// Receives every event emitted through `marshal::emit_*`. Events are queued
/// per thread until `take_emitted` drains them.
pub fn broadcast_event(kind: events::Type, params: Value) {
    EMITTED.with(|queue| queue.borrow_mut().push((kind, params)));
}

pub fn take_emitted() -> Vec<(events::Type, Value)> {
    EMITTED.with(|queue| queue.borrow_mut().drain(..).collect())
}
