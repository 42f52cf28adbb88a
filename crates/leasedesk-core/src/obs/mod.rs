//! Observability for the form engine.
//!
//! Engine code never touches counters directly; it emits `FormEvent`s
//! through `sink::record`, which feeds either the thread-local metrics or
//! a scoped override installed with `with_sink`.

pub mod metrics;
pub mod sink;

pub use sink::{EventSink, FormEvent, record, with_sink};
