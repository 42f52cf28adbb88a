//! Event sink boundary.
//!
//! This module is the only bridge between engine logic and the metrics
//! state.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn EventSink>>> = const { RefCell::new(None) };
}

///
/// FormEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormEvent {
    RowsAdded { count: usize },
    RowsRemoved { count: usize },
    DerivedRecomputed { fields: usize },
    Validated { issues: usize },
    SubmitBlocked { issues: usize },
    SubmitAccepted,
    SubmitFailed,
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: FormEvent);
}

/// GlobalEventSink
/// Default sink folding events into the thread-local metrics state.
/// Used whenever no scoped override is installed.
pub(crate) struct GlobalEventSink;

impl EventSink for GlobalEventSink {
    fn record(&self, event: FormEvent) {
        metrics::with_state_mut(|m| match event {
            FormEvent::RowsAdded { count } => {
                m.rows_added = m.rows_added.saturating_add(count as u64);
            }
            FormEvent::RowsRemoved { count } => {
                m.rows_removed = m.rows_removed.saturating_add(count as u64);
            }
            FormEvent::DerivedRecomputed { fields } => {
                m.derived_recomputes = m.derived_recomputes.saturating_add(fields as u64);
            }
            FormEvent::Validated { issues } => {
                m.validations = m.validations.saturating_add(1);
                m.validation_issues = m.validation_issues.saturating_add(issues as u64);
            }
            FormEvent::SubmitBlocked { .. } => {
                m.submits_blocked = m.submits_blocked.saturating_add(1);
            }
            FormEvent::SubmitAccepted => {
                m.submits_accepted = m.submits_accepted.saturating_add(1);
            }
            FormEvent::SubmitFailed => {
                m.submits_failed = m.submits_failed.saturating_add(1);
            }
        });
    }
}

/// Route an event to the active sink.
pub fn record(event: FormEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalEventSink.record(event),
    }
}

/// Run `f` with `sink` receiving every event on this thread.
/// The previous sink is restored afterwards, even on unwind.
pub fn with_sink<T>(sink: Rc<dyn EventSink>, f: impl FnOnce() -> T) -> T {
    struct Restore(Option<Rc<dyn EventSink>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = previous);
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _restore = Restore(previous);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture(RefCell<Vec<FormEvent>>);

    impl EventSink for Capture {
        fn record(&self, event: FormEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_captures_and_restores() {
        metrics::reset();
        let capture = Rc::new(Capture::default());

        with_sink(capture.clone(), || {
            record(FormEvent::RowsAdded { count: 2 });
        });
        record(FormEvent::SubmitAccepted);

        assert_eq!(
            *capture.0.borrow(),
            vec![FormEvent::RowsAdded { count: 2 }]
        );
        let snap = metrics::snapshot();
        assert_eq!(snap.rows_added, 0);
        assert_eq!(snap.submits_accepted, 1);
    }
}
