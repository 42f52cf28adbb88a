use serde::Serialize;
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<FormMetrics> = RefCell::new(FormMetrics::default());
}

///
/// FormMetrics
///
/// Per-thread counters; one UI thread owns its forms, so this is also the
/// per-console view.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FormMetrics {
    pub rows_added: u64,
    pub rows_removed: u64,
    pub derived_recomputes: u64,
    pub validations: u64,
    pub validation_issues: u64,
    pub submits_blocked: u64,
    pub submits_accepted: u64,
    pub submits_failed: u64,
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut FormMetrics) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

#[must_use]
pub fn snapshot() -> FormMetrics {
    STATE.with(|state| state.borrow().clone())
}

pub fn reset() {
    with_state_mut(|m| *m = FormMetrics::default());
}
