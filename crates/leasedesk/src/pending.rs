//! In-flight request guard.
//!
//! A control that talks to the backend owns one `Pending`. While a request
//! is outstanding a second one is refused, and a result that comes back
//! after the request was abandoned (or superseded) is dropped instead of
//! being applied to a screen that has moved on.

use thiserror::Error as ThisError;

///
/// Busy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("a request is already in flight")]
pub struct Busy;

///
/// Ticket
/// Handle for one outstanding request.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ticket(u64);

///
/// Pending
///

#[derive(Debug, Default)]
pub struct Pending {
    issued: u64,
    in_flight: Option<u64>,
}

impl Pending {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: 0,
            in_flight: None,
        }
    }

    pub const fn begin(&mut self) -> Result<Ticket, Busy> {
        if self.in_flight.is_some() {
            return Err(Busy);
        }

        self.issued += 1;
        self.in_flight = Some(self.issued);

        Ok(Ticket(self.issued))
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Close out `ticket`. The result comes back only if the ticket is still
    /// the one in flight; stale results yield `None`.
    pub fn finish<T>(&mut self, ticket: Ticket, result: T) -> Option<T> {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            Some(result)
        } else {
            tracing::debug!(ticket = ticket.0, "dropping stale response");
            None
        }
    }

    /// Forget the outstanding request; its result will be discarded.
    pub const fn abandon(&mut self) {
        self.in_flight = None;
    }
}

///
/// TESTS
///
