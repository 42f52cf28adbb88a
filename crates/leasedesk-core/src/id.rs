use derive_more::Display;
use rand_chacha::{
    ChaCha20Rng,
    rand_core::{RngCore, SeedableRng},
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

///
/// RowId
///
/// Opaque identity of a group row. Assigned once when the row is created
/// and carried unchanged through resizes and positional removals.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct RowId(Ulid);

impl RowId {
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

///
/// IdGenerator
///
/// Monotonic ULID source owned by a single form.
/// Within one millisecond it increments the previous id instead of drawing
/// fresh randomness, so ids are strictly increasing and never repeat.
///

pub struct IdGenerator {
    previous: Ulid,
    rng: ChaCha20Rng,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));

        Self::seeded(seed)
    }

    /// Deterministic randomness; timestamps still come from the clock.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            previous: Ulid::nil(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> RowId {
        let last_ts = self.previous.timestamp_ms();
        let ts = now_millis();

        // same ms or the clock went backwards: stay monotonic
        let ulid = if ts <= last_ts {
            match self.previous.increment() {
                Some(next) => next,
                None => Ulid::from_parts(last_ts.saturating_add(1), self.next_u128()),
            }
        } else {
            Ulid::from_parts(ts, self.next_u128())
        };

        self.previous = ulid;

        RowId(ulid)
    }

    fn next_u128(&mut self) -> u128 {
        (u128::from(self.rng.next_u64()) << 64) | u128::from(self.rng.next_u64())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

///
/// TESTS
///
