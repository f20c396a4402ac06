//! Wall-clock source for engine-generated timestamps.
//!
//! # Invariants
//! - Returned instants are truncated to whole seconds, the precision the
//!   note header persists.

use chrono::{DateTime, SubsecRound, Utc};

/// Source of "now" for ids and note timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}
