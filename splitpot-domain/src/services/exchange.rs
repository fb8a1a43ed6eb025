//! Currency conversion over snapshot rates.
//!
//! The core never fetches or caches rates. It consumes an already-scaled
//! snapshot captured by the rate collaborator when the expense was recorded;
//! stored conversions are never re-derived from fresher rates.

use chrono::{DateTime, TimeDelta, Utc};
use splitpot_money::{Money, Rate};

/// How long the rate collaborator treats a cached rate as valid before
/// refetching. Surfaced here so embedding callers share one definition of
/// "fresh"; going stale while offline falls back to the last-known snapshot
/// on the collaborator side.
pub const RATE_TTL_HOURS: i64 = 12;

/// Converts an amount between currencies with a snapshot rate, truncating
/// toward zero. `None` when the converted amount leaves the representable
/// range.
pub fn apply_rate(amount: Money, rate: Rate) -> Option<Money> {
    amount.checked_mul_rate(rate)
}

/// A conversion rate together with the moment it was captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateSnapshot {
    rate: Rate,
    captured_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(rate: Rate, captured_at: DateTime<Utc>) -> Self {
        Self { rate, captured_at }
    }

    /// Snapshot for an expense already in the main currency.
    pub fn identity(captured_at: DateTime<Utc>) -> Self {
        Self::new(Rate::IDENTITY, captured_at)
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether the snapshot is still within the collaborator's TTL at
    /// `now`. A stale snapshot stays usable for historical expenses; this
    /// only tells the caller it should refetch before recording new ones.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.captured_at) <= TimeDelta::hours(RATE_TTL_HOURS)
    }
}
