//! Support/resistance level value type.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Side;

/// Strength assigned to raw swing candidates before scoring overwrites it.
pub const CANDIDATE_STRENGTH: f64 = 0.5;

/// A support or resistance level.
///
/// Raw swing candidates have `touches == 1`, equal `first_seen`/`last_seen`
/// and no sources.  Merging never mutates either input: it builds a new level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrLevel {
    pub price: f64,
    pub side: Side,
    pub touches: u32,
    /// Composite score in [0, 1].
    pub strength: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Lookback window sizes (days) that contributed to this level.
    pub sources: BTreeSet<u32>,
}

impl SrLevel {
    /// A single swing point.
    pub fn candidate(price: f64, side: Side, seen: DateTime<Utc>) -> Self {
        Self {
            price,
            side,
            touches: 1,
            strength: CANDIDATE_STRENGTH,
            first_seen: seen,
            last_seen: seen,
            sources: BTreeSet::new(),
        }
    }

    /// Combine two levels of the same side.
    ///
    /// Price is the touch-weighted mean, touches add up, the seen interval
    /// widens to cover both and the source sets are unioned.  Strength is
    /// reset to zero until the merged set is scored.
    pub fn merged_with(&self, other: &SrLevel) -> SrLevel {
        debug_assert_eq!(self.side, other.side);
        let total = self.touches + other.touches;
        let price = (self.price * self.touches as f64 + other.price * other.touches as f64)
            / total.max(1) as f64;
        SrLevel {
            price,
            side: self.side,
            touches: total,
            strength: 0.0,
            first_seen: self.first_seen.min(other.first_seen),
            last_seen: self.last_seen.max(other.last_seen),
            sources: self.sources.union(&other.sources).copied().collect(),
        }
    }

    /// The same level attributed to lookback `window`.
    pub fn with_source(&self, window: u32) -> SrLevel {
        let mut sources = self.sources.clone();
        sources.insert(window);
        SrLevel {
            sources,
            ..self.clone()
        }
    }
}
