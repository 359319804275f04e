// =============================================================================
// Level Scorer — touches + recency
// =============================================================================
//
//   touch_score = touches / max(touches over the set)
//   recency     = 1 / (1 + age_days),  age_days = whole days since last_seen
//   strength    = round(0.6 * touch_score + 0.4 * recency, 4)
//
// "now" is always an explicit input so the scorer stays deterministic.

use chrono::{DateTime, Utc};

use crate::market_data::bar::round_to;

use super::level::SrLevel;

const TOUCH_WEIGHT: f64 = 0.6;
const RECENCY_WEIGHT: f64 = 0.4;

/// Recency factor in (0, 1]; a last touch in the future counts as age 0.
pub fn recency(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - last_seen).num_days().max(0);
    1.0 / (1.0 + age_days as f64)
}

/// Return the levels with `strength` recomputed against the whole set.
pub fn score_levels(levels: Vec<SrLevel>, now: DateTime<Utc>) -> Vec<SrLevel> {
    let max_touches = levels.iter().map(|l| l.touches).max().unwrap_or(0).max(1);
    levels
        .into_iter()
        .map(|level| {
            let touch_score = level.touches as f64 / max_touches as f64;
            let score = TOUCH_WEIGHT * touch_score + RECENCY_WEIGHT * recency(level.last_seen, now);
            SrLevel {
                strength: round_to(score, 4).clamp(0.0, 1.0),
                ..level
            }
        })
        .collect()
}

/// Sort by strength (descending, ties keep their order) and keep the top
/// `max_levels`.  Supports and resistances compete in one ranking.
pub fn rank_levels(mut levels: Vec<SrLevel>, max_levels: usize) -> Vec<SrLevel> {
    levels.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    levels.truncate(max_levels);
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn level(touches: u32, days_ago: i64, side: Side) -> SrLevel {
        SrLevel {
            touches,
            ..SrLevel::candidate(100.0, side, now() - Duration::days(days_ago))
        }
    }

    #[test]
    fn empty_set_scores_to_empty() {
        assert!(score_levels(Vec::new(), now()).is_empty());
    }

    #[test]
    fn strongest_recent_level_scores_one() {
        let scored = score_levels(vec![level(4, 0, Side::Support), level(2, 3, Side::Resistance)], now());
        assert_eq!(scored[0].strength, 1.0);
        // 0.6 * 0.5 + 0.4 * 0.25 = 0.4
        assert!((scored[1].strength - 0.4).abs() < 1e-12);
    }

    #[test]
    fn age_is_whole_days() {
        // 36 hours ago counts as one day.
        let last_seen = now() - Duration::hours(36);
        assert!((recency(last_seen, now()) - 0.5).abs() < 1e-12);
        // Future timestamps clamp to age zero.
        assert_eq!(recency(now() + Duration::days(2), now()), 1.0);
    }

    #[test]
    fn strength_is_rounded_to_four_places() {
        // 0.6 * 1/3 + 0.4 * 1/8 = 0.25
        // 0.6 * 1.0 + 0.4 * 1/7 = 0.657142.. => 0.6571
        let scored = score_levels(vec![level(1, 7, Side::Support), level(3, 6, Side::Support)], now());
        assert!((scored[0].strength - 0.25).abs() < 1e-12);
        assert_eq!(scored[1].strength, 0.6571);
    }

    #[test]
    fn strengths_stay_in_unit_interval() {
        let levels: Vec<_> = (0..20).map(|i| level(1 + i % 5, i as i64 * 10, Side::Support)).collect();
        for l in score_levels(levels, now()) {
            assert!((0.0..=1.0).contains(&l.strength));
        }
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let scored = score_levels(
            vec![
                level(1, 30, Side::Support),
                level(5, 0, Side::Resistance),
                level(3, 2, Side::Support),
            ],
            now(),
        );
        let ranked = rank_levels(scored, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].touches, 5);
        assert_eq!(ranked[1].touches, 3);
        assert!(ranked[0].strength >= ranked[1].strength);
    }
}
