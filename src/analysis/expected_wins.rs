//! All-play expected-wins standings.

use std::collections::HashMap;

use crate::models::{ExpectedWinsStanding, WeekRecords};

/// Compute one standing per roster from a season's weekly records.
///
/// For each active week, a roster's expected-wins contribution is the
/// fraction of the *other* active rosters that week it outscored, ties
/// counting one-half — its win total had it played everyone. Actual wins
/// come from the real head-to-head pairing (`matchup_id`), ties again
/// one-half. Inactive records are excluded everywhere, and a roster with no
/// active week all season is omitted entirely (it cannot be compared).
///
/// The result is sorted by expected wins descending, points-for breaking
/// ties.
pub fn compute_expected_wins(weeks: &[WeekRecords]) -> Vec<ExpectedWinsStanding> {
    let mut standings: HashMap<u32, ExpectedWinsStanding> = HashMap::new();

    for week in weeks {
        let active: Vec<_> = week.active().collect();
        if active.is_empty() {
            continue;
        }
        let opponents = active.len().saturating_sub(1) as f64;

        // Opponent totals by matchup pairing.
        let mut pairings: HashMap<u32, Vec<(u32, f64)>> = HashMap::new();
        for rec in &active {
            if let Some(mid) = rec.matchup_id {
                if mid != 0 {
                    pairings.entry(mid).or_default().push((rec.roster_id, rec.points));
                }
            }
        }

        for rec in &active {
            let entry = standings
                .entry(rec.roster_id)
                .or_insert_with(|| ExpectedWinsStanding {
                    roster_id: rec.roster_id,
                    ..Default::default()
                });
            entry.active_weeks += 1;
            entry.points_for += rec.points;

            // All-play: the fraction of other active rosters outscored.
            if opponents > 0.0 {
                let mut beaten = 0.0;
                for other in &active {
                    if other.roster_id == rec.roster_id {
                        continue;
                    }
                    if rec.points > other.points {
                        beaten += 1.0;
                    } else if rec.points == other.points {
                        beaten += 0.5;
                    }
                }
                entry.expected_wins += beaten / opponents;
            }

            // Head-to-head: the paired opponent decides the actual result.
            let opponent = rec.matchup_id.filter(|m| *m != 0).and_then(|mid| {
                pairings
                    .get(&mid)?
                    .iter()
                    .find(|(rid, _)| *rid != rec.roster_id)
                    .copied()
            });
            if let Some((_, opp_points)) = opponent {
                entry.points_against += opp_points;
                if rec.points > opp_points {
                    entry.actual_wins += 1.0;
                } else if rec.points == opp_points {
                    entry.actual_wins += 0.5;
                }
            }
        }
    }

    let mut result: Vec<_> = standings.into_values().collect();
    result.sort_by(|a, b| {
        b.expected_wins
            .total_cmp(&a.expected_wins)
            .then(b.points_for.total_cmp(&a.points_for))
    });
    result
}
