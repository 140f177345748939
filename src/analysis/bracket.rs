//! Final-rank resolution from the winners bracket.

use crate::models::{BracketEdge, FinalRank, Roster};

/// Resolve a roster's final season rank.
///
/// The winners bracket is authoritative for places 1 through 6: the match
/// with `p == 1` decides champion and runner-up, `p == 3` the third-place
/// pair, `p == 5` the fifth-place pair. A roster in none of those matches
/// falls back to its regular-season rank (wins descending, points-for
/// breaking ties), which is left as-is even for bracket participants whose
/// placement match is missing — the bracket decides the top spots, the
/// regular season decides the rest.
///
/// `made_playoffs` is true when the roster is seeded into any bracket match.
pub fn resolve_final_rank(
    roster_id: u32,
    rosters: &[Roster],
    bracket: &[BracketEdge],
) -> FinalRank {
    for (place, rank_winner) in [(1, 1), (3, 3), (5, 5)] {
        if let Some(game) = bracket.iter().find(|m| m.place == Some(place)) {
            if game.w == Some(roster_id) {
                return FinalRank {
                    rank: rank_winner,
                    made_playoffs: true,
                };
            }
            if game.l == Some(roster_id) {
                return FinalRank {
                    rank: rank_winner + 1,
                    made_playoffs: true,
                };
            }
        }
    }

    let made_playoffs = bracket.iter().any(|m| m.involves(roster_id));

    let mut sorted: Vec<&Roster> = rosters.iter().collect();
    sorted.sort_by(|a, b| {
        b.settings
            .wins
            .cmp(&a.settings.wins)
            .then(b.settings.fpts.total_cmp(&a.settings.fpts))
    });
    let rank = sorted
        .iter()
        .position(|r| r.roster_id == roster_id)
        .map(|i| i as u32 + 1)
        .unwrap_or(0);

    FinalRank {
        rank,
        made_playoffs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RosterRecord;
    use pretty_assertions::assert_eq;

    fn roster(roster_id: u32, wins: u32, fpts: f64) -> Roster {
        Roster {
            roster_id,
            owner_id: Some(format!("u{}", roster_id)),
            players: None,
            starters: None,
            settings: RosterRecord {
                wins,
                losses: 14 - wins,
                ties: 0,
                fpts,
                fpts_against: None,
            },
        }
    }

    fn placement(place: u32, t1: u32, t2: u32, w: u32, l: u32) -> BracketEdge {
        BracketEdge {
            round: 3,
            match_id: place,
            t1: Some(t1),
            t2: Some(t2),
            w: Some(w),
            l: Some(l),
            place: Some(place),
            ..Default::default()
        }
    }

    fn twelve_rosters() -> Vec<Roster> {
        // Roster n has 13 - n wins, so regular-season order is 1, 2, ..., 12.
        (1..=12).map(|n| roster(n, 13 - n, 1500.0 - n as f64)).collect()
    }

    #[test]
    fn test_championship_decides_first_and_second() {
        let rosters = twelve_rosters();
        let bracket = vec![placement(1, 5, 7, 5, 7)];

        let champ = resolve_final_rank(5, &rosters, &bracket);
        assert_eq!(champ.rank, 1);
        assert!(champ.made_playoffs);

        let runner_up = resolve_final_rank(7, &rosters, &bracket);
        assert_eq!(runner_up.rank, 2);
        assert!(runner_up.made_playoffs);
    }

    #[test]
    fn test_consolation_placement_matches() {
        let rosters = twelve_rosters();
        let bracket = vec![
            placement(1, 1, 2, 1, 2),
            placement(3, 3, 4, 4, 3),
            placement(5, 5, 6, 6, 5),
        ];

        assert_eq!(resolve_final_rank(4, &rosters, &bracket).rank, 3);
        assert_eq!(resolve_final_rank(3, &rosters, &bracket).rank, 4);
        assert_eq!(resolve_final_rank(6, &rosters, &bracket).rank, 5);
        assert_eq!(resolve_final_rank(5, &rosters, &bracket).rank, 6);
    }

    #[test]
    fn test_eliminated_playoff_team_uses_regular_season_rank() {
        let rosters = twelve_rosters();
        // Roster 6 is seeded into round one but loses and never reaches a
        // placement match.
        let bracket = vec![
            BracketEdge {
                round: 1,
                match_id: 1,
                t1: Some(3),
                t2: Some(6),
                w: Some(3),
                l: Some(6),
                ..Default::default()
            },
            placement(1, 1, 2, 1, 2),
        ];

        let result = resolve_final_rank(6, &rosters, &bracket);
        assert_eq!(result.rank, 6);
        assert!(result.made_playoffs);
    }

    #[test]
    fn test_non_playoff_team_ranked_by_record() {
        let rosters = twelve_rosters();
        let bracket = vec![placement(1, 1, 2, 1, 2)];

        let result = resolve_final_rank(9, &rosters, &bracket);
        assert_eq!(result.rank, 9);
        assert!(!result.made_playoffs);
    }

    #[test]
    fn test_best_record_without_bracket_presence_is_rank_one() {
        // A league with no bracket at all: the best regular-season record is
        // rank 1, but it never counts as a playoff appearance.
        let rosters = twelve_rosters();
        let result = resolve_final_rank(1, &rosters, &[]);
        assert_eq!(result.rank, 1);
        assert!(!result.made_playoffs);
    }

    #[test]
    fn test_points_for_breaks_record_ties() {
        let rosters = vec![
            roster(1, 8, 1400.0),
            roster(2, 8, 1450.0),
            roster(3, 6, 1500.0),
        ];
        assert_eq!(resolve_final_rank(2, &rosters, &[]).rank, 1);
        assert_eq!(resolve_final_rank(1, &rosters, &[]).rank, 2);
        assert_eq!(resolve_final_rank(3, &rosters, &[]).rank, 3);
    }

    #[test]
    fn test_unknown_roster_gets_rank_zero() {
        let rosters = twelve_rosters();
        let result = resolve_final_rank(99, &rosters, &[]);
        assert_eq!(result.rank, 0);
        assert!(!result.made_playoffs);
    }
}
