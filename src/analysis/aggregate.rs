//! Cross-season and cross-league rollups.
//!
//! Each rollup is a pure fold over per-season analyzer outputs; failed
//! seasons are simply absent from the input, so the folds never see partial
//! units.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    LeagueBenchmarkResult, LeaguePerformance, PlayerDirectory, Position, Roster, SeasonStandings,
    WeeklyMatchupRecord, SCORED_POSITIONS,
};

/// One owner's multi-season averages within a league's history chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerAverages {
    pub owner_id: String,
    pub display_name: String,
    #[serde(default)]
    pub team_name: Option<String>,
    /// Seasons this owner appears in.
    pub seasons: u32,
    pub avg_expected_wins: f64,
    pub avg_actual_wins: f64,
    pub avg_points_for: f64,
    pub avg_points_against: f64,
    /// Total actual − expected wins across all seasons.
    pub total_luck: f64,
    pub avg_luck: f64,
    /// Average expected wins above the all-owner per-season baseline.
    pub avg_expected_above_league: f64,
}

/// Fold per-season standings into per-owner career averages.
///
/// Seasons are sorted chronologically before the fold so owner display
/// metadata resolves as "most recent season's name wins" — owners rename
/// their teams, and the latest name is the one people recognize.
///
/// Luck is actual minus expected wins; the above-league figure compares each
/// owner's average expected wins to the baseline across every (owner, season)
/// entry, so a positive value means consistently outscoring the field.
pub fn rollup_history(seasons: &[SeasonStandings]) -> Vec<OwnerAverages> {
    #[derive(Default)]
    struct Sums {
        expected: f64,
        actual: f64,
        points_for: f64,
        points_against: f64,
        count: u32,
        display_name: String,
        team_name: Option<String>,
    }

    let mut chronological: Vec<&SeasonStandings> = seasons.iter().collect();
    chronological.sort_by_key(|s| s.season);

    let mut owners: HashMap<String, Sums> = HashMap::new();
    for season in chronological {
        for owner in &season.standings {
            let sums = owners.entry(owner.owner_id.clone()).or_default();
            sums.expected += owner.standing.expected_wins;
            sums.actual += owner.standing.actual_wins;
            sums.points_for += owner.standing.points_for;
            sums.points_against += owner.standing.points_against;
            sums.count += 1;
            // Later seasons overwrite: most recent name wins.
            sums.display_name = owner.display_name.clone();
            sums.team_name = owner.team_name.clone();
        }
    }

    let total_entries: u32 = owners.values().map(|s| s.count).sum();
    let total_expected: f64 = owners.values().map(|s| s.expected).sum();
    let baseline = if total_entries > 0 {
        total_expected / total_entries as f64
    } else {
        0.0
    };

    let mut averages: Vec<OwnerAverages> = owners
        .into_iter()
        .map(|(owner_id, sums)| {
            let count = sums.count.max(1) as f64;
            let total_luck = sums.actual - sums.expected;
            let avg_expected_wins = sums.expected / count;
            OwnerAverages {
                owner_id,
                display_name: sums.display_name,
                team_name: sums.team_name,
                seasons: sums.count,
                avg_expected_wins,
                avg_actual_wins: sums.actual / count,
                avg_points_for: sums.points_for / count,
                avg_points_against: sums.points_against / count,
                total_luck,
                avg_luck: total_luck / count,
                avg_expected_above_league: avg_expected_wins - baseline,
            }
        })
        .collect();
    averages.sort_by(|a, b| b.avg_expected_wins.total_cmp(&a.avg_expected_wins));
    averages
}

/// Per-position averages of the target owner vs the league across many
/// leagues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAverages {
    pub position: Position,
    /// Leagues where both the owner and the league average had this position.
    pub leagues_counted: u32,
    pub user_avg_points_per_week: f64,
    pub league_avg_points_per_week: f64,
    pub user_avg_points_per_starter: f64,
    pub league_avg_points_per_starter: f64,
}

impl PositionAverages {
    /// Output gap (weekly points) vs the league average.
    pub fn diff_points(&self) -> f64 {
        self.user_avg_points_per_week - self.league_avg_points_per_week
    }

    /// Output gap as a percentage of the league average; 0 when the league
    /// average is zero.
    pub fn diff_pct(&self) -> f64 {
        if self.league_avg_points_per_week == 0.0 {
            return 0.0;
        }
        self.diff_points() / self.league_avg_points_per_week * 100.0
    }
}

/// Fold per-league benchmark results into per-position cross-league averages,
/// ordered `QB, RB, WR, TE, K, DEF`. A league counts toward a position only
/// when both the owner's and the league-average stats carry it.
pub fn rollup_positional(results: &[LeagueBenchmarkResult]) -> Vec<PositionAverages> {
    SCORED_POSITIONS
        .iter()
        .map(|&position| {
            let mut counted = 0u32;
            let mut user_week = 0.0;
            let mut league_week = 0.0;
            let mut user_starter = 0.0;
            let mut league_starter = 0.0;

            for result in results {
                let (Some(user), Some(league)) = (
                    result.user_stats.get(&position),
                    result.league_average_stats.get(&position),
                ) else {
                    continue;
                };
                counted += 1;
                user_week += user.avg_points_per_week;
                league_week += league.avg_points_per_week;
                user_starter += user.avg_points_per_starter;
                league_starter += league.avg_points_per_starter;
            }

            let divisor = counted.max(1) as f64;
            PositionAverages {
                position,
                leagues_counted: counted,
                user_avg_points_per_week: user_week / divisor,
                league_avg_points_per_week: league_week / divisor,
                user_avg_points_per_starter: user_starter / divisor,
                league_avg_points_per_starter: league_starter / divisor,
            }
        })
        .collect()
}

/// One season's outcomes across every league the user played in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub leagues: u32,
    pub avg_finish: f64,
    pub championships: u32,
    /// Finishes of third or better.
    pub podiums: u32,
    /// Percentage of leagues where the user reached the playoffs.
    pub playoff_rate: f64,
}

pub fn summarize_performance(results: &[LeaguePerformance]) -> SeasonSummary {
    if results.is_empty() {
        return SeasonSummary::default();
    }
    let leagues = results.len() as u32;
    let rank_sum: u32 = results.iter().map(|r| r.rank).sum();
    let playoff_count = results.iter().filter(|r| r.made_playoffs).count();
    SeasonSummary {
        leagues,
        avg_finish: rank_sum as f64 / leagues as f64,
        championships: results.iter().filter(|r| r.rank == 1).count() as u32,
        podiums: results.iter().filter(|r| r.rank <= 3 && r.rank > 0).count() as u32,
        playoff_rate: playoff_count as f64 / leagues as f64 * 100.0,
    }
}

/// The user's holdings in one league: full roster plus starters, either the
/// live roster state or one historical week's lineup.
#[derive(Debug, Clone)]
pub struct LeagueHolding {
    pub league_id: String,
    pub players: Vec<String>,
    pub starters: Vec<String>,
}

impl LeagueHolding {
    pub fn from_roster(league_id: &str, roster: &Roster) -> Self {
        Self {
            league_id: league_id.to_string(),
            players: roster.players.clone().unwrap_or_default(),
            starters: roster.starters.clone().unwrap_or_default(),
        }
    }

    pub fn from_matchup(league_id: &str, record: &WeeklyMatchupRecord) -> Self {
        Self {
            league_id: league_id.to_string(),
            players: record.players.clone().unwrap_or_default(),
            starters: record.starters.clone().unwrap_or_default(),
        }
    }
}

/// One player's footprint across a user's leagues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShare {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    /// Leagues where the user holds this player.
    pub shares: u32,
    pub starter_count: u32,
    pub bench_count: u32,
    /// Shares as a percentage of all the user's leagues.
    pub exposure: f64,
    pub league_ids: Vec<String>,
}

/// Count player shares across a user's leagues, sorted by shares descending.
///
/// `total_leagues` is the exposure denominator: the number of leagues the
/// user is in, not the number of holdings that resolved (a league whose
/// roster fetch failed still dilutes exposure). Players the directory can't
/// place at a scored position are dropped.
pub fn build_portfolio(
    holdings: &[LeagueHolding],
    total_leagues: usize,
    directory: &PlayerDirectory,
) -> Vec<PlayerShare> {
    #[derive(Default)]
    struct Counts {
        shares: u32,
        started: u32,
        benched: u32,
        league_ids: Vec<String>,
    }

    let mut counts: HashMap<&str, Counts> = HashMap::new();
    for holding in holdings {
        for player_id in &holding.players {
            let entry = counts.entry(player_id.as_str()).or_default();
            entry.shares += 1;
            if holding.starters.iter().any(|s| s == player_id) {
                entry.started += 1;
            } else {
                entry.benched += 1;
            }
            entry.league_ids.push(holding.league_id.clone());
        }
    }

    let denominator = total_leagues.max(1) as f64;
    let mut shares: Vec<PlayerShare> = counts
        .into_iter()
        .filter_map(|(player_id, c)| {
            let position = directory.position_of(player_id);
            if !position.is_scored() {
                return None;
            }
            Some(PlayerShare {
                player_id: player_id.to_string(),
                name: directory.name_of(player_id).to_string(),
                position,
                shares: c.shares,
                starter_count: c.started,
                bench_count: c.benched,
                exposure: c.shares as f64 / denominator * 100.0,
                league_ids: c.league_ids,
            })
        })
        .collect();
    shares.sort_by(|a, b| b.shares.cmp(&a.shares).then(a.name.cmp(&b.name)));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ExpectedWinsStanding, OwnerStanding, PlayerRef, PositionStats, RosterMeta,
    };
    use pretty_assertions::assert_eq;

    fn owner_standing(
        owner_id: &str,
        name: &str,
        expected: f64,
        actual: f64,
        pf: f64,
    ) -> OwnerStanding {
        OwnerStanding {
            owner_id: owner_id.to_string(),
            display_name: name.to_string(),
            team_name: None,
            standing: ExpectedWinsStanding {
                roster_id: 1,
                actual_wins: actual,
                expected_wins: expected,
                points_for: pf,
                points_against: 0.0,
                active_weeks: 14,
            },
        }
    }

    fn season(year: u32, standings: Vec<OwnerStanding>) -> SeasonStandings {
        SeasonStandings {
            league_id: format!("l{}", year),
            season: year,
            standings,
        }
    }

    #[test]
    fn test_history_rollup_averages_and_luck() {
        let seasons = vec![
            season(
                2023,
                vec![
                    owner_standing("a", "Alpha", 8.0, 10.0, 1500.0),
                    owner_standing("b", "Bravo", 6.0, 4.0, 1400.0),
                ],
            ),
            season(
                2024,
                vec![
                    owner_standing("a", "Alpha", 10.0, 10.0, 1600.0),
                    owner_standing("b", "Bravo", 4.0, 6.0, 1300.0),
                ],
            ),
        ];

        let rollup = rollup_history(&seasons);
        assert_eq!(rollup.len(), 2);

        // Sorted by average expected wins descending.
        let a = &rollup[0];
        assert_eq!(a.owner_id, "a");
        assert_eq!(a.seasons, 2);
        assert_eq!(a.avg_expected_wins, 9.0);
        assert_eq!(a.avg_actual_wins, 10.0);
        assert_eq!(a.total_luck, 2.0);
        assert_eq!(a.avg_luck, 1.0);
        // Baseline = (8 + 10 + 6 + 4) / 4 = 7.
        assert_eq!(a.avg_expected_above_league, 2.0);

        let b = &rollup[1];
        assert_eq!(b.total_luck, 0.0);
        assert_eq!(b.avg_expected_above_league, -2.0);
    }

    #[test]
    fn test_history_rollup_latest_name_wins() {
        // Owner renames between seasons; input arrives newest-first.
        let seasons = vec![
            season(2024, vec![owner_standing("a", "New Name", 7.0, 7.0, 1500.0)]),
            season(2022, vec![owner_standing("a", "Old Name", 7.0, 7.0, 1500.0)]),
        ];
        let rollup = rollup_history(&seasons);
        assert_eq!(rollup[0].display_name, "New Name");
    }

    #[test]
    fn test_history_rollup_empty() {
        assert!(rollup_history(&[]).is_empty());
    }

    fn benchmark_result(user_qb_week: f64, league_qb_week: f64) -> LeagueBenchmarkResult {
        let stats = |avg_week: f64| PositionStats {
            position: Position::QB,
            total_points: avg_week * 14.0,
            starter_count: 14.0,
            games_played: 14,
            avg_points_per_week: avg_week,
            avg_points_per_starter: avg_week,
        };
        LeagueBenchmarkResult {
            league_id: "1".to_string(),
            league_name: "L".to_string(),
            user_stats: HashMap::from([(Position::QB, stats(user_qb_week))]),
            league_average_stats: HashMap::from([(Position::QB, stats(league_qb_week))]),
            player_impacts: vec![],
            all_roster_stats: HashMap::new(),
            roster_meta: HashMap::<String, RosterMeta>::new(),
        }
    }

    #[test]
    fn test_positional_rollup_counts_only_complete_pairs() {
        let mut partial = benchmark_result(30.0, 30.0);
        partial.league_average_stats.clear();

        let results = vec![
            benchmark_result(20.0, 16.0),
            benchmark_result(24.0, 20.0),
            partial,
        ];
        let rollup = rollup_positional(&results);

        let qb = rollup.iter().find(|p| p.position == Position::QB).unwrap();
        assert_eq!(qb.leagues_counted, 2);
        assert_eq!(qb.user_avg_points_per_week, 22.0);
        assert_eq!(qb.league_avg_points_per_week, 18.0);
        assert_eq!(qb.diff_points(), 4.0);

        // Positions with no data still appear, zeroed.
        let te = rollup.iter().find(|p| p.position == Position::TE).unwrap();
        assert_eq!(te.leagues_counted, 0);
        assert_eq!(te.diff_pct(), 0.0);
    }

    #[test]
    fn test_positional_rollup_diff_pct() {
        let rollup = rollup_positional(&[benchmark_result(22.0, 20.0)]);
        let qb = rollup.iter().find(|p| p.position == Position::QB).unwrap();
        assert_eq!(qb.diff_pct(), 10.0);
    }

    fn performance(league_id: &str, rank: u32, made_playoffs: bool) -> LeaguePerformance {
        LeaguePerformance {
            league_id: league_id.to_string(),
            league_name: league_id.to_string(),
            roster_id: 1,
            rank,
            made_playoffs,
            points_for: 1500.0,
        }
    }

    #[test]
    fn test_season_summary() {
        let results = vec![
            performance("a", 1, true),
            performance("b", 3, true),
            performance("c", 8, false),
            performance("d", 4, true),
        ];
        let summary = summarize_performance(&results);
        assert_eq!(summary.leagues, 4);
        assert_eq!(summary.avg_finish, 4.0);
        assert_eq!(summary.championships, 1);
        assert_eq!(summary.podiums, 2);
        assert_eq!(summary.playoff_rate, 75.0);
    }

    #[test]
    fn test_season_summary_empty() {
        let summary = summarize_performance(&[]);
        assert_eq!(summary.leagues, 0);
        assert_eq!(summary.avg_finish, 0.0);
        assert_eq!(summary.playoff_rate, 0.0);
    }

    fn directory() -> PlayerDirectory {
        PlayerDirectory::from_refs([
            PlayerRef {
                player_id: "qb1".to_string(),
                name: "Star QB".to_string(),
                position: Position::QB,
            },
            PlayerRef {
                player_id: "rb1".to_string(),
                name: "Star RB".to_string(),
                position: Position::RB,
            },
            PlayerRef {
                player_id: "ls1".to_string(),
                name: "Long Snapper".to_string(),
                position: Position::Other,
            },
        ])
    }

    fn holding(league_id: &str, players: &[&str], starters: &[&str]) -> LeagueHolding {
        LeagueHolding {
            league_id: league_id.to_string(),
            players: players.iter().map(|s| s.to_string()).collect(),
            starters: starters.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_portfolio_counts_and_exposure() {
        let holdings = vec![
            holding("l1", &["qb1", "rb1"], &["qb1"]),
            holding("l2", &["qb1"], &["qb1"]),
            holding("l3", &["rb1"], &[]),
        ];
        let shares = build_portfolio(&holdings, 4, &directory());

        let qb = shares.iter().find(|s| s.player_id == "qb1").unwrap();
        assert_eq!(qb.shares, 2);
        assert_eq!(qb.starter_count, 2);
        assert_eq!(qb.bench_count, 0);
        assert_eq!(qb.exposure, 50.0);
        assert_eq!(qb.league_ids, vec!["l1", "l2"]);

        let rb = shares.iter().find(|s| s.player_id == "rb1").unwrap();
        assert_eq!(rb.shares, 2);
        assert_eq!(rb.starter_count, 0);
        assert_eq!(rb.bench_count, 2);
    }

    #[test]
    fn test_portfolio_drops_unscored_positions() {
        let holdings = vec![holding("l1", &["ls1", "mystery_id"], &[])];
        let shares = build_portfolio(&holdings, 1, &directory());
        assert!(shares.is_empty());
    }

    #[test]
    fn test_portfolio_from_matchup_holding() {
        let record = WeeklyMatchupRecord {
            roster_id: 1,
            matchup_id: Some(1),
            players: Some(vec!["qb1".to_string(), "rb1".to_string()]),
            starters: Some(vec!["qb1".to_string()]),
            starters_points: Some(vec![20.0]),
            points: 20.0,
        };
        let holding = LeagueHolding::from_matchup("l1", &record);
        assert_eq!(holding.players.len(), 2);
        assert_eq!(holding.starters, vec!["qb1"]);
    }
}
