//! Positional benchmarks and player impact over league average (POLA).

use std::collections::HashMap;

use crate::models::{
    LeagueBenchmarkResult, LeagueSettings, LeagueSnapshot, LeagueUser, PlayerDirectory,
    PlayerImpact, Position, PositionStats, Roster, RosterMeta, WeekRecords, SCORED_POSITIONS,
};

/// The weeks a benchmark run analyzes: regular season always, playoff weeks
/// only when requested. An inverted range yields no weeks (and all-zero
/// stats) rather than failing.
pub fn analyzed_weeks(settings: &LeagueSettings, include_playoffs: bool) -> Vec<u32> {
    let start = settings.start_week();
    let end = if include_playoffs {
        settings.last_scored_week()
    } else {
        settings.playoff_week_start().saturating_sub(1)
    };
    if end < start {
        return Vec::new();
    }
    (start..=end).collect()
}

#[derive(Default, Clone, Copy)]
struct PosAccum {
    points: f64,
    count: u32,
}

struct ImpactAccum {
    total_pola: f64,
    weeks: u32,
    position: Position,
    started_weeks: Vec<u32>,
}

/// Compute the full positional-benchmark output for one league season.
///
/// `weeks` may span the whole season; the analyzed range is derived from the
/// snapshot's settings and `include_playoffs`, and anything outside it is
/// ignored. Only active records are counted, starters at unscored positions
/// are skipped, and a missing points array reads as all-zero.
///
/// The league-average stats are normalized to the *target owner's* games
/// played, so user-vs-league comparisons share a denominator; the
/// points-per-starter efficiency ratio is left unnormalized.
pub fn compute_benchmarks(
    snapshot: &LeagueSnapshot,
    weeks: &[WeekRecords],
    rosters: &[Roster],
    users: &[LeagueUser],
    directory: &PlayerDirectory,
    target_owner: &str,
    include_playoffs: bool,
) -> LeagueBenchmarkResult {
    let range = analyzed_weeks(&snapshot.settings, include_playoffs);

    // roster id → owner id, plus display metadata per owner.
    let mut roster_to_owner: HashMap<u32, String> = HashMap::new();
    let mut roster_meta: HashMap<String, RosterMeta> = HashMap::new();
    for roster in rosters {
        let Some(owner_id) = roster.owner_id.clone() else {
            continue;
        };
        roster_to_owner.insert(roster.roster_id, owner_id.clone());
        if let Some(user) = users.iter().find(|u| u.user_id == owner_id) {
            roster_meta.insert(
                owner_id.clone(),
                RosterMeta {
                    user_id: owner_id,
                    display_name: user.display_name.clone(),
                    avatar: user.avatar.clone(),
                    team_name: user.team_name().map(str::to_string),
                },
            );
        }
    }

    // Accumulators across the analyzed range.
    let mut owner_pos: HashMap<String, HashMap<Position, PosAccum>> = roster_meta
        .keys()
        .map(|owner| (owner.clone(), HashMap::new()))
        .collect();
    let mut owner_weeks: HashMap<String, u32> = HashMap::new();
    let mut impacts: HashMap<(String, String), ImpactAccum> = HashMap::new();
    let mut league_pos: HashMap<Position, PosAccum> = HashMap::new();
    let mut league_active_weeks: u32 = 0;

    for week in weeks {
        if !range.contains(&week.week) {
            continue;
        }

        // Per-week efficiency baseline: league points per starter at each
        // position this week. Averaging weekly baselines (rather than one
        // season-long average) lets hot/cold streaks and byes wash out
        // across players who started different numbers of weeks.
        let mut week_pos: HashMap<Position, PosAccum> = HashMap::new();
        let mut active_this_week: u32 = 0;

        for rec in week.active() {
            active_this_week += 1;
            for (player_id, points) in rec.starter_lines() {
                let position = directory.position_of(player_id);
                if !position.is_scored() {
                    continue;
                }
                let acc = week_pos.entry(position).or_default();
                acc.points += points;
                acc.count += 1;
            }
        }

        let baseline = |position: Position| -> f64 {
            match week_pos.get(&position) {
                Some(acc) if acc.count > 0 => acc.points / acc.count as f64,
                _ => 0.0,
            }
        };

        for rec in week.active() {
            let Some(owner_id) = roster_to_owner.get(&rec.roster_id) else {
                continue;
            };
            *owner_weeks.entry(owner_id.clone()).or_default() += 1;

            for (player_id, points) in rec.starter_lines() {
                let position = directory.position_of(player_id);
                if !position.is_scored() {
                    continue;
                }

                let acc = owner_pos
                    .entry(owner_id.clone())
                    .or_default()
                    .entry(position)
                    .or_default();
                acc.points += points;
                acc.count += 1;

                let league_acc = league_pos.entry(position).or_default();
                league_acc.points += points;
                league_acc.count += 1;

                let impact = impacts
                    .entry((owner_id.clone(), player_id.to_string()))
                    .or_insert_with(|| ImpactAccum {
                        total_pola: 0.0,
                        weeks: 0,
                        position,
                        started_weeks: Vec::new(),
                    });
                impact.total_pola += points - baseline(position);
                impact.weeks += 1;
                impact.started_weeks.push(week.week);
            }
        }

        league_active_weeks += active_this_week;
    }

    // Per-owner position stats, every scored position materialized so a
    // missing key is an explicit zero rather than an absent entry.
    let mut all_roster_stats: HashMap<String, HashMap<Position, PositionStats>> = HashMap::new();
    for (owner_id, positions) in &owner_pos {
        let games_played = owner_weeks.get(owner_id).copied().unwrap_or(0);
        let mut stats = HashMap::new();
        for position in SCORED_POSITIONS {
            let stat = match positions.get(&position) {
                Some(acc) => PositionStats {
                    position,
                    total_points: acc.points,
                    starter_count: acc.count as f64,
                    games_played,
                    avg_points_per_week: acc.points / games_played.max(1) as f64,
                    avg_points_per_starter: acc.points / acc.count as f64,
                },
                None => PositionStats::empty(position, games_played),
            };
            stats.insert(position, stat);
        }
        all_roster_stats.insert(owner_id.clone(), stats);
    }

    // League averages on the target owner's denominator.
    let target_weeks = owner_weeks.get(target_owner).copied().unwrap_or(0);
    let league_weeks_divisor = league_active_weeks.max(1) as f64;
    let mut league_average_stats = HashMap::new();
    for position in SCORED_POSITIONS {
        let acc = league_pos.get(&position).copied().unwrap_or_default();
        let per_team_week = acc.points / league_weeks_divisor;
        league_average_stats.insert(
            position,
            PositionStats {
                position,
                total_points: per_team_week * target_weeks.max(1) as f64,
                starter_count: acc.count as f64 / league_weeks_divisor,
                games_played: target_weeks,
                avg_points_per_week: per_team_week,
                avg_points_per_starter: if acc.count > 0 {
                    acc.points / acc.count as f64
                } else {
                    0.0
                },
            },
        );
    }

    let mut player_impacts: Vec<PlayerImpact> = impacts
        .into_iter()
        .map(|((owner_id, player_id), acc)| {
            let owner_name = roster_meta
                .get(&owner_id)
                .map(|m| m.display_name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            PlayerImpact {
                name: directory.name_of(&player_id).to_string(),
                player_id,
                position: acc.position,
                avg_pola: acc.total_pola / acc.weeks.max(1) as f64,
                total_pola: acc.total_pola,
                weeks_started: acc.weeks,
                owner_id,
                owner_name,
                started_weeks: HashMap::from([(snapshot.season.clone(), acc.started_weeks)]),
            }
        })
        .collect();
    player_impacts.sort_by(|a, b| b.total_pola.total_cmp(&a.total_pola));

    let user_stats = all_roster_stats.get(target_owner).cloned().unwrap_or_default();

    LeagueBenchmarkResult {
        league_id: snapshot.league_id.clone(),
        league_name: snapshot.name.clone(),
        user_stats,
        league_average_stats,
        player_impacts,
        all_roster_stats,
        roster_meta,
    }
}
