//! Scan orchestrator.
//!
//! Joins the client and the analysis engines:
//! 1. Discover leagues (season lists, history chains)
//! 2. Fetch rosters, users and weekly records in paced batches
//! 3. Run the analyzers per league-season
//! 4. Cache analysis results and fold them into rollups
//!
//! Every league-season is an independently fallible unit: a failed fetch or
//! analysis is logged and excluded from rollups, never aborting the scan.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{
    analyzed_weeks, build_portfolio, compute_benchmarks, compute_expected_wins, resolve_final_rank,
    rollup_history, LeagueHolding, OwnerAverages, PlayerShare,
};
use crate::cache::{fingerprint, ttl, Scope};
use crate::client::{BatchOptions, ClientError, SleeperClient};
use crate::models::{
    LeagueBenchmarkResult, LeaguePerformance, LeagueSnapshot, LeagueStatus, LeagueUser,
    OwnerStanding, PlayerDirectory, Roster, SeasonStandings, WeekRecords,
};
use crate::progress::{CancelToken, PhaseProgress, ProgressSink};

/// Errors from scan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("username {0:?} not found")]
    UserNotFound(String),

    #[error("league {0} not found")]
    LeagueNotFound(String),
}

/// Batch sizing for scans. Analysis batches are smaller than raw fetch
/// batches because each analysis unit fans out into many week fetches.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub fetch: BatchOptions,
    pub analysis_batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            fetch: BatchOptions::default(),
            analysis_batch_size: 3,
        }
    }
}

/// TTL for a cached analysis of this league: completed seasons are immutable
/// upstream, in-progress ones go stale within the week's scoring window.
fn analysis_ttl(league: &LeagueSnapshot) -> std::time::Duration {
    if league.status == LeagueStatus::Complete {
        ttl::COMPLETED_ANALYSIS
    } else {
        ttl::IN_PROGRESS
    }
}

/// Join raw standings with owner identity and display metadata. Rosters
/// without an owner are dropped: they cannot be keyed across seasons.
fn join_owner_standings(
    standings: Vec<crate::models::ExpectedWinsStanding>,
    rosters: &[Roster],
    users: &[LeagueUser],
) -> Vec<OwnerStanding> {
    let owner_by_roster: HashMap<u32, &str> = rosters
        .iter()
        .filter_map(|r| Some((r.roster_id, r.owner_id.as_deref()?)))
        .collect();

    standings
        .into_iter()
        .filter_map(|standing| {
            let owner_id = owner_by_roster.get(&standing.roster_id)?.to_string();
            let user = users.iter().find(|u| u.user_id == owner_id);
            Some(OwnerStanding {
                display_name: user
                    .map(|u| u.display_name.clone())
                    .unwrap_or_else(|| owner_id.clone()),
                team_name: user.and_then(|u| u.team_name().map(str::to_string)),
                owner_id,
                standing,
            })
        })
        .collect()
}

pub struct Scanner {
    client: Arc<SleeperClient>,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(client: Arc<SleeperClient>, options: ScanOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &SleeperClient {
        &self.client
    }

    /// Resolve a username to its user profile; an unknown username is an
    /// error at this layer, not an empty result.
    pub async fn resolve_user_id(&self, username: &str) -> Result<LeagueUser, ScanError> {
        self.client
            .resolve_user(username)
            .await?
            .ok_or_else(|| ScanError::UserNotFound(username.to_string()))
    }

    /// Fetch one league's weekly records for a week range, in paced batches.
    /// A week that fails to fetch fails the whole league-season; the caller
    /// excludes the unit.
    async fn fetch_weeks(
        &self,
        league_id: &str,
        weeks: &[u32],
    ) -> Result<Vec<WeekRecords>, ClientError> {
        let mut out = Vec::with_capacity(weeks.len());
        for batch in weeks.chunks(self.options.fetch.batch_size.max(1)) {
            let fetches = batch.iter().map(|&week| async move {
                let records = self.client.get_matchups(league_id, week).await?;
                Ok::<_, ClientError>(WeekRecords { week, records })
            });
            for result in join_all(fetches).await {
                out.push(result?);
            }
            tokio::time::sleep(self.options.fetch.delay).await;
        }
        Ok(out)
    }

    /// Expected-wins standings for one league season, joined with owner
    /// metadata. Regular-season weeks only: playoff weeks sideline half the
    /// league and would skew the all-play denominator.
    pub async fn analyze_league(
        &self,
        league: &LeagueSnapshot,
    ) -> Result<SeasonStandings, ScanError> {
        let key = format!("analysis_expected_{}", league.league_id);
        if let Some(cached) = self.client.cache().get(&key, Scope::Local) {
            return Ok(cached);
        }

        let weeks: Vec<u32> =
            (league.settings.start_week()..league.settings.playoff_week_start()).collect();
        let records = self.fetch_weeks(&league.league_id, &weeks).await?;
        let rosters = self.client.get_rosters(&league.league_id).await?;
        let users = self.client.get_users(&league.league_id).await?;

        let standings = join_owner_standings(compute_expected_wins(&records), &rosters, &users);
        let result = SeasonStandings {
            league_id: league.league_id.clone(),
            season: league.season_year(),
            standings,
        };
        self.client
            .cache()
            .set(&key, &result, Scope::Local, analysis_ttl(league));
        Ok(result)
    }

    /// Positional benchmarks for one owner in one league season.
    pub async fn analyze_positional(
        &self,
        league: &LeagueSnapshot,
        target_owner: &str,
        include_playoffs: bool,
        directory: &PlayerDirectory,
    ) -> Result<LeagueBenchmarkResult, ScanError> {
        let key = format!(
            "analysis_positional_{}",
            fingerprint(&[
                &league.league_id,
                target_owner,
                if include_playoffs { "true" } else { "false" },
            ])
        );
        if let Some(cached) = self.client.cache().get(&key, Scope::Local) {
            return Ok(cached);
        }

        let weeks = analyzed_weeks(&league.settings, include_playoffs);
        let records = self.fetch_weeks(&league.league_id, &weeks).await?;
        let rosters = self.client.get_rosters(&league.league_id).await?;
        let users = self.client.get_users(&league.league_id).await?;

        let result = compute_benchmarks(
            league,
            &records,
            &rosters,
            &users,
            directory,
            target_owner,
            include_playoffs,
        );
        self.client
            .cache()
            .set(&key, &result, Scope::Local, analysis_ttl(league));
        Ok(result)
    }

    /// Analyze every season of a league's history chain and fold the
    /// standings into per-owner career averages.
    ///
    /// Seasons run in small batches; a season that fails to analyze is
    /// logged and excluded. Cancellation is checked at batch boundaries —
    /// a cancelled scan returns the rollup of whatever completed.
    pub async fn league_history_rollup(
        &self,
        league_id: &str,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Vec<OwnerAverages>, ScanError> {
        let chain = self.client.walk_history(league_id).await;
        if chain.is_empty() {
            return Err(ScanError::LeagueNotFound(league_id.to_string()));
        }

        let total = chain.len();
        let mut completed = 0usize;
        let mut seasons: Vec<SeasonStandings> = Vec::new();

        for batch in chain.chunks(self.options.analysis_batch_size.max(1)) {
            if cancel.is_cancelled() {
                break;
            }

            let analyses = batch.iter().map(|league| async move {
                (league, self.analyze_league(league).await)
            });
            for (league, result) in join_all(analyses).await {
                completed += 1;
                if cancel.is_cancelled() {
                    continue;
                }
                match result {
                    Ok(standings) => seasons.push(standings),
                    Err(e) => {
                        warn!(league_id = %league.league_id, season = %league.season, error = %e,
                              "failed to analyze season, excluding from rollup");
                    }
                }
                progress.report(completed, total);
            }

            tokio::time::sleep(self.options.fetch.delay).await;
        }

        info!(league_id, seasons = seasons.len(), of = total, "history scan finished");
        Ok(rollup_history(&seasons))
    }

    /// Final rank and playoff outcome across every league a user played in
    /// one season.
    pub async fn season_performance(
        &self,
        user_id: &str,
        season: u32,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Vec<LeaguePerformance>, ScanError> {
        let leagues: Vec<LeagueSnapshot> = self
            .client
            .list_leagues(user_id, season)
            .await?
            .into_iter()
            .filter(|l| !l.should_ignore())
            .collect();

        let total = leagues.len();
        let mut completed = 0usize;
        let mut results = Vec::new();

        for batch in leagues.chunks(self.options.fetch.batch_size.max(1)) {
            if cancel.is_cancelled() {
                break;
            }

            let fetches = batch.iter().map(|league| async move {
                let outcome = async {
                    let rosters = self.client.get_rosters(&league.league_id).await?;
                    let bracket = self.client.get_winners_bracket(&league.league_id).await?;
                    Ok::<_, ClientError>((rosters, bracket))
                }
                .await;
                (league, outcome)
            });

            for (league, outcome) in join_all(fetches).await {
                completed += 1;
                if cancel.is_cancelled() {
                    continue;
                }
                match outcome {
                    Ok((rosters, bracket)) => {
                        let mine = rosters
                            .iter()
                            .find(|r| r.owner_id.as_deref() == Some(user_id));
                        if let Some(roster) = mine {
                            let rank = resolve_final_rank(roster.roster_id, &rosters, &bracket);
                            results.push(LeaguePerformance {
                                league_id: league.league_id.clone(),
                                league_name: league.name.clone(),
                                roster_id: roster.roster_id,
                                rank: rank.rank,
                                made_playoffs: rank.made_playoffs,
                                points_for: roster.points_for(),
                            });
                        } else {
                            warn!(league_id = %league.league_id, user_id,
                                  "user has no roster in league, excluding");
                        }
                    }
                    Err(e) => {
                        warn!(league_id = %league.league_id, error = %e,
                              "failed to fetch league outcome, excluding");
                    }
                }
                progress.report(completed, total);
            }

            tokio::time::sleep(self.options.fetch.delay).await;
        }

        Ok(results)
    }

    /// Player shares across every league the user is in for one season —
    /// live roster state, or one historical week's lineups when `week` is
    /// given.
    pub async fn portfolio(
        &self,
        user_id: &str,
        season: u32,
        week: Option<u32>,
        directory: &PlayerDirectory,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Vec<PlayerShare>, ScanError> {
        let leagues = self.client.list_leagues(user_id, season).await?;
        let total_leagues = leagues.len();
        // Two fetch phases for a historical week, one for live rosters.
        let phases = if week.is_some() { 2 } else { 1 };
        let overall = total_leagues * phases;

        let rosters = {
            let mut phase = PhaseProgress::new(&mut *progress, 0, overall);
            self.client
                .fetch_all_rosters(&leagues, user_id, self.options.fetch, &mut phase, cancel)
                .await
        };

        let holdings: Vec<LeagueHolding> = match week {
            None => rosters
                .iter()
                .map(|(league_id, roster)| LeagueHolding::from_roster(league_id, roster))
                .collect(),
            Some(week) => {
                let matchups = {
                    let mut phase = PhaseProgress::new(&mut *progress, total_leagues, overall);
                    self.client
                        .fetch_all_matchups(&leagues, week, self.options.fetch, &mut phase, cancel)
                        .await
                };
                rosters
                    .iter()
                    .filter_map(|(league_id, roster)| {
                        let record = matchups
                            .get(league_id)?
                            .iter()
                            .find(|m| m.roster_id == roster.roster_id)?;
                        Some(LeagueHolding::from_matchup(league_id, record))
                    })
                    .collect()
            }
        };

        Ok(build_portfolio(&holdings, total_leagues, directory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{TieredCache, DEFAULT_TTL};
    use crate::models::{ExpectedWinsStanding, LeagueSettings, RosterRecord, UserMetadata};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn standing(roster_id: u32, expected: f64) -> ExpectedWinsStanding {
        ExpectedWinsStanding {
            roster_id,
            actual_wins: expected,
            expected_wins: expected,
            points_for: 1000.0,
            points_against: 900.0,
            active_weeks: 14,
        }
    }

    fn roster(roster_id: u32, owner_id: Option<&str>) -> Roster {
        Roster {
            roster_id,
            owner_id: owner_id.map(str::to_string),
            players: None,
            starters: None,
            settings: RosterRecord::default(),
        }
    }

    #[test]
    fn test_join_owner_standings() {
        let standings = vec![standing(1, 8.0), standing(2, 6.0), standing(3, 4.0)];
        let rosters = vec![
            roster(1, Some("ua")),
            roster(2, Some("ub")),
            // Orphaned roster: no owner to key by.
            roster(3, None),
        ];
        let users = vec![LeagueUser {
            user_id: "ua".to_string(),
            display_name: "Alpha".to_string(),
            avatar: None,
            metadata: Some(UserMetadata {
                team_name: Some("Team A".to_string()),
            }),
        }];

        let joined = join_owner_standings(standings, &rosters, &users);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].display_name, "Alpha");
        assert_eq!(joined[0].team_name.as_deref(), Some("Team A"));
        // No user profile: owner id stands in for the name.
        assert_eq!(joined[1].display_name, "ub");
    }

    fn scanner(dir: &TempDir) -> Scanner {
        let cache = Arc::new(TieredCache::new(dir.path()));
        // Unroutable base URL: any network fetch in these tests is a bug.
        let client =
            SleeperClient::new("http://127.0.0.1:9", Duration::from_millis(200), cache).unwrap();
        Scanner::new(Arc::new(client), ScanOptions::default())
    }

    fn league(league_id: &str) -> LeagueSnapshot {
        LeagueSnapshot {
            league_id: league_id.to_string(),
            name: "Cached League".to_string(),
            season: "2024".to_string(),
            status: LeagueStatus::Complete,
            total_rosters: 10,
            previous_league_id: None,
            avatar: None,
            settings: LeagueSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_analyze_league_serves_cached_result() {
        let dir = TempDir::new().unwrap();
        let scanner = scanner(&dir);
        let league = league("555");

        let cached = SeasonStandings {
            league_id: "555".to_string(),
            season: 2024,
            standings: vec![],
        };
        scanner.client.cache().set(
            "analysis_expected_555",
            &cached,
            Scope::Local,
            DEFAULT_TTL,
        );

        let result = scanner.analyze_league(&league).await.unwrap();
        assert_eq!(result.league_id, "555");
        assert_eq!(result.season, 2024);
    }

    #[tokio::test]
    async fn test_analyze_positional_cache_key_varies_by_inputs() {
        let dir = TempDir::new().unwrap();
        let scanner = scanner(&dir);

        let with_playoffs = fingerprint(&["555", "u1", "true"]);
        let without = fingerprint(&["555", "u1", "false"]);
        assert_ne!(with_playoffs, without);

        // Seed only the include_playoffs=true slot; the other must miss (and
        // here, fail on the unroutable client rather than return stale data).
        let cached = LeagueBenchmarkResult {
            league_id: "555".to_string(),
            league_name: "Cached League".to_string(),
            user_stats: HashMap::new(),
            league_average_stats: HashMap::new(),
            player_impacts: vec![],
            all_roster_stats: HashMap::new(),
            roster_meta: HashMap::new(),
        };
        scanner.client.cache().set(
            &format!("analysis_positional_{}", with_playoffs),
            &cached,
            Scope::Local,
            DEFAULT_TTL,
        );

        let directory = PlayerDirectory::default();
        let hit = scanner
            .analyze_positional(&league("555"), "u1", true, &directory)
            .await;
        assert!(hit.is_ok());

        let miss = scanner
            .analyze_positional(&league("555"), "u1", false, &directory)
            .await;
        assert!(miss.is_err());
    }
}
