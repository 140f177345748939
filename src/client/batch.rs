//! Bounded-batch concurrent fetching across many leagues.
//!
//! The remote source is rate-limited, so multi-league fetches run in small
//! concurrent batches with a fixed pacing delay between them. Within a batch
//! the fetches are joined before the next batch is scheduled. Each unit is
//! independently fallible: a failed fetch is logged and excluded, never
//! aborting the run.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::warn;

use crate::cache::{ttl, Scope};
use crate::models::{LeagueSnapshot, LeagueStatus, Roster, WeeklyMatchupRecord};
use crate::progress::{CancelToken, ProgressSink};

use super::SleeperClient;

/// The target owner's roster per league id.
pub type RostersByLeague = HashMap<String, Roster>;

/// One week's matchup records per league id.
pub type MatchupsByLeague = HashMap<String, Vec<WeeklyMatchupRecord>>;

/// Batch sizing and pacing for multi-league fetches.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Concurrent fetches per batch.
    pub batch_size: usize,
    /// Pause between batches.
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl BatchOptions {
    fn chunk(&self) -> usize {
        self.batch_size.max(1)
    }
}

fn roster_ttl(league: &LeagueSnapshot) -> Duration {
    if league.status == LeagueStatus::Complete {
        ttl::COMPLETED
    } else {
        ttl::IN_PROGRESS
    }
}

impl SleeperClient {
    /// Fetch every league's rosters and keep the one owned by `owner_id`.
    ///
    /// Cache hits are drained up front (and reported as completed) before any
    /// network batch is scheduled. Cancellation is checked at each batch
    /// boundary and before results are applied: a cancelled run lets the
    /// in-flight batch finish — populating the cache for later reuse — but
    /// discards its results.
    pub async fn fetch_all_rosters(
        &self,
        leagues: &[LeagueSnapshot],
        owner_id: &str,
        options: BatchOptions,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> RostersByLeague {
        let total = leagues.len();
        let mut completed = 0usize;
        let mut results = RostersByLeague::new();
        let mut to_fetch: Vec<&LeagueSnapshot> = Vec::new();

        for league in leagues {
            let key = format!("rosters_{}", league.league_id);
            match self.cache().get::<Vec<Roster>>(&key, Scope::Session) {
                Some(rosters) => {
                    if let Some(mine) = owned_roster(&rosters, owner_id) {
                        results.insert(league.league_id.clone(), mine);
                    }
                    completed += 1;
                    progress.report(completed, total);
                }
                None => to_fetch.push(league),
            }
        }

        for batch in to_fetch.chunks(options.chunk()) {
            if cancel.is_cancelled() {
                return results;
            }

            let fetches = batch.iter().map(|league| async move {
                let rosters = match self.get_rosters(&league.league_id).await {
                    Ok(rosters) => {
                        let key = format!("rosters_{}", league.league_id);
                        self.cache()
                            .set(&key, &rosters, Scope::Session, roster_ttl(league));
                        Some(rosters)
                    }
                    Err(e) => {
                        warn!(league_id = %league.league_id, error = %e,
                              "failed to fetch rosters, excluding league");
                        None
                    }
                };
                (league.league_id.as_str(), rosters)
            });

            for (league_id, rosters) in join_all(fetches).await {
                completed += 1;
                if cancel.is_cancelled() {
                    continue;
                }
                if let Some(mine) = rosters.as_deref().and_then(|r| owned_roster(r, owner_id)) {
                    results.insert(league_id.to_string(), mine);
                }
                progress.report(completed, total);
            }

            tokio::time::sleep(options.delay).await;
        }

        results
    }

    /// Fetch one week's matchup records for every league.
    pub async fn fetch_all_matchups(
        &self,
        leagues: &[LeagueSnapshot],
        week: u32,
        options: BatchOptions,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> MatchupsByLeague {
        let total = leagues.len();
        let mut completed = 0usize;
        let mut results = MatchupsByLeague::new();

        for batch in leagues.chunks(options.chunk()) {
            if cancel.is_cancelled() {
                return results;
            }

            let fetches = batch.iter().map(|league| async move {
                let key = format!("matchups_{}_{}", league.league_id, week);
                if let Some(cached) = self
                    .cache()
                    .get::<Vec<WeeklyMatchupRecord>>(&key, Scope::Session)
                {
                    return (league.league_id.as_str(), Some(cached));
                }

                match self.get_matchups_uncached(&league.league_id, week).await {
                    Ok(matchups) => {
                        self.cache()
                            .set(&key, &matchups, Scope::Session, roster_ttl(league));
                        (league.league_id.as_str(), Some(matchups))
                    }
                    Err(e) => {
                        warn!(league_id = %league.league_id, week, error = %e,
                              "failed to fetch matchups, excluding league");
                        (league.league_id.as_str(), None)
                    }
                }
            });

            for (league_id, matchups) in join_all(fetches).await {
                completed += 1;
                if cancel.is_cancelled() {
                    continue;
                }
                if let Some(matchups) = matchups {
                    results.insert(league_id.to_string(), matchups);
                }
                progress.report(completed, total);
            }

            tokio::time::sleep(options.delay).await;
        }

        results
    }
}

fn owned_roster(rosters: &[Roster], owner_id: &str) -> Option<Roster> {
    rosters
        .iter()
        .find(|r| r.owner_id.as_deref() == Some(owner_id))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{TieredCache, DEFAULT_TTL};
    use crate::models::{LeagueSettings, RosterRecord};
    use crate::progress::NullProgress;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn offline_client(dir: &TempDir) -> SleeperClient {
        let cache = Arc::new(TieredCache::new(dir.path()));
        SleeperClient::new("http://127.0.0.1:9", Duration::from_millis(200), cache).unwrap()
    }

    fn league(league_id: &str) -> LeagueSnapshot {
        LeagueSnapshot {
            league_id: league_id.to_string(),
            name: "L".to_string(),
            season: "2024".to_string(),
            status: LeagueStatus::Complete,
            total_rosters: 10,
            previous_league_id: None,
            avatar: None,
            settings: LeagueSettings::default(),
        }
    }

    fn roster(roster_id: u32, owner_id: &str) -> Roster {
        Roster {
            roster_id,
            owner_id: Some(owner_id.to_string()),
            players: None,
            starters: None,
            settings: RosterRecord::default(),
        }
    }

    #[tokio::test]
    async fn test_cached_rosters_skip_the_network() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        let leagues = vec![league("l1"), league("l2")];
        for l in &leagues {
            client.cache().set(
                &format!("rosters_{}", l.league_id),
                &vec![roster(1, "me"), roster(2, "them")],
                Scope::Session,
                DEFAULT_TTL,
            );
        }

        let mut reports = Vec::new();
        let mut progress = |completed: usize, total: usize| reports.push((completed, total));
        let results = client
            .fetch_all_rosters(
                &leagues,
                "me",
                BatchOptions::default(),
                &mut progress,
                &CancelToken::new(),
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["l1"].roster_id, 1);
        assert_eq!(reports, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_failed_league_is_excluded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        // l1 is cached; l2 has to hit the unroutable network and drops out.
        let leagues = vec![league("l1"), league("l2")];
        client.cache().set(
            "rosters_l1",
            &vec![roster(1, "me")],
            Scope::Session,
            DEFAULT_TTL,
        );

        let mut progress = NullProgress;
        let results = client
            .fetch_all_rosters(
                &leagues,
                "me",
                BatchOptions::default(),
                &mut progress,
                &CancelToken::new(),
            )
            .await;

        assert_eq!(results.len(), 1);
        assert!(results.contains_key("l1"));
    }

    #[tokio::test]
    async fn test_cancelled_run_discards_results() {
        let dir = TempDir::new().unwrap();
        let client = offline_client(&dir);
        let leagues = vec![league("l1")];
        client.cache().set(
            "matchups_l1_3",
            &Vec::<WeeklyMatchupRecord>::new(),
            Scope::Session,
            DEFAULT_TTL,
        );

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut progress = NullProgress;
        let results = client
            .fetch_all_matchups(&leagues, 3, BatchOptions::default(), &mut progress, &cancel)
            .await;
        assert!(results.is_empty());
    }
}
