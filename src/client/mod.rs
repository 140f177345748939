//! Typed wrapper around the remote league API.
//!
//! Every operation is a read-only, idempotent GET. Responses are cached in
//! the tiered cache with per-data-class TTLs; a 404 surfaces as "no result"
//! rather than an error, so callers treat an absent user or league as a
//! valid empty outcome.

mod batch;

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{ttl, Scope, TieredCache, DEFAULT_TTL};
use crate::models::{
    BracketEdge, LeagueSnapshot, LeagueStatus, LeagueUser, Roster, WeeklyMatchupRecord,
};

/// Earliest season the remote source has data for.
const FIRST_SEASON: u32 = 2017;

/// Hard cap on history-chain traversal; guards against malformed or cyclic
/// `previous_league_id` links.
const MAX_HISTORY_HOPS: usize = 20;

/// Errors from remote fetches.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("unexpected response shape from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only client for the league data API.
pub struct SleeperClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<TieredCache>,
}

impl SleeperClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        cache: Arc<TieredCache>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    /// GET an endpoint and decode the JSON body. 404 yields `None`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ClientError> {
        let endpoint = format!("{}/{}", self.base_url, path);
        url::Url::parse(&endpoint)?;
        debug!(%endpoint, "fetching");

        let resp = self.http.get(&endpoint).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = resp.text().await?;
        // The API returns a bare `null` for some missing resources.
        if body.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| ClientError::Decode { endpoint, source })
    }

    /// Like `get_json` but collections: missing resource reads as empty.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        Ok(self.get_json(path).await?.unwrap_or_default())
    }

    /// Look up a user by username. `None` means the username doesn't exist.
    pub async fn resolve_user(&self, username: &str) -> Result<Option<LeagueUser>, ClientError> {
        let key = format!("user_{}", username.to_lowercase());
        if let Some(user) = self.cache.get(&key, Scope::Local) {
            return Ok(Some(user));
        }

        let user: Option<LeagueUser> = self.get_json(&format!("user/{}", username)).await?;
        if let Some(user) = &user {
            self.cache.set(&key, user, Scope::Local, ttl::USER);
        }
        Ok(user)
    }

    /// A user's leagues for one season.
    pub async fn list_leagues(
        &self,
        user_id: &str,
        season: u32,
    ) -> Result<Vec<LeagueSnapshot>, ClientError> {
        let key = format!("leagues_{}_{}", user_id, season);
        if let Some(leagues) = self.cache.get(&key, Scope::Local) {
            return Ok(leagues);
        }

        let leagues: Vec<LeagueSnapshot> = self
            .get_list(&format!("user/{}/leagues/nfl/{}", user_id, season))
            .await?;
        self.cache.set(&key, &leagues, Scope::Local, ttl::LEAGUE_LIST);
        Ok(leagues)
    }

    /// One league snapshot. Completed seasons never change upstream, so they
    /// cache far longer than in-progress ones.
    pub async fn get_league(
        &self,
        league_id: &str,
    ) -> Result<Option<LeagueSnapshot>, ClientError> {
        let key = format!("league_{}", league_id);
        if let Some(league) = self.cache.get(&key, Scope::Local) {
            return Ok(Some(league));
        }

        let league: Option<LeagueSnapshot> =
            self.get_json(&format!("league/{}", league_id)).await?;
        if let Some(league) = &league {
            let ttl = if league.status == LeagueStatus::Complete {
                ttl::COMPLETED_LEAGUE
            } else {
                DEFAULT_TTL
            };
            self.cache.set(&key, league, Scope::Local, ttl);
        }
        Ok(league)
    }

    pub async fn get_rosters(&self, league_id: &str) -> Result<Vec<Roster>, ClientError> {
        self.get_list(&format!("league/{}/rosters", league_id)).await
    }

    pub async fn get_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, ClientError> {
        self.get_list(&format!("league/{}/users", league_id)).await
    }

    /// Matchup records for one week of one league.
    pub async fn get_matchups(
        &self,
        league_id: &str,
        week: u32,
    ) -> Result<Vec<WeeklyMatchupRecord>, ClientError> {
        let key = format!("matchups_{}_{}", league_id, week);
        if let Some(matchups) = self.cache.get(&key, Scope::Session) {
            return Ok(matchups);
        }

        let matchups = self.get_matchups_uncached(league_id, week).await?;
        self.cache.set(&key, &matchups, Scope::Session, DEFAULT_TTL);
        Ok(matchups)
    }

    /// Matchup fetch bypassing the cache; batch fetchers apply their own
    /// status-dependent TTL.
    pub(crate) async fn get_matchups_uncached(
        &self,
        league_id: &str,
        week: u32,
    ) -> Result<Vec<WeeklyMatchupRecord>, ClientError> {
        self.get_list(&format!("league/{}/matchups/{}", league_id, week))
            .await
    }

    /// The winners (placement) bracket for a league season.
    pub async fn get_winners_bracket(
        &self,
        league_id: &str,
    ) -> Result<Vec<BracketEdge>, ClientError> {
        let key = format!("bracket_winners_{}", league_id);
        if let Some(bracket) = self.cache.get(&key, Scope::Session) {
            return Ok(bracket);
        }

        let bracket: Vec<BracketEdge> = self
            .get_list(&format!("league/{}/winners_bracket", league_id))
            .await?;
        self.cache.set(&key, &bracket, Scope::Session, DEFAULT_TTL);
        Ok(bracket)
    }

    /// Materialize a league's season chain, newest first, by following
    /// `previous_league_id` links. The walk is a bounded loop — never a
    /// recursion — and stops at a missing predecessor, a fetch failure, or
    /// the hop cap.
    pub async fn walk_history(&self, league_id: &str) -> Vec<LeagueSnapshot> {
        let mut chain = Vec::new();
        let mut current = Some(league_id.to_string());

        while let Some(id) = current {
            if chain.len() >= MAX_HISTORY_HOPS {
                warn!(league_id = %id, hops = chain.len(), "history chain hop cap reached");
                break;
            }

            let league = match self.get_league(&id).await {
                Ok(Some(league)) => league,
                Ok(None) => break,
                Err(e) => {
                    warn!(league_id = %id, error = %e, "failed to fetch league in history chain");
                    break;
                }
            };

            current = league.previous_league_id.clone();
            chain.push(league);
        }

        info!(league_id, seasons = chain.len(), "walked league history");
        chain
    }

    /// Seasons in which the user had at least one league, newest first.
    /// Probes every year from the source's first season to the current one.
    pub async fn active_seasons(
        &self,
        user_id: &str,
        require_played_games: bool,
    ) -> Result<Vec<u32>, ClientError> {
        let key = format!("active_seasons_{}_{}", user_id, require_played_games);
        if let Some(seasons) = self.cache.get(&key, Scope::Local) {
            return Ok(seasons);
        }

        let current_year = chrono::Utc::now().year() as u32;
        let mut seasons = Vec::new();
        for year in (FIRST_SEASON..=current_year).rev() {
            match self.list_leagues(user_id, year).await {
                Ok(leagues) if !leagues.is_empty() => {
                    if !require_played_games
                        || leagues.iter().any(|l| l.status.has_games())
                    {
                        seasons.push(year);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(user_id, year, error = %e, "season probe failed, skipping year");
                }
            }
        }

        self.cache
            .set(&key, &seasons, Scope::Local, ttl::ACTIVE_SEASONS);
        Ok(seasons)
    }
}

pub use batch::{BatchOptions, MatchupsByLeague, RostersByLeague};
