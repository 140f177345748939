//! Tiered TTL cache.
//!
//! Two scopes with independent lifetimes: `Session` entries live in memory
//! for the life of the process, `Local` entries persist across runs in a
//! single JSON file under the cache directory. Expiry is checked lazily on
//! read; there is no background eviction. A failed persist is logged and
//! dropped — a cache miss must always be safe to treat as "recompute from
//! source".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Namespace prefix so persisted entries can't collide with unrelated data
/// sharing the store.
const KEY_PREFIX: &str = "leaguelens_";

const LOCAL_FILE: &str = "local_cache.json";

/// Default TTL when a call site doesn't specify one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Observed TTLs per data class.
pub mod ttl {
    use std::time::Duration;

    /// Username → user lookups.
    pub const USER: Duration = Duration::from_secs(24 * 60 * 60);
    /// Per-(user, season) league lists.
    pub const LEAGUE_LIST: Duration = Duration::from_secs(12 * 60 * 60);
    /// Season-list probes.
    pub const ACTIVE_SEASONS: Duration = Duration::from_secs(6 * 60 * 60);
    /// Matchups/rosters for an in-progress season.
    pub const IN_PROGRESS: Duration = Duration::from_secs(15 * 60);
    /// Matchups/rosters for a completed season.
    pub const COMPLETED: Duration = Duration::from_secs(24 * 60 * 60);
    /// Analysis results for a completed season.
    pub const COMPLETED_ANALYSIS: Duration = Duration::from_secs(7 * 24 * 60 * 60);
    /// League metadata for a completed season (immutable upstream).
    pub const COMPLETED_LEAGUE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
}

/// Which tier an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// In-memory, cleared when the process exits.
    Session,
    /// Persisted across runs.
    Local,
}

/// A stored payload with its expiry bounds (epoch milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: i64,
    pub expires: i64,
}

impl CacheEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        // `expires` is exclusive: an entry is live only while now < expires,
        // so a zero-TTL entry is already expired at its own timestamp.
        now_ms >= self.expires
    }
}

/// Deterministic fingerprint of a compound cache key, for keys built from
/// several free-form inputs. First 16 hex chars of SHA-256, like entity ids.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// The tiered cache. Entries are independently keyed, so concurrent writers
/// to different keys never conflict; duplicate writers to the same key race
/// harmlessly (last write wins, values are equivalent for identical inputs).
pub struct TieredCache {
    session: Mutex<HashMap<String, CacheEntry>>,
    local: Mutex<Option<HashMap<String, CacheEntry>>>,
    local_path: PathBuf,
}

impl TieredCache {
    /// Create a cache persisting its local scope under `cache_dir`.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            session: Mutex::new(HashMap::new()),
            local: Mutex::new(None),
            local_path: cache_dir.join(LOCAL_FILE),
        }
    }

    /// Read a value; a hit is returned only while unexpired. Expired entries
    /// are evicted on the spot and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str, scope: Scope) -> Option<T> {
        let key = namespaced(key);
        let now = now_ms();

        let entry = match scope {
            Scope::Session => {
                let mut store = self.session.lock().expect("session cache lock poisoned");
                match store.get(&key) {
                    Some(e) if e.is_expired(now) => {
                        store.remove(&key);
                        None
                    }
                    other => other.cloned(),
                }
            }
            Scope::Local => {
                let mut guard = self.local.lock().expect("local cache lock poisoned");
                let store = guard.get_or_insert_with(|| load_local(&self.local_path));
                match store.get(&key) {
                    Some(e) if e.is_expired(now) => {
                        store.remove(&key);
                        persist_local(&self.local_path, store);
                        None
                    }
                    other => other.cloned(),
                }
            }
        }?;

        match serde_json::from_value(entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "cached payload no longer deserializes, discarding");
                None
            }
        }
    }

    /// Write a value, always overwriting any prior entry for the key.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, scope: Scope, ttl: Duration) {
        let data = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize cache payload, dropping write");
                return;
            }
        };

        let now = now_ms();
        let entry = CacheEntry {
            data,
            timestamp: now,
            expires: now + ttl.as_millis() as i64,
        };
        let key = namespaced(key);

        match scope {
            Scope::Session => {
                self.session
                    .lock()
                    .expect("session cache lock poisoned")
                    .insert(key, entry);
            }
            Scope::Local => {
                let mut guard = self.local.lock().expect("local cache lock poisoned");
                let store = guard.get_or_insert_with(|| load_local(&self.local_path));
                store.insert(key, entry);
                persist_local(&self.local_path, store);
            }
        }
    }

    /// Remove a key from both scopes.
    pub fn remove(&self, key: &str) {
        let key = namespaced(key);
        self.session
            .lock()
            .expect("session cache lock poisoned")
            .remove(&key);

        let mut guard = self.local.lock().expect("local cache lock poisoned");
        let store = guard.get_or_insert_with(|| load_local(&self.local_path));
        if store.remove(&key).is_some() {
            persist_local(&self.local_path, store);
        }
    }

    /// Drop every namespaced entry in both scopes.
    pub fn clear(&self) {
        self.session
            .lock()
            .expect("session cache lock poisoned")
            .clear();

        let mut guard = self.local.lock().expect("local cache lock poisoned");
        let store = guard.insert(HashMap::new());
        persist_local(&self.local_path, store);
    }
}

fn namespaced(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn load_local(path: &Path) -> HashMap<String, CacheEntry> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return HashMap::new();
    };
    match serde_json::from_str::<HashMap<String, CacheEntry>>(&raw) {
        Ok(store) => store,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local cache file unreadable, starting empty");
            HashMap::new()
        }
    }
}

/// Persist the local store; failures (quota, permissions) are logged and
/// swallowed so execution continues uncached.
fn persist_local(path: &Path, store: &HashMap<String, CacheEntry>) {
    let result = (|| -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(store).map_err(std::io::Error::other)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    })();

    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "failed to persist local cache, write dropped");
    }
}
