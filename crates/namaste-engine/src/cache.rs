//! Memoizing cache for external code lookups.
//!
//! Fronts the WHO ICD-11 API with a TTL'd in-memory map and a static
//! fallback table. Service failures degrade to fallback data without
//! marking the cache fresh, so the external service is retried on the
//! next call (bounded by a minimum retry interval). An optional on-disk
//! cache file lets entries survive process restarts.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use namaste_types::{well_known, MappingSource, ResolvedCode, TargetSystem};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::CacheConfig;
use crate::error::ExternalServiceError;
use crate::icd_api::ClassificationClient;

/// One memoized code lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Stable hash of (term, system); guards against corrupt disk rows.
    pub key: String,
    /// The lowercased search term.
    pub term: String,
    /// The target classification system.
    pub system: TargetSystem,
    /// The resolved code.
    pub code: String,
    /// When the entry was fetched, unix seconds.
    pub fetched_at_unix: u64,
    /// Where the code came from.
    pub source: MappingSource,
}

/// Map key: lowercased term + target system.
type Key = (String, TargetSystem);

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Key, CacheEntry>,
    /// Last external attempt per key, unix seconds. Bounds retry frequency
    /// after failures.
    last_attempt: HashMap<Key, u64>,
}

/// TTL'd cache over an external classification client.
///
/// The lock guards the read-check-then-write sequence on the backing map;
/// the network call itself happens outside the lock, so duplicate in-flight
/// lookups for the same key are possible but harmless (results are
/// idempotent per key).
pub struct IcdCodeCache {
    client: Box<dyn ClassificationClient>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl IcdCodeCache {
    /// Creates a cache over the given client.
    ///
    /// When the config names a cache file, previously persisted entries are
    /// loaded; unreadable or corrupt entries are skipped individually and
    /// never fail startup.
    pub fn new(client: Box<dyn ClassificationClient>, config: CacheConfig) -> Self {
        let mut state = CacheState::default();

        if let Some(path) = &config.cache_file {
            for entry in load_disk_entries(path) {
                state
                    .entries
                    .insert((entry.term.clone(), entry.system), entry);
            }
        }

        Self {
            client,
            config,
            state: Mutex::new(state),
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the number of cached entries.
    pub fn entry_count(&self) -> usize {
        self.state.lock().expect("cache lock poisoned").entries.len()
    }

    /// Resolves a term to a code in the target system.
    ///
    /// Order of precedence: fresh service-sourced cache entry, live
    /// external lookup, stale entry relabeled as fallback, bundled
    /// fallback table. Fails only when all four yield nothing.
    pub async fn resolve(
        &self,
        term: &str,
        system: TargetSystem,
    ) -> Result<ResolvedCode, ExternalServiceError> {
        self.resolve_at(term, system, now_unix()).await
    }

    /// Resolution against an explicit clock; `resolve` passes wall time.
    async fn resolve_at(
        &self,
        term: &str,
        system: TargetSystem,
        now: u64,
    ) -> Result<ResolvedCode, ExternalServiceError> {
        let key: Key = (term.trim().to_lowercase(), system);

        // Read-check-then-write under a single lock acquisition
        let (stale_code, attempt_allowed) = {
            let mut state = self.state.lock().expect("cache lock poisoned");

            if let Some(entry) = state.entries.get(&key) {
                let fresh = entry.source == MappingSource::ExternalService
                    && now.saturating_sub(entry.fetched_at_unix) < self.config.ttl_secs;
                if fresh {
                    return Ok(ResolvedCode {
                        code: entry.code.clone(),
                        source: MappingSource::ExternalService,
                    });
                }
            }

            let allowed = state
                .last_attempt
                .get(&key)
                .map_or(true, |last| {
                    now.saturating_sub(*last) >= self.config.retry_interval_secs
                });
            if allowed {
                state.last_attempt.insert(key.clone(), now);
            }

            let stale = state.entries.get(&key).map(|e| e.code.clone());
            (stale, allowed)
        };

        if !attempt_allowed {
            return self.degraded(
                &key,
                stale_code,
                now,
                ExternalServiceError::Unavailable {
                    reason: "external retry suppressed by minimum retry interval".to_string(),
                },
            );
        }

        match self.client.search_term(term).await {
            Ok(hits) => {
                let hit = hits.into_iter().find(|h| h.system == system);
                match hit {
                    Some(hit) => {
                        let entry = CacheEntry {
                            key: cache_key(&key.0, system),
                            term: key.0.clone(),
                            system,
                            code: hit.code.clone(),
                            fetched_at_unix: now,
                            source: MappingSource::ExternalService,
                        };
                        self.store_entry(key, entry);
                        Ok(ResolvedCode {
                            code: hit.code,
                            source: MappingSource::ExternalService,
                        })
                    }
                    None => self.degraded(
                        &key,
                        stale_code,
                        now,
                        ExternalServiceError::NoMapping {
                            term: term.to_string(),
                        },
                    ),
                }
            }
            Err(err) => {
                tracing::warn!(term, system = system.as_str(), error = %err, "external lookup failed");
                self.degraded(&key, stale_code, now, err)
            }
        }
    }

    /// Serves degraded data after an external failure or suppressed retry.
    ///
    /// A stale entry or a fallback-table hit is returned labeled as
    /// `StaticFallback` without refreshing the TTL; otherwise the terminal
    /// error is propagated.
    fn degraded(
        &self,
        key: &Key,
        stale_code: Option<String>,
        now: u64,
        terminal: ExternalServiceError,
    ) -> Result<ResolvedCode, ExternalServiceError> {
        if let Some(code) = stale_code {
            return Ok(ResolvedCode {
                code,
                source: MappingSource::StaticFallback,
            });
        }

        if let Some((tm2, biomed)) = well_known::fallback_codes(&key.0) {
            let code = match key.1 {
                TargetSystem::Tm2 => tm2,
                TargetSystem::Biomedicine => biomed,
            };

            // Remember the fallback for later degraded calls, but never
            // clobber an existing entry with fallback data
            let entry = CacheEntry {
                key: cache_key(&key.0, key.1),
                term: key.0.clone(),
                system: key.1,
                code: code.to_string(),
                fetched_at_unix: now,
                source: MappingSource::StaticFallback,
            };
            self.store_entry_if_absent(key.clone(), entry);

            return Ok(ResolvedCode {
                code: code.to_string(),
                source: MappingSource::StaticFallback,
            });
        }

        Err(terminal)
    }

    /// Inserts an entry and persists the cache if configured.
    ///
    /// The file write happens after the lock is released so a slow disk
    /// never blocks concurrent resolves.
    fn store_entry(&self, key: Key, entry: CacheEntry) {
        let snapshot = {
            let mut state = self.state.lock().expect("cache lock poisoned");
            state.entries.insert(key, entry);
            self.snapshot(&state)
        };
        self.persist(snapshot);
    }

    /// Inserts an entry only when the key is vacant.
    fn store_entry_if_absent(&self, key: Key, entry: CacheEntry) {
        let snapshot = {
            let mut state = self.state.lock().expect("cache lock poisoned");
            state.entries.entry(key).or_insert(entry);
            self.snapshot(&state)
        };
        self.persist(snapshot);
    }

    /// Evicts service-sourced entries older than the TTL.
    ///
    /// Returns the number of evicted entries. Intended for an optional
    /// periodic sweep; fallback-sourced entries are kept since they are
    /// already served only as degraded data. The lock is held only for
    /// the eviction pass itself; persistence runs after release.
    pub fn sweep(&self) -> usize {
        let now = now_unix();
        let ttl = self.config.ttl_secs;

        let (evicted, snapshot) = {
            let mut state = self.state.lock().expect("cache lock poisoned");
            let before = state.entries.len();
            state.entries.retain(|_, entry| {
                entry.source != MappingSource::ExternalService
                    || now.saturating_sub(entry.fetched_at_unix) < ttl
            });
            let evicted = before - state.entries.len();
            let snapshot = if evicted > 0 { self.snapshot(&state) } else { None };
            (evicted, snapshot)
        };

        self.persist(snapshot);
        evicted
    }

    /// Clones the entries for persistence, `None` when no file is configured.
    ///
    /// Called under the lock; keeps the critical section to a map clone so
    /// file I/O can happen after the guard is dropped.
    fn snapshot(&self, state: &CacheState) -> Option<Vec<CacheEntry>> {
        self.config.cache_file.as_ref()?;
        Some(state.entries.values().cloned().collect())
    }

    /// Writes a snapshot to the cache file, one JSON document per line.
    ///
    /// Runs outside the cache lock. Persistence failures are logged, never
    /// propagated; the in-memory cache stays authoritative.
    fn persist(&self, snapshot: Option<Vec<CacheEntry>>) {
        let (Some(path), Some(entries)) = (&self.config.cache_file, snapshot) else {
            return;
        };

        let mut buf = Vec::new();
        for entry in &entries {
            match serde_json::to_vec(entry) {
                Ok(line) => {
                    buf.extend_from_slice(&line);
                    buf.push(b'\n');
                }
                Err(err) => tracing::warn!(error = %err, "skipping unserializable cache entry"),
            }
        }

        if let Err(err) = fs::File::create(path).and_then(|mut f| f.write_all(&buf)) {
            tracing::warn!(path = %path.display(), error = %err, "failed to persist code cache");
        }
    }
}

/// Derives the stable hash key for a (term, system) pair.
fn cache_key(term: &str, system: TargetSystem) -> String {
    let mut hasher = Sha256::new();
    hasher.update(term.as_bytes());
    hasher.update(b"|");
    hasher.update(system.as_str().as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Current wall-clock time as unix seconds.
fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Loads persisted entries, skipping unreadable or corrupt lines.
fn load_disk_entries(path: &Path) -> Vec<CacheEntry> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot open cache file");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) if !line.trim().is_empty() => line,
            Ok(_) => continue,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        match serde_json::from_str::<CacheEntry>(&line) {
            Ok(entry) if entry.key == cache_key(&entry.term, entry.system) => entries.push(entry),
            Ok(_) | Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "skipped corrupt cache entries");
    }

    entries
}
