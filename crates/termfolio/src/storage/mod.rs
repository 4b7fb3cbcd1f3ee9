//! Storage layer for termfolio.
//!
//! This module provides the `SQLite`-backed visitor counter: unique visitors
//! keyed by IP, persistent opt-outs, and cached per-country statistics.
//!
//! One [`VisitorStore`] is shared by every SSH session. The connection sits
//! behind a mutex. The country statistics cache sits behind a second one that
//! is only held to read or swap the cached result: the GeoLite2 pass itself
//! runs with neither lock held, so visit recording waits at most for the
//! query that snapshots visitor IPs. A pass that overlaps a visitor change
//! returns its snapshot but leaves the cache dirty.
//!
//! Every call blocks on `SQLite` I/O; async callers go through
//! `tokio::task::spawn_blocking`.

pub mod geo;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use geo::{CountryCount, CountryResolver, CountryStats, GeoLiteResolver};

/// Persistent visitor counter with opt-out support.
#[derive(Debug)]
pub struct VisitorStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
    /// Cached country statistics.
    stats: Mutex<StatsCache>,
}

/// Country statistics cache; dirty whenever the visitor set changes.
struct StatsCache {
    dirty: bool,
    /// Bumped on every invalidation; a pass only caches its result when the
    /// generation it started from is still current.
    generation: u64,
    source: Option<PathBuf>,
    resolver: Option<Box<dyn CountryResolver>>,
    cached: CountryStats,
}

impl std::fmt::Debug for StatsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCache")
            .field("dirty", &self.dirty)
            .field("generation", &self.generation)
            .field("source", &self.source)
            .field("resolver_open", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl StatsCache {
    fn invalidate(&mut self) {
        self.dirty = true;
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self {
            dirty: true,
            generation: 0,
            source: None,
            resolver: None,
            cached: CountryStats::default(),
        }
    }
}

impl VisitorStore {
    /// Open or create a visitor database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, the database cannot be opened,
    /// or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyDatabasePath);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening visitor database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Sessions write from several tasks; WAL keeps readers unblocked.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Visitor database opened at {}", path.display());
        Ok(Self::from_connection(path, conn))
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;
        Ok(Self::from_connection(PathBuf::from(":memory:"), conn))
    }

    fn from_connection(path: PathBuf, conn: Connection) -> Self {
        Self {
            path,
            conn: Mutex::new(conn),
            stats: Mutex::new(StatsCache::default()),
        }
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("visitor database lock poisoned"))
    }

    fn stats_cache(&self) -> Result<MutexGuard<'_, StatsCache>> {
        self.stats
            .lock()
            .map_err(|_| Error::internal("country stats lock poisoned"))
    }

    fn invalidate_stats(&self) -> Result<()> {
        self.stats_cache()?.invalidate();
        Ok(())
    }

    /// Whether `ip` has opted out of tracking. An empty IP never has.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_opted_out(&self, ip: &str) -> Result<bool> {
        if ip.is_empty() {
            return Ok(false);
        }
        let conn = self.conn()?;
        Self::opted_out(&conn, ip)
    }

    fn opted_out(conn: &Connection, ip: &str) -> Result<bool> {
        let found: Option<i32> = conn
            .query_row("SELECT 1 FROM opt_out WHERE ip = ?1 LIMIT 1", [ip], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Count a visit from `ip` and return the number of unique visitors.
    ///
    /// Opted-out addresses are not recorded; the count is returned unchanged.
    /// An empty IP only reads the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_visit(&self, ip: &str) -> Result<usize> {
        let added = {
            let conn = self.conn()?;
            if ip.is_empty() || Self::opted_out(&conn, ip)? {
                return Self::count_visitors(&conn);
            }
            conn.execute(schema::INSERT_VISITOR, [ip])? > 0
        };

        if added {
            debug!("Recorded first visit from {}", ip);
            self.invalidate_stats()?;
        }
        self.count()
    }

    /// Opt `ip` out of tracking (`true`) or back in (`false`).
    ///
    /// Opting out forgets the visitor; opting in counts them again. Both
    /// happen in one transaction. Returns the visitor count afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn set_opt_out(&self, ip: &str, opt_out: bool) -> Result<usize> {
        if ip.is_empty() {
            return self.count();
        }

        let (changed, count) = {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;

            let changed = if opt_out {
                tx.execute(schema::INSERT_OPT_OUT, [ip])?;
                tx.execute("DELETE FROM visitors WHERE ip = ?1", [ip])? > 0
            } else {
                tx.execute("DELETE FROM opt_out WHERE ip = ?1", [ip])?;
                tx.execute(schema::INSERT_VISITOR, [ip])? > 0
            };
            let count = Self::count_visitors(&tx)?;
            tx.commit()?;
            (changed, count)
        };

        info!(
            "Visitor {} tracking {}",
            ip,
            if opt_out { "disabled" } else { "enabled" }
        );
        if changed {
            self.invalidate_stats()?;
        }
        Ok(count)
    }

    /// Number of unique visitors.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        Self::count_visitors(&conn)
    }

    fn count_visitors(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM visitors", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Per-country visitor statistics using a GeoLite2 Country database.
    ///
    /// Results are cached until the visitor set changes or a different
    /// database path is passed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeoLite`] when the database path is empty, missing,
    /// inaccessible, or not a valid database, and a query error otherwise.
    pub fn country_stats(&self, geolite_path: &Path) -> Result<CountryStats> {
        geo::check_database_path(geolite_path)?;
        self.country_stats_with(geolite_path, || {
            GeoLiteResolver::open(geolite_path)
                .map(|resolver| Box::new(resolver) as Box<dyn CountryResolver>)
        })
    }

    fn country_stats_with<F>(&self, source: &Path, open: F) -> Result<CountryStats>
    where
        F: FnOnce() -> Result<Box<dyn CountryResolver>>,
    {
        let (resolver, generation) = {
            let mut cache = self.stats_cache()?;
            if cache.source.as_deref() != Some(source) {
                cache.resolver = None;
                cache.source = Some(source.to_path_buf());
                cache.invalidate();
            }
            if !cache.dirty {
                return Ok(cache.cached.clone());
            }
            (cache.resolver.take(), cache.generation)
        };
        let resolver = match resolver {
            Some(resolver) => resolver,
            None => open()?,
        };

        let ips = self.visitor_ips()?;
        let stats = geo::aggregate_countries(
            ips.iter().map(String::as_str),
            &*resolver,
            ips.len(),
        );

        let mut cache = self.stats_cache()?;
        if cache.source.as_deref() == Some(source) && cache.resolver.is_none() {
            cache.resolver = Some(resolver);
        }
        if cache.generation == generation {
            debug!(
                "Recomputed country stats: {} visitors, top {}",
                stats.total_visitors, stats.top_country
            );
            cache.cached = stats.clone();
            cache.dirty = false;
        } else {
            debug!("Visitors changed during country stats pass; not cached");
        }
        Ok(stats)
    }

    fn visitor_ips(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT ip FROM visitors")?;
        let ips = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ips)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;
        let visitors = Self::count_visitors(&conn)?;
        let opted_out: i64 = conn.query_row("SELECT COUNT(*) FROM opt_out", [], |row| row.get(0))?;

        let (first, last): (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT MIN(first_seen), MAX(first_seen) FROM visitors",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            visitors,
            opted_out: usize::try_from(opted_out).unwrap_or(0),
            first_visit: first.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            latest_first_visit: last.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            db_size_bytes,
        })
    }
}

/// Summary of the visitor database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Unique visitors counted.
    pub visitors: usize,
    /// Addresses that opted out.
    pub opted_out: usize,
    /// Earliest first visit.
    pub first_visit: Option<DateTime<Utc>>,
    /// Most recent first visit by a new visitor.
    pub latest_first_visit: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
