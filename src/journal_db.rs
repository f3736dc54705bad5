//! SQLite persistence for the event journal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::escrow::{AccountId, EscrowEvent, EventRecord};

#[derive(Clone)]
pub struct JournalDb {
    conn: Arc<Mutex<Connection>>,
}

impl JournalDb {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("open journal db {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS escrow_events (
                seq INTEGER PRIMARY KEY,
                ts TEXT NOT NULL,
                emitter TEXT NOT NULL,
                kind TEXT NOT NULL,
                payload TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_escrow_events_emitter ON escrow_events(emitter, seq)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert records; ones already stored (same `seq`) are skipped.
    /// Returns how many were newly written.
    pub fn insert_records(&self, records: &[EventRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO escrow_events (seq, ts, emitter, kind, payload) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for rec in records {
                let payload = serde_json::to_string(&rec.event).context("encode event")?;
                written += stmt.execute(params![
                    rec.seq as i64,
                    rec.ts.to_rfc3339(),
                    rec.emitter.to_string(),
                    rec.event.name(),
                    payload,
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Stored records in sequence order, optionally only those from `emitter`.
    pub fn list_records(
        &self,
        limit: usize,
        emitter: Option<&AccountId>,
    ) -> Result<Vec<EventRecord>> {
        let limit = limit.clamp(1, 100_000) as i64;
        let conn = self.conn.lock();

        let rows: Vec<(i64, String, String, String)> = match emitter {
            Some(emitter) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT seq, ts, emitter, payload FROM escrow_events \
                     WHERE emitter = ?1 ORDER BY seq ASC LIMIT ?2",
                )?;
                let mapped = stmt.query_map(params![emitter.to_string(), limit], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                mapped.collect::<rusqlite::Result<_>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(
                    "SELECT seq, ts, emitter, payload FROM escrow_events \
                     ORDER BY seq ASC LIMIT ?1",
                )?;
                let mapped = stmt.query_map(params![limit], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                mapped.collect::<rusqlite::Result<_>>()?
            }
        };

        rows.into_iter()
            .map(|(seq, ts, emitter, payload)| {
                let ts = DateTime::parse_from_rfc3339(&ts)
                    .with_context(|| format!("bad timestamp for event {}", seq))?
                    .with_timezone(&Utc);
                let emitter: AccountId = emitter
                    .parse()
                    .with_context(|| format!("bad emitter for event {}", seq))?;
                let event: EscrowEvent = serde_json::from_str(&payload)
                    .with_context(|| format!("bad payload for event {}", seq))?;
                Ok(EventRecord {
                    seq: seq as u64,
                    ts,
                    emitter,
                    event,
                })
            })
            .collect()
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM escrow_events", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}
