use crate::model::{AttendanceRecord, Student};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Students,
    Attendance,
}

impl Table {
    pub const ALL: [Table; 2] = [Table::Students, Table::Attendance];

    pub fn worksheet(self) -> &'static str {
        match self {
            Table::Students => "Students",
            Table::Attendance => "Attendance",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Table::Students => &Student::HEADERS,
            Table::Attendance => &AttendanceRecord::HEADERS,
        }
    }
}

pub type Row = Vec<String>;

/// Full contents of one worksheet at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub version: u64,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone)]
pub struct SheetWrite {
    pub table: Table,
    pub rows: Vec<Row>,
    pub expected_version: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Connectivity(String),
    #[error("{table} changed since it was read (expected version {expected}, found {found})")]
    Conflict {
        table: &'static str,
        expected: u64,
        found: u64,
    },
    #[error("{table} row {row}: {message}")]
    Malformed {
        table: &'static str,
        row: usize,
        message: String,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Connectivity(_) => "store_unavailable",
            StoreError::Conflict { .. } => "conflict",
            StoreError::Malformed { .. } => "store_malformed",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Connectivity(e.to_string())
    }
}

/// Worksheet-style backing store: whole-table reads and whole-table overwrites.
pub trait RecordStore {
    fn read_all(&mut self, table: Table) -> Result<Sheet, StoreError>;

    /// Applies every write or none of them. Returns the new versions in write order.
    fn replace_many(&mut self, writes: Vec<SheetWrite>) -> Result<Vec<u64>, StoreError>;

    fn replace_all(
        &mut self,
        table: Table,
        rows: Vec<Row>,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let versions = self.replace_many(vec![SheetWrite {
            table,
            rows,
            expected_version,
        }])?;
        versions
            .first()
            .copied()
            .ok_or_else(|| StoreError::Connectivity("store returned no version".to_string()))
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn version_of(conn: &Connection, table: Table) -> Result<u64, StoreError> {
        let version: Option<i64> = conn
            .query_row(
                "SELECT version FROM worksheets WHERE name = ?",
                [table.worksheet()],
                |r| r.get(0),
            )
            .optional()?;
        version
            .map(|v| v as u64)
            .ok_or_else(|| StoreError::Connectivity(format!("worksheet {} not found", table.worksheet())))
    }
}

impl RecordStore for SqliteStore {
    fn read_all(&mut self, table: Table) -> Result<Sheet, StoreError> {
        let version = Self::version_of(&self.conn, table)?;
        let mut stmt = self.conn.prepare(
            "SELECT cells FROM worksheet_rows WHERE worksheet = ? ORDER BY row_index",
        )?;
        let raw = stmt
            .query_map([table.worksheet()], |r| r.get::<_, String>(0))
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())?;
        let mut rows = Vec::with_capacity(raw.len());
        for (idx, cells) in raw.iter().enumerate() {
            let row: Row = serde_json::from_str(cells).map_err(|e| StoreError::Malformed {
                table: table.worksheet(),
                row: idx,
                message: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(Sheet { version, rows })
    }

    fn replace_many(&mut self, writes: Vec<SheetWrite>) -> Result<Vec<u64>, StoreError> {
        let tx = self.conn.transaction()?;
        let mut versions = Vec::with_capacity(writes.len());
        for write in writes {
            let found = Self::version_of(&tx, write.table)?;
            if found != write.expected_version {
                return Err(StoreError::Conflict {
                    table: write.table.worksheet(),
                    expected: write.expected_version,
                    found,
                });
            }
            tx.execute(
                "DELETE FROM worksheet_rows WHERE worksheet = ?",
                [write.table.worksheet()],
            )?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO worksheet_rows(worksheet, row_index, cells) VALUES(?, ?, ?)",
                )?;
                for (idx, row) in write.rows.iter().enumerate() {
                    let cells = serde_json::to_string(row)
                        .map_err(|e| StoreError::Connectivity(e.to_string()))?;
                    insert.execute((write.table.worksheet(), idx as i64, cells))?;
                }
            }
            tx.execute(
                "UPDATE worksheets SET version = version + 1 WHERE name = ?",
                [write.table.worksheet()],
            )?;
            versions.push(found + 1);
        }
        tx.commit()?;
        Ok(versions)
    }
}

/// In-process store with the same contract; can be taken offline.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sheets: HashMap<Table, Sheet>,
    online: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        let sheets = Table::ALL
            .into_iter()
            .map(|t| (t, Sheet::default()))
            .collect();
        Self {
            sheets,
            online: true,
        }
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn drop_table(&mut self, table: Table) {
        self.sheets.remove(&table);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.online {
            Ok(())
        } else {
            Err(StoreError::Connectivity("store offline".to_string()))
        }
    }

    fn sheet(&self, table: Table) -> Result<&Sheet, StoreError> {
        self.sheets
            .get(&table)
            .ok_or_else(|| StoreError::Connectivity(format!("worksheet {} not found", table.worksheet())))
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&mut self, table: Table) -> Result<Sheet, StoreError> {
        self.check_online()?;
        self.sheet(table).cloned()
    }

    fn replace_many(&mut self, writes: Vec<SheetWrite>) -> Result<Vec<u64>, StoreError> {
        self.check_online()?;
        for write in &writes {
            let found = self.sheet(write.table)?.version;
            if found != write.expected_version {
                return Err(StoreError::Conflict {
                    table: write.table.worksheet(),
                    expected: write.expected_version,
                    found,
                });
            }
        }
        let mut versions = Vec::with_capacity(writes.len());
        for write in writes {
            let sheet = self.sheets.entry(write.table).or_default();
            sheet.version += 1;
            sheet.rows = write.rows;
            versions.push(sheet.version);
        }
        Ok(versions)
    }
}

/// Serves reads from snapshots younger than `ttl`. Writes drop every snapshot.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    snapshots: HashMap<Table, (Instant, Sheet)>,
}

impl<S: RecordStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshots: HashMap::new(),
        }
    }

    pub fn invalidate(&mut self) {
        self.snapshots.clear();
    }

    #[allow(dead_code)]
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: RecordStore> RecordStore for CachedStore<S> {
    fn read_all(&mut self, table: Table) -> Result<Sheet, StoreError> {
        if let Some((taken_at, sheet)) = self.snapshots.get(&table) {
            if taken_at.elapsed() < self.ttl {
                debug!(table = table.worksheet(), "snapshot cache hit");
                return Ok(sheet.clone());
            }
        }
        debug!(table = table.worksheet(), "snapshot cache miss");
        let sheet = self.inner.read_all(table).inspect_err(|e| {
            warn!(table = table.worksheet(), error = %e, "worksheet read failed");
        })?;
        self.snapshots.insert(table, (Instant::now(), sheet.clone()));
        Ok(sheet)
    }

    fn replace_many(&mut self, writes: Vec<SheetWrite>) -> Result<Vec<u64>, StoreError> {
        let result = self.inner.replace_many(writes);
        self.invalidate();
        if let Err(e) = &result {
            warn!(error = %e, "worksheet write failed");
        }
        result
    }
}
