use crate::session::Environment;
use crate::store::Table;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub fn db_path(workspace: &Path, environment: Environment) -> PathBuf {
    workspace.join(environment.db_file_name())
}

pub fn open_db(workspace: &Path, environment: Environment) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(db_path(workspace, environment))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS worksheets(
            name TEXT PRIMARY KEY,
            version INTEGER NOT NULL DEFAULT 0,
            headers TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS worksheet_rows(
            worksheet TEXT NOT NULL,
            row_index INTEGER NOT NULL,
            cells TEXT NOT NULL,
            PRIMARY KEY(worksheet, row_index),
            FOREIGN KEY(worksheet) REFERENCES worksheets(name)
        )",
        [],
    )?;

    for table in Table::ALL {
        let headers = serde_json::to_string(table.headers())?;
        conn.execute(
            "INSERT OR IGNORE INTO worksheets(name, version, headers) VALUES(?, 0, ?)",
            (table.worksheet(), &headers),
        )?;
    }
    Ok(())
}
