use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            username  TEXT NOT NULL UNIQUE,
            password  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS post (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id  INTEGER NOT NULL REFERENCES user(id),
            created    TEXT NOT NULL DEFAULT (datetime('now')),
            title      TEXT NOT NULL,
            body       TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_post_created
            ON post(created);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

/// Drop both tables and recreate them empty. Backs the `init-db` command.
pub fn reset(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS post;
        DROP TABLE IF EXISTS user;
        ",
    )?;
    run(conn)
}
