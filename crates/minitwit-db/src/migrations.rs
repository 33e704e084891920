use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS user (
                user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                pw_hash     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS follower (
                who_id      INTEGER NOT NULL REFERENCES user(user_id),
                whom_id     INTEGER NOT NULL REFERENCES user(user_id),
                PRIMARY KEY (who_id, whom_id)
            );

            CREATE TABLE IF NOT EXISTS message (
                message_id  INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   INTEGER NOT NULL REFERENCES user(user_id),
                text        TEXT NOT NULL CHECK (text <> ''),
                pub_date    INTEGER NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (timeline indexes)");
        conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_message_author
                ON message(author_id, pub_date);

            CREATE INDEX IF NOT EXISTS idx_message_pub_date
                ON message(pub_date);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
