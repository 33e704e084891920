use crate::models::{MessageRow, UserRow};
use crate::{Database, Result, StoreError};
use rusqlite::{Connection, Row};

const MESSAGE_COLUMNS: &str =
    "m.message_id, m.author_id, u.username, u.email, m.text, m.pub_date";

// Newest first; equal timestamps fall back to insertion order.
const MESSAGE_ORDER: &str = "ORDER BY m.pub_date DESC, m.message_id ASC";

impl Database {
    // -- Users --

    /// Insert a user and return the new id. A taken username yields
    /// [`StoreError::Constraint`].
    pub fn insert_user(&self, username: &str, email: &str, pw_hash: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user (username, email, pw_hash) VALUES (?1, ?2, ?3)",
                (username, email, pw_hash),
            )
            .map_err(|e| StoreError::from_write(e, "username already exists"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn find_user_by_name(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "user_id = ?1", user_id))
    }

    pub fn user_count(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM user", [], |r| r.get(0))?))
    }

    // -- Messages --

    /// Insert a message and return its id. Empty text is rejected before
    /// touching the table.
    pub fn insert_message(&self, author_id: i64, text: &str, pub_date: i64) -> Result<i64> {
        if text.is_empty() {
            return Err(StoreError::Validation("message text is empty".into()));
        }

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO message (author_id, text, pub_date) VALUES (?1, ?2, ?3)",
                (author_id, text, pub_date),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Latest messages of the given authors.
    pub fn messages_for(&self, author_ids: &[i64], limit: u32) -> Result<Vec<MessageRow>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=author_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE m.author_id IN ({})
                 {MESSAGE_ORDER}
                 LIMIT ?{}",
                placeholders.join(", "),
                author_ids.len() + 1,
            );

            let params = author_ids
                .iter()
                .copied()
                .chain(std::iter::once(i64::from(limit)));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Latest messages across all users.
    pub fn recent_messages(&self, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 {MESSAGE_ORDER}
                 LIMIT ?1"
            ))?;

            let rows = stmt
                .query_map([limit], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Latest messages written by `user_id` or anyone they follow, read in
    /// one statement so the feed comes from a single snapshot.
    pub fn home_messages(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE u.user_id = ?1
                    OR u.user_id IN (SELECT whom_id FROM follower WHERE who_id = ?1)
                 {MESSAGE_ORDER}
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn message_count(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM message", [], |r| r.get(0))?)
        })
    }

    // -- Follow edges --

    /// Record `who -> whom`. Re-following is a no-op: the primary key plus
    /// `OR IGNORE` makes the existence check and the write one statement.
    pub fn insert_follow(&self, who_id: i64, whom_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO follower (who_id, whom_id) VALUES (?1, ?2)",
                (who_id, whom_id),
            )?;
            Ok(())
        })
    }

    /// Remove `who -> whom`; absent edges are ignored.
    pub fn delete_follow(&self, who_id: i64, whom_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM follower WHERE who_id = ?1 AND whom_id = ?2",
                (who_id, whom_id),
            )?;
            Ok(())
        })
    }

    pub fn is_following(&self, who_id: i64, whom_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let hit = conn
                .query_row(
                    "SELECT 1 FROM follower WHERE who_id = ?1 AND whom_id = ?2",
                    (who_id, whom_id),
                    |_| Ok(()),
                )
                .optional()?;
            Ok(hit.is_some())
        })
    }

    /// Ids `who_id` follows, ascending.
    pub fn followees_of(&self, who_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT whom_id FROM follower WHERE who_id = ?1 ORDER BY whom_id")?;
            let ids = stmt
                .query_map([who_id], |r| r.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    value: P,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT user_id, username, email, pw_hash FROM user WHERE {predicate}"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                user_id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                pw_hash: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: row.get(0)?,
        author_id: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        text: row.get(4)?,
        pub_date: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users(names: &[&str]) -> (Database, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = names
            .iter()
            .map(|n| db.insert_user(n, &format!("{n}@example.com"), "hash").unwrap())
            .collect();
        (db, ids)
    }

    #[test]
    fn duplicate_username_is_a_constraint_error() {
        let (db, _) = db_with_users(&["alice"]);
        let err = db.insert_user("alice", "other@example.com", "hash").unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(db.user_count().unwrap(), 1);
    }

    #[test]
    fn user_lookup_by_name_and_id() {
        let (db, ids) = db_with_users(&["alice", "bob"]);

        let bob = db.find_user_by_name("bob").unwrap().unwrap();
        assert_eq!(bob.user_id, ids[1]);
        assert_eq!(bob.email, "bob@example.com");

        let alice = db.find_user_by_id(ids[0]).unwrap().unwrap();
        assert_eq!(alice.username, "alice");

        assert!(db.find_user_by_name("carol").unwrap().is_none());
        assert!(db.find_user_by_id(999).unwrap().is_none());
    }

    #[test]
    fn empty_message_is_rejected() {
        let (db, ids) = db_with_users(&["alice"]);
        let err = db.insert_message(ids[0], "", 1).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(db.message_count().unwrap(), 0);
    }

    #[test]
    fn follow_edges_are_unique_and_unfollow_is_a_noop_when_absent() {
        let (db, ids) = db_with_users(&["alice", "bob"]);

        db.insert_follow(ids[0], ids[1]).unwrap();
        db.insert_follow(ids[0], ids[1]).unwrap();
        assert_eq!(db.followees_of(ids[0]).unwrap(), vec![ids[1]]);
        assert!(db.is_following(ids[0], ids[1]).unwrap());
        assert!(!db.is_following(ids[1], ids[0]).unwrap());

        db.delete_follow(ids[0], ids[1]).unwrap();
        db.delete_follow(ids[0], ids[1]).unwrap();
        assert!(db.followees_of(ids[0]).unwrap().is_empty());
    }

    #[test]
    fn messages_are_newest_first_with_id_tie_break() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let first = db.insert_message(ids[0], "first", 100).unwrap();
        let second = db.insert_message(ids[1], "second", 100).unwrap();
        let newest = db.insert_message(ids[0], "newest", 200).unwrap();

        let got: Vec<i64> = db
            .recent_messages(30)
            .unwrap()
            .iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(got, vec![newest, first, second]);

        let limited = db.recent_messages(2).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn messages_for_filters_by_author() {
        let (db, ids) = db_with_users(&["alice", "bob", "carol"]);
        db.insert_message(ids[0], "from alice", 1).unwrap();
        db.insert_message(ids[1], "from bob", 2).unwrap();
        db.insert_message(ids[2], "from carol", 3).unwrap();

        let rows = db.messages_for(&[ids[0], ids[2]], 30).unwrap();
        let texts: Vec<&str> = rows.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["from carol", "from alice"]);
        assert_eq!(rows[0].username, "carol");

        assert!(db.messages_for(&[], 30).unwrap().is_empty());
    }

    #[test]
    fn home_messages_cover_self_and_followees_once() {
        let (db, ids) = db_with_users(&["alice", "bob", "carol"]);
        db.insert_message(ids[0], "mine", 1).unwrap();
        db.insert_message(ids[1], "bob's", 2).unwrap();
        db.insert_message(ids[2], "carol's", 3).unwrap();

        db.insert_follow(ids[0], ids[1]).unwrap();
        // A self-edge must not duplicate own messages.
        db.insert_follow(ids[0], ids[0]).unwrap();

        let texts: Vec<String> = db
            .home_messages(ids[0], 30)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["bob's".to_string(), "mine".to_string()]);
    }
}
