use crate::models::{PostRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Insert a new user. Returns `Ok(None)` when the username is taken.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO user (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            ) {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Posts --

    pub fn insert_post(&self, author_id: i64, title: &str, body: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO post (author_id, title, body) VALUES (?1, ?2, ?3)",
                rusqlite::params![author_id, title, body],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// All posts, newest first, each joined with its author's username.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(query_posts)
    }

    /// Update title and body. `created` and `author_id` are never touched.
    pub fn update_post(&self, id: i64, title: &str, body: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE post SET title = ?1, body = ?2 WHERE id = ?3",
                rusqlite::params![title, body, id],
            )?;
            Ok(())
        })
    }

    pub fn delete_post(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, password FROM user WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, password FROM user WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.author_id, u.username, p.created, p.title, p.body
         FROM post p
         JOIN user u ON p.author_id = u.id
         WHERE p.id = ?1",
    )?;

    let row = stmt.query_row([id], map_post_row).optional()?;

    Ok(row)
}

fn query_posts(conn: &Connection) -> Result<Vec<PostRow>> {
    // JOIN user to fetch the author username in a single query
    let mut stmt = conn.prepare(
        "SELECT p.id, p.author_id, u.username, p.created, p.title, p.body
         FROM post p
         JOIN user u ON p.author_id = u.id
         ORDER BY p.created DESC, p.id DESC",
    )?;

    let rows = stmt
        .query_map([], map_post_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_post_row(row: &rusqlite::Row<'_>) -> std::result::Result<PostRow, rusqlite::Error> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        created: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
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
    use crate::Database;

    fn db_with_user(username: &str) -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user(username, "hash").unwrap().unwrap();
        (db, id)
    }

    #[test]
    fn create_user_rejects_duplicate_username() {
        let (db, _) = db_with_user("alice");
        assert!(db.create_user("alice", "other-hash").unwrap().is_none());
    }

    #[test]
    fn user_lookup_is_case_sensitive() {
        let (db, id) = db_with_user("alice");
        assert_eq!(db.get_user_by_username("alice").unwrap().unwrap().id, id);
        assert!(db.get_user_by_username("Alice").unwrap().is_none());
    }

    #[test]
    fn get_post_joins_author_username() {
        let (db, uid) = db_with_user("alice");
        let pid = db.insert_post(uid, "hello", "world").unwrap();

        let post = db.get_post(pid).unwrap().unwrap();
        assert_eq!(post.author_id, uid);
        assert_eq!(post.author_username, "alice");
        assert_eq!(post.title, "hello");
        assert_eq!(post.body, "world");
        assert!(!post.created.is_empty());
    }

    #[test]
    fn list_posts_newest_first() {
        let (db, uid) = db_with_user("alice");
        // Same-second inserts: the id tiebreak keeps ordering deterministic.
        db.insert_post(uid, "first", "").unwrap();
        db.insert_post(uid, "second", "").unwrap();
        db.insert_post(uid, "third", "").unwrap();

        let titles: Vec<String> = db
            .list_posts()
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn update_post_leaves_created_and_author_alone() {
        let (db, uid) = db_with_user("alice");
        let pid = db.insert_post(uid, "before", "b1").unwrap();
        let created = db.get_post(pid).unwrap().unwrap().created;

        db.update_post(pid, "after", "b2").unwrap();

        let post = db.get_post(pid).unwrap().unwrap();
        assert_eq!(post.title, "after");
        assert_eq!(post.body, "b2");
        assert_eq!(post.created, created);
        assert_eq!(post.author_id, uid);
    }

    #[test]
    fn delete_post_removes_row() {
        let (db, uid) = db_with_user("alice");
        let pid = db.insert_post(uid, "gone", "").unwrap();

        db.delete_post(pid).unwrap();

        assert!(db.get_post(pid).unwrap().is_none());
        assert!(db.list_posts().unwrap().is_empty());
    }

    #[test]
    fn reset_drops_existing_rows() {
        let (db, uid) = db_with_user("alice");
        db.insert_post(uid, "t", "").unwrap();

        db.with_conn(|conn| crate::migrations::reset(conn)).unwrap();

        assert!(db.get_user_by_username("alice").unwrap().is_none());
        assert!(db.list_posts().unwrap().is_empty());
    }
}
