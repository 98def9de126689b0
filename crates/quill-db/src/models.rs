/// Database row types — these map directly to SQLite rows.
/// Kept separate from the HTTP layer so quill-db stays framework-free.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub created: String,
    pub title: String,
    pub body: String,
}
