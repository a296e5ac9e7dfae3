//! Posts repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `posts` table.
//! - Provide the descending-id scan as a scoped, lazily read cursor.
//!
//! # Invariants
//! - Write paths validate before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A cursor handed out by `find_all_desc` never outlives the call.

use crate::db::DbError;
use crate::model::posts::{NewPost, PostId, Posts, PostsValidationError};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Rows};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;
use std::time::Instant;

const POSTS_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    author,
    created_at,
    updated_at
FROM posts";

const NOW_EPOCH_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Lazy, single-pass sequence of posts backed by an open statement.
pub type PostsCursor<'a> = dyn Iterator<Item = RepoResult<Posts>> + 'a;

/// Repository error for posts persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PostsValidationError),
    Db(DbError),
    NotFound(PostId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted post data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<PostsValidationError> for RepoError {
    fn from(value: PostsValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for posts.
pub trait PostsRepository {
    /// Persists a new post and returns its storage-assigned id.
    fn insert(&self, post: &NewPost) -> RepoResult<PostId>;
    fn get_by_id(&self, id: PostId) -> RepoResult<Option<Posts>>;
    fn exists_by_id(&self, id: PostId) -> RepoResult<bool>;
    /// Returns every post in ascending id order.
    fn list_all(&self) -> RepoResult<Vec<Posts>>;

    /// Streams every post in descending id order through `consume`.
    ///
    /// The cursor is only valid inside `consume` and is released when it
    /// returns, including on early return, error or unwind. Whatever
    /// `consume` returns is passed through unchanged.
    fn find_all_desc<T, F>(&self, consume: F) -> RepoResult<T>
    where
        F: FnOnce(&mut PostsCursor<'_>) -> RepoResult<T>;

    /// Eagerly collects `find_all_desc`.
    fn list_all_desc(&self) -> RepoResult<Vec<Posts>> {
        self.find_all_desc(|posts| posts.collect())
    }

    /// Replaces title, content and author of an existing post.
    fn update(&self, post: &Posts) -> RepoResult<()>;
    fn delete(&self, id: PostId) -> RepoResult<()>;
    /// Removes every post and returns how many were removed.
    fn delete_all(&self) -> RepoResult<u64>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed posts repository.
pub struct SqlitePostsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostsRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PostsRepository for SqlitePostsRepository<'_> {
    fn insert(&self, post: &NewPost) -> RepoResult<PostId> {
        post.validate()?;

        self.conn.execute(
            "INSERT INTO posts (title, content, author) VALUES (?1, ?2, ?3);",
            params![post.title.as_str(), post.content.as_str(), post.author.as_deref()],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=posts_insert module=repo status=ok post_id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: PostId) -> RepoResult<Option<Posts>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POSTS_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_posts_row(row)?));
        }

        Ok(None)
    }

    fn exists_by_id(&self, id: PostId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM posts WHERE id = ?1;", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn list_all(&self) -> RepoResult<Vec<Posts>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POSTS_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();

        while let Some(row) = rows.next()? {
            posts.push(parse_posts_row(row)?);
        }

        Ok(posts)
    }

    fn find_all_desc<T, F>(&self, consume: F) -> RepoResult<T>
    where
        F: FnOnce(&mut PostsCursor<'_>) -> RepoResult<T>,
    {
        let started_at = Instant::now();
        let mut stmt = self
            .conn
            .prepare(&format!("{POSTS_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut stream = PostsStream::new(stmt.query([])?);

        let outcome = consume(&mut stream as &mut PostsCursor<'_>);
        let yielded = stream.yielded;
        drop(stream);
        drop(stmt);

        debug!(
            "event=posts_find_all_desc module=repo status={} rows={} duration_ms={}",
            if outcome.is_ok() { "ok" } else { "error" },
            yielded,
            started_at.elapsed().as_millis()
        );
        outcome
    }

    fn update(&self, post: &Posts) -> RepoResult<()> {
        post.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE posts
                 SET
                    title = ?1,
                    content = ?2,
                    author = ?3,
                    updated_at = MAX(updated_at, {NOW_EPOCH_MS_SQL})
                 WHERE id = ?4;"
            ),
            params![
                post.title.as_str(),
                post.content.as_str(),
                post.author.as_deref(),
                post.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(post.id));
        }

        debug!("event=posts_update module=repo status=ok post_id={}", post.id);
        Ok(())
    }

    fn delete(&self, id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=posts_delete module=repo status=ok post_id={id}");
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let removed = self.conn.execute("DELETE FROM posts;", [])?;
        debug!("event=posts_delete_all module=repo status=ok removed={removed}");
        Ok(removed as u64)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

/// Row cursor adapter; stops after the first error.
struct PostsStream<'stmt> {
    rows: Rows<'stmt>,
    yielded: usize,
    finished: bool,
}

impl<'stmt> PostsStream<'stmt> {
    fn new(rows: Rows<'stmt>) -> Self {
        Self {
            rows,
            yielded: 0,
            finished: false,
        }
    }
}

impl Iterator for PostsStream<'_> {
    type Item = RepoResult<Posts>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.rows.next() {
            Ok(Some(row)) => {
                let parsed = parse_posts_row(row);
                match parsed {
                    Ok(_) => self.yielded += 1,
                    Err(_) => self.finished = true,
                }
                Some(parsed)
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err.into()))
            }
        }
    }
}

impl FusedIterator for PostsStream<'_> {}

fn parse_posts_row(row: &Row<'_>) -> RepoResult<Posts> {
    let post = Posts {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        author: row.get("author")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    post.validate().map_err(|err| {
        RepoError::InvalidData(format!("post {} failed validation: {err}", post.id))
    })?;
    Ok(post)
}
