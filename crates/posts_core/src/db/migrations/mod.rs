//! Ordered schema migrations for the posts store.
//!
//! The applied version lives in `PRAGMA user_version`. Pending scripts run in a
//! single transaction, so a failing script leaves the file at its old version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

impl Migration {
    fn apply(&self, tx: &Transaction<'_>) -> DbResult<()> {
        tx.execute_batch(self.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", self.version))
            .map_err(|source| DbError::Migration {
                version: self.version,
                name: self.name,
                source,
            })
    }
}

// Versions must stay strictly increasing; never edit a shipped script.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "init",
    sql: include_str!("0001_init.sql"),
}];

/// Latest schema version this build can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        migration.apply(&tx)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        from_version,
        latest,
        pending.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version, MIGRATIONS};
    use rusqlite::Connection;

    fn migrated() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn versions_are_strictly_increasing() {
        assert!(MIGRATIONS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert_eq!(latest_version(), MIGRATIONS.last().unwrap().version);
    }

    #[test]
    fn fresh_database_gets_posts_table_and_author_index() {
        let conn = migrated();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());

        let mut stmt = conn.prepare("PRAGMA table_info(posts);").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>("name"))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            ["id", "title", "content", "author", "created_at", "updated_at"]
        );

        let index_table: String = conn
            .query_row(
                "SELECT tbl_name FROM sqlite_master WHERE type = 'index' AND name = 'idx_posts_author';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_table, "posts");
    }

    #[test]
    fn reapplying_is_a_no_op() {
        let mut conn = migrated();
        conn.execute("INSERT INTO posts (title) VALUES ('kept');", [])
            .unwrap();

        apply_migrations(&mut conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }
}
