//! SQLite-backed user repository.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use gator_core::{NewUser, RepositoryError, User, UserRepository};
use gator_logging::gator_debug;
use rusqlite::{params, Connection, ErrorCode, Row};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DbTarget {
    Memory,
    File(PathBuf),
}

/// Interprets the configured `db_url`.
///
/// Accepts `sqlite://path`, `sqlite:path`, `sqlite::memory:`, `:memory:` or a
/// bare path. Any other scheme is rejected.
fn parse_db_url(db_url: &str) -> Result<DbTarget, RepositoryError> {
    let url = db_url.trim();
    if url.is_empty() {
        return Err(RepositoryError::Open("db_url is empty".into()));
    }
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if rest == ":memory:" {
        return Ok(DbTarget::Memory);
    }
    if let Some((scheme, _)) = rest.split_once("://") {
        return Err(RepositoryError::Open(format!(
            "unsupported database scheme {scheme:?}; only SQLite is supported \
             (sqlite://path, sqlite::memory: or a file path)"
        )));
    }
    Ok(DbTarget::File(PathBuf::from(rest)))
}

pub struct SqliteUserRepository {
    conn: Connection,
}

impl SqliteUserRepository {
    /// Open (or create) the database named by `db_url` and ensure the schema.
    pub fn open(db_url: &str) -> Result<Self, RepositoryError> {
        let conn = match parse_db_url(db_url)? {
            DbTarget::Memory => Connection::open_in_memory(),
            DbTarget::File(path) => Connection::open(&path),
        }
        .map_err(|e| RepositoryError::Open(format!("failed to open database: {e}")))?;
        gator_debug!("opened database {}", db_url);
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::open(":memory:")
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(
            r#"
PRAGMA busy_timeout=5000;

CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    name        TEXT NOT NULL UNIQUE
);
"#,
        )
        .map_err(|e| RepositoryError::Open(format!("failed to create schema: {e}")))?;
        Ok(Self { conn })
    }
}

fn query_err(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::Query(err.to_string())
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Corrupt(format!("bad timestamp {raw:?}: {e}")))
}

fn user_from_row(row: &Row<'_>) -> Result<User, RepositoryError> {
    let id: String = row.get(0).map_err(query_err)?;
    let created_at: String = row.get(1).map_err(query_err)?;
    let updated_at: String = row.get(2).map_err(query_err)?;
    let name: String = row.get(3).map_err(query_err)?;
    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Corrupt(format!("bad user id {id:?}: {e}")))?,
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
        name,
    })
}

impl UserRepository for SqliteUserRepository {
    fn get_user(&self, name: &str) -> Result<Option<User>, RepositoryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, created_at, updated_at, name FROM users WHERE name = ?1")
            .map_err(query_err)?;
        let mut rows = stmt.query(params![name]).map_err(query_err)?;
        match rows.next().map_err(query_err)? {
            Some(row) => user_from_row(row).map(Some),
            None => Ok(None),
        }
    }

    fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let inserted = self.conn.execute(
            "INSERT INTO users (id, created_at, updated_at, name) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
                user.name,
            ],
        );
        match inserted {
            Ok(_) => Ok(User::from(user)),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(RepositoryError::AlreadyExists(user.name))
            }
            Err(e) => Err(query_err(e)),
        }
    }

    fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, created_at, updated_at, name FROM users ORDER BY name")
            .map_err(query_err)?;
        let mut rows = stmt.query([]).map_err(query_err)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            users.push(user_from_row(row)?);
        }
        Ok(users)
    }

    fn reset_users(&self) -> Result<(), RepositoryError> {
        let deleted = self
            .conn
            .execute("DELETE FROM users", [])
            .map_err(query_err)?;
        gator_debug!("deleted {} user(s)", deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn db_urls_are_interpreted() {
        assert_eq!(parse_db_url(":memory:").unwrap(), DbTarget::Memory);
        assert_eq!(parse_db_url("sqlite::memory:").unwrap(), DbTarget::Memory);
        assert_eq!(
            parse_db_url("sqlite:///tmp/gator.db").unwrap(),
            DbTarget::File(PathBuf::from("/tmp/gator.db"))
        );
        assert_eq!(
            parse_db_url("gator.db").unwrap(),
            DbTarget::File(PathBuf::from("gator.db"))
        );
        let err = parse_db_url("postgres://u:p@localhost/gator").unwrap_err();
        assert!(err.to_string().contains("\"postgres\""), "{err}");
        assert!(err.to_string().contains("only SQLite is supported"), "{err}");
        assert!(parse_db_url("  ").is_err());
    }

    #[test]
    fn create_get_list_reset() {
        let repo = SqliteUserRepository::in_memory().unwrap();
        assert_eq!(repo.get_user("alice").unwrap(), None);

        let alice = repo.create_user(NewUser::named("alice")).unwrap();
        repo.create_user(NewUser::named("bob")).unwrap();

        let fetched = repo.get_user("alice").unwrap().unwrap();
        assert_eq!(fetched.id, alice.id);
        assert_eq!(fetched.created_at, alice.created_at);
        assert_eq!(fetched.name, "alice");

        let names: Vec<String> = repo
            .list_users()
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);

        repo.reset_users().unwrap();
        assert!(repo.list_users().unwrap().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let repo = SqliteUserRepository::in_memory().unwrap();
        repo.create_user(NewUser::named("alice")).unwrap();
        let err = repo.create_user(NewUser::named("alice")).unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(ref n) if n == "alice"));
    }
}
