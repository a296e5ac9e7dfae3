//! Posts storage core.
//! Owns the posts schema, repository contract and use-case service.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::posts::{NewPost, PostId, Posts, PostsValidationError, TITLE_MAX_CHARS};
pub use repo::posts_repo::{
    PostsCursor, PostsRepository, RepoError, RepoResult, SqlitePostsRepository,
};
pub use service::posts_service::{PostsMainResponse, PostsService, PostsUpdateRequest};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
