//! Posts domain model.
//!
//! # Responsibility
//! - Define the persisted `Posts` record and its insert-time shape.
//! - Own field validation shared by every write path.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes for a post.
//! - `title` is non-blank and at most `TITLE_MAX_CHARS` characters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a post.
pub type PostId = i64;

/// Upper bound for `title`, counted in characters.
pub const TITLE_MAX_CHARS: usize = 500;

/// Persisted post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posts {
    pub id: PostId,
    pub title: String,
    /// Body text. May be empty.
    pub content: String,
    pub author: Option<String>,
    /// Unix epoch milliseconds, set on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped on every update.
    pub updated_at: i64,
}

impl Posts {
    /// Validates the caller-controlled fields.
    pub fn validate(&self) -> Result<(), PostsValidationError> {
        validate_title(&self.title)
    }
}

/// Insert-time shape of a post; storage assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: None,
        }
    }

    /// Sets the author display name.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn validate(&self) -> Result<(), PostsValidationError> {
        validate_title(&self.title)
    }
}

/// Field-level validation failure for post writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostsValidationError {
    EmptyTitle,
    TitleTooLong { max: usize, actual: usize },
}

impl Display for PostsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "post title cannot be blank"),
            Self::TitleTooLong { max, actual } => {
                write!(f, "post title has {actual} characters; at most {max} allowed")
            }
        }
    }
}

impl Error for PostsValidationError {}

fn validate_title(title: &str) -> Result<(), PostsValidationError> {
    if title.trim().is_empty() {
        return Err(PostsValidationError::EmptyTitle);
    }

    let actual = title.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(PostsValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewPost, PostsValidationError, TITLE_MAX_CHARS};

    #[test]
    fn blank_title_is_rejected() {
        let post = NewPost::new("   ", "body");
        assert_eq!(post.validate(), Err(PostsValidationError::EmptyTitle));
    }

    #[test]
    fn title_length_is_counted_in_chars() {
        let at_limit = NewPost::new("가".repeat(TITLE_MAX_CHARS), "");
        assert!(at_limit.validate().is_ok());

        let over = NewPost::new("가".repeat(TITLE_MAX_CHARS + 1), "");
        assert_eq!(
            over.validate(),
            Err(PostsValidationError::TitleTooLong {
                max: TITLE_MAX_CHARS,
                actual: TITLE_MAX_CHARS + 1,
            })
        );
    }

    #[test]
    fn with_author_sets_author() {
        let post = NewPost::new("hello", "world").with_author("jojo");
        assert_eq!(post.author.as_deref(), Some("jojo"));
    }
}
