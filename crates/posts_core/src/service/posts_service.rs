//! Posts use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::posts::{NewPost, PostId, Posts};
use crate::repo::posts_repo::{PostsRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// Listing projection returned by `PostsService::find_all_desc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsMainResponse {
    pub id: PostId,
    pub title: String,
    pub author: Option<String>,
    /// Epoch milliseconds of the last modification.
    pub updated_at: i64,
}

impl From<Posts> for PostsMainResponse {
    fn from(value: Posts) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author: value.author,
            updated_at: value.updated_at,
        }
    }
}

/// Partial update; `None` keeps the stored value.
///
/// `author: Some(None)` clears the author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<Option<String>>,
}

impl PostsUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }

    fn apply_to(self, post: &mut Posts) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
    }
}

/// Use-case service wrapper for posts.
pub struct PostsService<R: PostsRepository> {
    repo: R,
}

impl<R: PostsRepository> PostsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post and returns its assigned id.
    pub fn save(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        author: Option<String>,
    ) -> RepoResult<PostId> {
        let mut post = NewPost::new(title, content);
        post.author = author;
        self.repo.insert(&post)
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `id` does not exist.
    /// - `RepoError::Validation` when the merged post is invalid.
    pub fn update(&self, id: PostId, request: PostsUpdateRequest) -> RepoResult<Posts> {
        let mut post = self.repo.get_by_id(id)?.ok_or(RepoError::NotFound(id))?;
        if request.is_empty() {
            return Ok(post);
        }

        request.apply_to(&mut post);
        self.repo.update(&post)?;
        self.repo.get_by_id(id)?.ok_or(RepoError::NotFound(id))
    }

    pub fn find_by_id(&self, id: PostId) -> RepoResult<Option<Posts>> {
        self.repo.get_by_id(id)
    }

    /// Lists every post, newest id first, as listing projections.
    pub fn find_all_desc(&self) -> RepoResult<Vec<PostsMainResponse>> {
        self.repo.find_all_desc(|posts| {
            posts
                .map(|post| post.map(PostsMainResponse::from))
                .collect()
        })
    }

    /// Lists every post with full content, oldest id first.
    pub fn find_all(&self) -> RepoResult<Vec<Posts>> {
        self.repo.list_all()
    }

    pub fn delete(&self, id: PostId) -> RepoResult<()> {
        self.repo.delete(id)
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
