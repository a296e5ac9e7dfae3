//! Domain model for persisted posts.
//!
//! # Invariants
//! - Every post is identified by a storage-assigned `PostId`.
//! - Ids are unique, totally ordered and never reused.

pub mod posts;
