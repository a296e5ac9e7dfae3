//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for posts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod posts_repo;
