//! Common utilities and shared types for goty-rs.
//!
//! This crate provides foundational components used across all goty-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Upload policy and local file storage
//! - **Page Cache**: Revalidatable cache of public responses
//!
//! # Example
//!
//! ```no_run
//! use goty_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} on port {}", id, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod page_cache;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use page_cache::{CachedPage, InMemoryPageCache, PageCache};
pub use storage::{
    LocalStorage, StorageBackend, UploadPolicy, UploadedFile, generate_storage_key,
};
