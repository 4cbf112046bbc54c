//! Labwise persistence layer.
//!
//! This crate is the data access side of Labwise: entity models for labs,
//! tests and prices, a small query model, and a typed [`Gateway`] over
//! interchangeable backends.
//!
//! # Features
//!
//! - `postgrest` (default) - HTTP backend for a PostgREST/Supabase project
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`models`] - Lab, Test, LabTestPrice and the joined shapes
//! - [`query`] - Tables, filters, ordering and embeds
//! - [`core`] - The [`QueryBackend`] trait
//! - [`gateway`] - Typed reads and writes over a backend
//! - [`backends`] - Backend implementations
//! - [`seed`] - The administrative seed catalog
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```
//! use labwise_persistence::backends::memory::MemoryBackend;
//! use labwise_persistence::gateway::Gateway;
//! use labwise_persistence::models::LabTestPriceWithLab;
//! use labwise_persistence::query::{Embed, Filter};
//!
//! # tokio_test::block_on(async {
//! let gateway = Gateway::new(MemoryBackend::seeded());
//! let prices: Vec<LabTestPriceWithLab> = gateway
//!     .list_with_join(&[Embed::Lab], vec![Filter::eq("test_id", "test-blood-sugar")])
//!     .await?;
//! assert_eq!(prices.len(), 2);
//! # Ok::<(), labwise_persistence::StorageError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod gateway;
pub mod models;
pub mod query;
pub mod seed;

pub use crate::core::QueryBackend;
pub use error::{StorageError, StorageResult};
pub use gateway::Gateway;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
