//! Backend implementations.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | In-memory | always | JSON tables in process memory, for tests and local demos |
//! | PostgREST | `postgrest` (default) | HTTP client for a hosted PostgREST/Supabase project |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "postgrest")]
//! # fn example() -> Result<(), labwise_persistence::StorageError> {
//! use labwise_persistence::backends::postgrest::{PostgrestBackend, PostgrestConfig};
//!
//! let backend = PostgrestBackend::new(PostgrestConfig {
//!     base_url: "https://abc.supabase.co".to_string(),
//!     api_key: Some("public-anon-key".to_string()),
//!     ..Default::default()
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod memory;

#[cfg(feature = "postgrest")]
pub mod postgrest;
