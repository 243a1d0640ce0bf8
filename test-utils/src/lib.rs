//! Buddy Test Utils
//!
//! Shared testing utilities for the lifecycle engine. Offers a builder for
//! test contexts backed by in-memory SQLite databases, plus factories that
//! insert lifecycle entities with sensible defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_ticket_operations() -> Result<(), TestError> {
//!     let test = TestBuilder::new().with_lifecycle_tables().build().await?;
//!     let db = test.db.unwrap();
//!     // Perform database operations...
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
