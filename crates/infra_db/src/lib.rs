//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL infrastructure for the claims service
//! using SQLx: pool construction, embedded migrations, and the adapter that
//! implements `domain_claims::ClaimPort`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let repo = PostgresClaimRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use error::DatabaseError;
pub use repositories::PostgresClaimRepository;
