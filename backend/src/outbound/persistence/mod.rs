//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain records. Rows are validated on the way in.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel failures map to each port's
//!   `connection` and `query` errors.
//!
//! # Example
//!
//! ```rust,no_run
//! use spinwheel::outbound::persistence::{DbPool, DieselCodeRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/spinwheel")).await?;
//! let codes = DieselCodeRepository::new(pool);
//! # let _ = codes;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_code_repository;
mod diesel_helpers;
mod diesel_player_repository;
mod diesel_prize_repository;
mod diesel_spin_log_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_code_repository::DieselCodeRepository;
pub use diesel_player_repository::DieselPlayerRepository;
pub use diesel_prize_repository::DieselPrizeRepository;
pub use diesel_spin_log_repository::DieselSpinLogRepository;
pub use migrations::{MIGRATIONS, MigrationError, apply_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, PoolStatus};
