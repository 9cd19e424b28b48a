//! # warung-db: Database Layer for Warung POS
//!
//! This crate provides database access for the Warung POS checkout engine.
//! It uses SQLite for local storage with sqlx for async operations, and
//! hosts the checkout orchestrator.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Warung POS Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP boundary, seed binary, tests)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Checkout    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (checkout.rs) │───►│ ProductRepo   │    │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo  │    │              │  │   │
//! │  │   │ one atomic    │    │ TxnRepo       │    │ 001_init.sql │  │   │
//! │  │   │ scope per     │    │ LedgerRepo    │    │              │  │   │
//! │  │   │ sale          │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │           ▼                    ▼                               │   │
//! │  │   ┌─────────────────────────────────────────────────────────┐ │   │
//! │  │   │           Database / SqlitePool (pool.rs)               │ │   │
//! │  │   └─────────────────────────────────────────────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  SQLite (WAL)                 ReplicationSink (warung-sync)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The checkout orchestrator and its error taxonomy
//! - [`catalog`] - Product/customer creation wired to the replication sink
//! - [`bootstrap`] - Idempotent demo-store seeding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{CheckoutService, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/warung.db")).await?;
//! let service = CheckoutService::without_replication(db.clone());
//! let txn = service.checkout(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bootstrap;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutResult, CheckoutService, NullSink, ReplicationSink};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::transaction::TransactionRepository;
