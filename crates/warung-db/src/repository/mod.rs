//! # Repository Module
//!
//! Database repository implementations for Warung POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Checkout orchestrator / caller                                        │
//! │       │                                                                 │
//! │       │  db.products().get_by_id("uuid")                                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)            ← pool-backed reads               │
//! │  ├── insert(&self, product)                                            │
//! │  └── reserve_stock(conn, id, qty)    ← conn-backed, runs INSIDE the    │
//! │       │                                checkout transaction scope       │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Methods
//!
//! Repositories expose both pool-backed methods (standalone reads/writes) and
//! `&mut SqliteConnection` methods. The connection-backed methods exist so the
//! checkout orchestrator can run every mutation of a sale inside ONE sqlx
//! transaction: all of them commit together or none do.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog reads and guarded stock updates
//! - [`customer::CustomerRepository`] - Customer lookup and aggregates
//! - [`transaction::TransactionRepository`] - Committed checkout records
//! - [`ledger::LedgerRepository`] - Append-only receivables audit trail

pub mod customer;
pub mod ledger;
pub mod product;
pub mod transaction;
