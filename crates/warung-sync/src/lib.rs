//! # warung-sync: Replication Relay for Warung POS
//!
//! Best-effort, asynchronous mirroring of committed transactions and catalog
//! rows to a secondary document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Warung POS Replication Flow                           │
//! │                                                                         │
//! │  warung-db CheckoutService / CatalogService                            │
//! │       │ (after COMMIT — the local row is already durable)              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  warung-sync (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   RelayHandle (ReplicationSink)                                │   │
//! │  │       │ try_send — never blocks, drops when full               │   │
//! │  │       ▼                                                         │   │
//! │  │   ReplicationRelay worker ──► DocumentStore (REST / memory)    │   │
//! │  │       │                                                         │   │
//! │  │       └── mirror-id writeback into the local database          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  DELIVERY CONTRACT: at-most-once. A full queue, a dead mirror or a     │
//! │  crash loses mirror copies, never sales. The local SQLite database     │
//! │  is the single source of truth.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`relay`] - The relay worker, its handle and queue semantics
//! - [`document`] - Document store trait, REST client, mirror shapes
//! - [`config`] - Relay tuning knobs
//! - [`error`] - Relay-internal error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod document;
pub mod error;
pub mod relay;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::RelayConfig;
pub use document::{
    CustomerDocument, DocumentStore, MemoryDocumentStore, ProductDocument,
    ReceivableLogDocument, RestDocumentStore, TransactionDocument,
};
pub use error::{RelayError, RelayResult};
pub use relay::{RelayEvent, RelayHandle, ReplicationRelay};
