//! nebula-load library
//!
//! A bulk loader that ingests GraphRAG-extracted knowledge-graph data
//! (entities and relationships, delivered as columnar tables) into a
//! NebulaGraph space.
//!
//! # Pipeline
//!
//! One run walks a fixed sequence: connect to the store, read both tables,
//! create one tag per discovered entity type, bulk-insert entities per tag,
//! bulk-insert relationships as `RELATED` edges, then reconcile stored
//! counts against what was sent.
//!
//! - Tag names are derived from free-text entity types by [`ident::sanitize_label`]
//! - Every interpolated value is escaped by [`value`]; nothing else formats literals
//! - Statements go through the retrying [`executor::Executor`]: a failed
//!   insert batch is recorded and skipped, a failed tag creation aborts the run
//! - Delivery is at-least-once: retried batches can duplicate rows, which
//!   reconciliation surfaces as count mismatches (warnings, never errors)
//!
//! # CLI Usage
//!
//! ```bash
//! nebula-load --config nebula_config.yaml
//!
//! # Render and count batches without writing data
//! nebula-load --config nebula_config.yaml --dry-run
//! ```

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod ident;
pub mod loader;
pub mod schema;
pub mod statement;
pub mod stats;
pub mod validate;
pub mod value;

pub use client::{ExecOutcome, GatewaySession, GraphSession};
pub use config::AppConfig;
pub use dataset::{Dataset, EntityRow, RelationshipRow};
pub use error::{LoadError, StoreError};
pub use loader::{LoadPhase, Loader};
pub use stats::ImportStats;
