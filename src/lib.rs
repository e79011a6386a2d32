//! # gramdex - Embeddable n-gram substring index
//!
//! gramdex indexes arbitrary structured records (text, numbers, booleans and
//! nested arrays/objects) and answers "which records contain this substring"
//! without scanning every stored record.
//!
//! ## Architecture
//!
//! - [`record`] - The record model and search terms
//! - [`index`] - Slot store, multi-level shingle index, indexer, snapshots
//! - [`query`] - Direct and indirect search paths
//! - [`engine`] - The [`Engine`] tying configuration, slots and index together
//! - [`utils`] - Shingle cutting, record traversal, app data helpers
//!
//! ## Quick Start
//!
//! ```
//! use gramdex::{Engine, EngineConfig, Record};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.add("Peter").unwrap();
//! engine.add("Paul").unwrap();
//! engine.add("Maria").unwrap();
//!
//! let found = engine.search("p").unwrap();
//! assert_eq!(found, vec![&Record::from("Peter"), &Record::from("Paul")]);
//! ```
//!
//! ## How search works
//!
//! Every primitive leaf is cut into shingles of every length `1..=K` and each
//! shingle maps to the ids containing it. A query of at most K characters is a
//! single lookup. A longer query is cut into K-length shingles; only ids seen
//! under every one of them are candidates, and each candidate is checked for
//! a literal match before it is returned.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod record;
pub mod utils;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use index::{EngineStats, Hit, SlotId, Snapshot};
pub use record::{Record, SearchTerm};
pub use utils::{FieldFilter, FieldKey};
