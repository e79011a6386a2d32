//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`shingle`] - Fixed-length character shingles for indexing and queries
//! - [`traverse`] - Depth-first leaf walk over records, with field filters
//! - [`app_data`] - Application data directory and CLI configuration
//! - [`progress`] - Progress bar that compiles away without the `progress` feature
//!
//! ## Key Functions
//!
//! ```
//! use gramdex::utils::cut;
//!
//! let shingles = cut("banana", 2).unwrap();
//! assert_eq!(shingles, vec!["ba", "an", "na"]);
//! ```

pub mod app_data;
pub mod progress;
pub mod shingle;
pub mod traverse;

pub use app_data::*;
pub use shingle::*;
pub use traverse::*;
