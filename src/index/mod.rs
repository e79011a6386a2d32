pub mod ngram;
pub mod slots;
pub mod snapshot;
pub mod types;
pub mod writer;

pub use ngram::NgramIndex;
pub use slots::{Slot, SlotStore};
pub use snapshot::Snapshot;
pub use types::*;
pub use writer::{IndexWriter, ShinglePlan};
