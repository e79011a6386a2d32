use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Stable identifier of a record slot
pub type SlotId = u32;

/// A search result: the slot id and the live record stored there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub id: SlotId,
    pub record: &'a Record,
}

/// Per-level index statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Shingle length of this level
    pub shingle_length: usize,
    /// Distinct shingles stored
    pub shingles: usize,
    /// Total (shingle, id) entries
    pub postings: usize,
}

/// Engine statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub live_records: usize,
    pub tombstones: usize,
    pub free_ids: usize,
    pub next_id: SlotId,
    /// Primitive leaves indexed over the engine's lifetime
    pub leaf_count: u64,
    pub levels: Vec<LevelStats>,
}

impl EngineStats {
    pub fn total_shingles(&self) -> usize {
        self.levels.iter().map(|l| l.shingles).sum()
    }

    pub fn total_postings(&self) -> usize {
        self.levels.iter().map(|l| l.postings).sum()
    }
}
