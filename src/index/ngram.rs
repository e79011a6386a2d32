//! Multi-resolution shingle index.
//!
//! Level `i` maps every shingle of `i + 1` characters to the ids of the
//! records containing it. Posting lists keep insertion order and never hold
//! an id twice; a shingle whose list empties is deleted outright, so "no
//! entry" is the only way to say "no match".
//!
//! Levels are materialized on first insert. The configured depth only caps
//! them, so a large depth costs nothing until text that long is indexed.

use crate::error::{Error, Result};
use crate::index::types::{LevelStats, SlotId};
use crate::utils::char_len;
use ahash::AHashMap;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Insertion-ordered ids for one shingle
pub type Posting = Vec<SlotId>;

/// Persisted form of one level: sorted for stable files
pub type LevelMap = BTreeMap<String, Posting>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NgramIndex {
    depth: usize,
    /// Materialized levels, never more than `depth`
    levels: Vec<AHashMap<String, Posting>>,
}

impl NgramIndex {
    /// Create an empty index for shingle lengths `1..=depth`
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            levels: Vec::new(),
        }
    }

    /// Longest shingle length this index accepts
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of levels holding or having held shingles
    pub fn materialized(&self) -> usize {
        self.levels.len()
    }

    /// Add `id` to the posting of `shingle` at `level`.
    ///
    /// All shingles of one record are inserted in a single pass, and a record
    /// id is absent from every posting before that pass, so a repeat of the
    /// same id can only sit at the tail of the list.
    pub(crate) fn insert(&mut self, level: usize, shingle: &str, id: SlotId) {
        debug_assert!(level < self.depth, "level {} out of range", level);
        if level >= self.depth {
            return;
        }
        if level >= self.levels.len() {
            self.levels.resize_with(level + 1, AHashMap::new);
        }
        let map = &mut self.levels[level];

        match map.get_mut(shingle) {
            Some(posting) => {
                if posting.last() != Some(&id) {
                    debug_assert!(!posting.contains(&id), "id {} inserted non-contiguously", id);
                    posting.push(id);
                }
            }
            None => {
                map.insert(shingle.to_owned(), vec![id]);
            }
        }
    }

    /// Remove `id` from the posting of `shingle`, deleting the shingle when
    /// nothing else references it. Returns whether the id was present.
    pub(crate) fn remove(&mut self, level: usize, shingle: &str, id: SlotId) -> bool {
        let Some(map) = self.levels.get_mut(level) else {
            return false;
        };
        let Some(posting) = map.get_mut(shingle) else {
            return false;
        };
        // Recently added ids sit at the tail
        let Some(pos) = posting.iter().rposition(|&existing| existing == id) else {
            return false;
        };
        posting.remove(pos);
        if posting.is_empty() {
            map.remove(shingle);
        }
        true
    }

    /// Ids whose records contain `shingle`; empty when there is no entry.
    pub fn lookup(&self, level: usize, shingle: &str) -> &[SlotId] {
        self.levels
            .get(level)
            .and_then(|map| map.get(shingle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct shingles at `level`
    pub fn level_len(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(|map| map.is_empty())
    }

    /// True if any posting at any level references `id`
    pub fn references(&self, id: SlotId) -> bool {
        self.levels
            .iter()
            .any(|map| map.values().any(|posting| posting.contains(&id)))
    }

    /// Drop `id` from every posting at every level, wherever it sits.
    /// Returns the number of postings that referenced it.
    pub(crate) fn purge(&mut self, id: SlotId) -> usize {
        let mut touched = 0;
        for map in &mut self.levels {
            map.retain(|_, posting| {
                let before = posting.len();
                posting.retain(|&existing| existing != id);
                if posting.len() != before {
                    touched += 1;
                }
                !posting.is_empty()
            });
        }
        touched
    }

    /// Change the depth. Levels beyond it are dropped; deeper ones appear
    /// on demand.
    pub(crate) fn resize(&mut self, depth: usize) {
        self.depth = depth;
        self.levels.truncate(depth);
    }

    pub(crate) fn clear(&mut self) {
        for map in &mut self.levels {
            map.clear();
        }
    }

    pub fn stats(&self) -> Vec<LevelStats> {
        self.levels
            .iter()
            .enumerate()
            .map(|(level, map)| LevelStats {
                shingle_length: level + 1,
                shingles: map.len(),
                postings: map.values().map(Vec::len).sum(),
            })
            .collect()
    }

    /// Export every materialized level as a sorted map
    pub fn to_levels(&self) -> Vec<LevelMap> {
        self.levels
            .iter()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .collect()
    }

    /// Rebuild from persisted levels. `is_live` decides which ids may appear.
    ///
    /// Empty postings are dropped; levels beyond `depth`, wrong shingle
    /// lengths, duplicate ids and ids of dead slots are rejected. Levels not
    /// listed are empty.
    pub fn from_levels(
        levels: Vec<LevelMap>,
        depth: usize,
        is_live: impl Fn(SlotId) -> bool,
    ) -> Result<Self> {
        if levels.len() > depth {
            return Err(Error::InvalidSnapshot(format!(
                "{} index levels for max_shingle_length {}",
                levels.len(),
                depth
            )));
        }

        let mut built = Vec::with_capacity(levels.len());
        let mut seen: FxHashSet<SlotId> = FxHashSet::default();

        for (level, persisted) in levels.into_iter().enumerate() {
            let mut map = AHashMap::with_capacity(persisted.len());
            for (shingle, posting) in persisted {
                if char_len(&shingle) != level + 1 {
                    return Err(Error::InvalidSnapshot(format!(
                        "shingle {:?} stored at level {} (length {})",
                        shingle,
                        level,
                        level + 1
                    )));
                }
                if posting.is_empty() {
                    continue;
                }
                seen.clear();
                for &id in &posting {
                    if !is_live(id) {
                        return Err(Error::InvalidSnapshot(format!(
                            "shingle {:?} references dead id {}",
                            shingle, id
                        )));
                    }
                    if !seen.insert(id) {
                        return Err(Error::InvalidSnapshot(format!(
                            "shingle {:?} lists id {} twice",
                            shingle, id
                        )));
                    }
                }
                map.insert(shingle, posting);
            }
            built.push(map);
        }

        Ok(Self {
            depth,
            levels: built,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = NgramIndex::new(3);
        index.insert(0, "p", 0);
        index.insert(0, "p", 1);
        index.insert(1, "pe", 0);

        assert_eq!(index.materialized(), 2);
        assert_eq!(index.lookup(0, "p"), &[0, 1]);
        assert_eq!(index.lookup(1, "pe"), &[0]);
        assert!(index.lookup(2, "pet").is_empty());
        assert!(index.lookup(7, "anything").is_empty());
    }

    #[test]
    fn test_insert_same_id_is_noop() {
        let mut index = NgramIndex::new(1);
        index.insert(0, "a", 4);
        index.insert(0, "a", 4);
        assert_eq!(index.lookup(0, "a"), &[4]);
    }

    #[test]
    fn test_remove_deletes_empty_entries() {
        let mut index = NgramIndex::new(2);
        index.insert(0, "a", 0);
        index.insert(0, "a", 1);

        assert!(index.remove(0, "a", 0));
        assert_eq!(index.lookup(0, "a"), &[1]);
        assert!(index.remove(0, "a", 1));
        assert_eq!(index.level_len(0), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut index = NgramIndex::new(1);
        index.insert(0, "a", 0);
        assert!(!index.remove(0, "a", 9));
        assert!(!index.remove(0, "b", 0));
        assert!(!index.remove(3, "a", 0));
        assert_eq!(index.lookup(0, "a"), &[0]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut index = NgramIndex::new(1);
        for id in [3, 1, 2] {
            index.insert(0, "x", id);
        }
        index.remove(0, "x", 1);
        assert_eq!(index.lookup(0, "x"), &[3, 2]);
    }

    #[test]
    fn test_purge() {
        let mut index = NgramIndex::new(2);
        index.insert(0, "a", 0);
        index.insert(0, "a", 1);
        index.insert(1, "ab", 1);
        assert_eq!(index.purge(1), 2);
        assert_eq!(index.lookup(0, "a"), &[0]);
        assert_eq!(index.level_len(1), 0);
        assert!(!index.references(1));
    }

    #[test]
    fn test_resize() {
        let mut index = NgramIndex::new(2);
        index.insert(1, "ab", 0);
        index.resize(4);
        assert_eq!(index.depth(), 4);
        assert_eq!(index.lookup(1, "ab"), &[0]);
        index.resize(1);
        assert_eq!(index.depth(), 1);
        assert!(index.lookup(1, "ab").is_empty());
    }

    #[test]
    fn test_huge_depth_allocates_on_demand() {
        let mut index = NgramIndex::new(1 << 40);
        assert_eq!(index.materialized(), 0);
        index.insert(2, "abc", 0);
        assert_eq!(index.materialized(), 3);
        assert!(index.lookup(1 << 30, "x").is_empty());
        assert_eq!(index.stats().len(), 3);

        index.resize(1 << 50);
        assert_eq!(index.materialized(), 3);
    }

    #[test]
    fn test_levels_roundtrip_and_validation() {
        let mut index = NgramIndex::new(2);
        index.insert(0, "a", 0);
        index.insert(1, "ab", 0);
        let levels = index.to_levels();
        let rebuilt = NgramIndex::from_levels(levels.clone(), 2, |id| id == 0).unwrap();
        assert_eq!(rebuilt, index);

        assert!(NgramIndex::from_levels(levels.clone(), 2, |_| false).is_err());
        assert!(NgramIndex::from_levels(levels, 1, |_| true).is_err());

        let mut wrong_length = vec![LevelMap::new()];
        wrong_length[0].insert("ab".to_string(), vec![0]);
        assert!(NgramIndex::from_levels(wrong_length, 1, |_| true).is_err());

        let mut duplicate = vec![LevelMap::new()];
        duplicate[0].insert("a".to_string(), vec![0, 0]);
        assert!(NgramIndex::from_levels(duplicate, 1, |_| true).is_err());
    }

    #[test]
    fn test_from_levels_drops_empty_postings() {
        let mut levels = vec![LevelMap::new()];
        levels[0].insert("a".to_string(), vec![]);
        let index = NgramIndex::from_levels(levels, 3, |_| true).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut index = NgramIndex::new(2);
        index.insert(0, "a", 0);
        index.insert(0, "a", 1);
        index.insert(0, "b", 0);
        index.insert(1, "ab", 0);
        index.remove(1, "ab", 0);
        let stats = index.stats();
        assert_eq!(stats[0].shingles, 2);
        assert_eq!(stats[0].postings, 3);
        assert_eq!(stats[1].shingle_length, 2);
        assert_eq!(stats[1].postings, 0);
    }
}
