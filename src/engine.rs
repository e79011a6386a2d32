//! The search engine: configuration, record slots and the shingle index,
//! owned together by one explicit value.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::index::ngram::NgramIndex;
use crate::index::slots::SlotStore;
use crate::index::snapshot::Snapshot;
use crate::index::types::{EngineStats, Hit, SlotId};
use crate::index::writer::{build_plan, IndexWriter};
use crate::query::QueryExecutor;
use crate::record::{Record, SearchTerm};
use crate::utils::{FieldFilter, FieldKey};
use std::path::Path;
use tracing::{debug, warn};

/// Embeddable substring index over structured records.
///
/// The engine does no locking of its own: every call runs to completion, and
/// callers sharing one engine must serialize mutations against each other
/// and against searches.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    index: NgramIndex,
    slots: SlotStore,
    leaf_count: u64,
    /// The configuration changed while records were indexed, so the stored
    /// shingles no longer match what the current settings would produce
    needs_reindex: bool,
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            index: NgramIndex::new(config.max_shingle_length),
            config,
            slots: SlotStore::new(),
            leaf_count: 0,
            needs_reindex: false,
        }
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index: NgramIndex::new(config.max_shingle_length),
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn max_shingle_length(&self) -> usize {
        self.config.max_shingle_length
    }

    /// Change K. Levels deeper than the new K are dropped, but records
    /// already indexed are not re-cut: rebuilding is up to the caller.
    pub fn set_max_shingle_length(&mut self, k: usize) -> Result<()> {
        if k < 1 {
            return Err(Error::InvalidShingleLength(k));
        }
        if k == self.config.max_shingle_length {
            return Ok(());
        }
        self.config.max_shingle_length = k;
        self.index.resize(k);
        self.mark_reconfigured("max_shingle_length");
        Ok(())
    }

    pub fn case_insensitive(&self) -> bool {
        self.config.case_insensitive
    }

    /// Toggle case folding. Existing shingles keep the folding they were
    /// indexed with.
    pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
        if case_insensitive == self.config.case_insensitive {
            return;
        }
        self.config.case_insensitive = case_insensitive;
        self.mark_reconfigured("case_insensitive");
    }

    fn mark_reconfigured(&mut self, option: &str) {
        if !self.is_empty() {
            warn!(option, records = self.len(), "configuration changed on a populated index; re-add records to reindex");
            self.needs_reindex = true;
        }
    }

    /// Whether a configuration change has left indexed shingles out of date
    pub fn needs_reindex(&self) -> bool {
        self.needs_reindex
    }

    /// Store and index a record. Returns its slot id.
    pub fn add(&mut self, record: impl Into<Record>) -> Result<SlotId> {
        self.insert(record.into(), None)
    }

    /// Store and index a record, skipping every field `filter` rejects.
    pub fn add_filtered<F>(&mut self, record: impl Into<Record>, filter: F) -> Result<SlotId>
    where
        F: Fn(FieldKey<'_>, &Record) -> bool,
    {
        self.insert(record.into(), Some(&filter))
    }

    fn insert(&mut self, record: Record, filter: Option<&FieldFilter<'_>>) -> Result<SlotId> {
        // Everything fallible happens before the first mutation
        let plan = build_plan(
            &record,
            filter,
            self.index.depth(),
            self.config.case_insensitive,
        )?;

        let id = self.slots.allocate();
        debug!(id, kind = record.kind(), "next free slot");
        self.slots.store(id, record)?;
        IndexWriter::new(&mut self.index, self.config.case_insensitive).apply_add(id, &plan);
        self.leaf_count += plan.leaves;
        Ok(id)
    }

    /// Records containing `query`, in index order.
    pub fn search(&self, query: impl Into<SearchTerm>) -> Result<Vec<&Record>> {
        Ok(self
            .search_hits(query)?
            .into_iter()
            .map(|hit| hit.record)
            .collect())
    }

    /// Like [`search`](Self::search), but with the slot id of every match.
    pub fn search_hits(&self, query: impl Into<SearchTerm>) -> Result<Vec<Hit<'_>>> {
        QueryExecutor::new(&self.index, &self.slots, self.config.case_insensitive)
            .execute(&query.into())
    }

    /// Unindex and tombstone the record at `id`, returning it.
    pub fn remove(&mut self, id: SlotId) -> Result<Record> {
        let record = self.slots.get_live(id)?;

        if self.needs_reindex {
            // Shingles may have been cut under other settings: sweep everything
            let touched = self.index.purge(id);
            debug!(id, touched, "purged record from every level");
        } else {
            let plan = build_plan(
                record,
                None,
                self.index.depth(),
                self.config.case_insensitive,
            )?;
            IndexWriter::new(&mut self.index, self.config.case_insensitive).apply_remove(id, &plan);
        }

        let removed = self.slots.free(id)?;
        debug!(id, free_ids = ?self.slots.free_ids(), "freed slot");

        // Every record cut under old settings is gone now
        if self.needs_reindex && self.slots.live_count() == 0 {
            debug!("last stale record removed");
            self.needs_reindex = false;
        }
        Ok(removed)
    }

    /// Live record at `id`, `None` if it was removed.
    pub fn get(&self, id: SlotId) -> Result<Option<&Record>> {
        self.slots.get(id)
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.slots.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live records in id order
    pub fn records(&self) -> impl Iterator<Item = (SlotId, &Record)> {
        self.slots.iter_live()
    }

    /// Drop every record and shingle. Configuration is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.leaf_count = 0;
        self.needs_reindex = false;
        debug!("dropped all records");
    }

    pub fn index(&self) -> &NgramIndex {
        &self.index
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            live_records: self.slots.live_count(),
            tombstones: self.slots.tombstone_count(),
            free_ids: self.slots.free_ids().len(),
            next_id: self.slots.next_id(),
            leaf_count: self.leaf_count,
            levels: self.index.stats(),
        }
    }

    pub fn export_state(&self) -> Snapshot {
        Snapshot {
            config: self.config,
            indexes: self.index.to_levels(),
            records: self.slots.slots().to_vec(),
            free_ids: self.slots.free_ids().to_vec(),
            next_id: self.slots.next_id(),
            leaf_count: self.leaf_count,
            needs_reindex: self.needs_reindex,
        }
    }

    /// Rebuild an engine from a snapshot, rejecting inconsistent state.
    pub fn import_state(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            config,
            indexes,
            records,
            free_ids,
            next_id,
            leaf_count,
            needs_reindex,
        } = snapshot;

        config.validate()?;
        if next_id as usize != records.len() {
            return Err(Error::InvalidSnapshot(format!(
                "next_id {} does not match {} slots",
                next_id,
                records.len()
            )));
        }

        let slots = SlotStore::from_parts(records, free_ids)?;
        let index =
            NgramIndex::from_levels(indexes, config.max_shingle_length, |id| slots.is_live(id))?;

        Ok(Self {
            config,
            index,
            slots,
            leaf_count,
            needs_reindex,
        })
    }

    /// Save the engine state as a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.export_state().save(path)
    }

    /// Load an engine saved with [`save`](Self::save)
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let snapshot = Snapshot::load(path)?;
        Ok(Self::import_state(snapshot)?)
    }
}
