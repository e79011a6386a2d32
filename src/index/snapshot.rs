//! Wholesale export and import of engine state.
//!
//! The [`Snapshot`] is a plain serde structure; [`save`](Snapshot::save) and
//! [`load`](Snapshot::load) are thin JSON file glue on top of it.

use crate::config::EngineConfig;
use crate::index::ngram::LevelMap;
use crate::index::slots::Slot;
use crate::index::types::SlotId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Complete engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: EngineConfig,
    /// One map per shingle length, `indexes[i]` holding length `i + 1`.
    /// Lengths up to `max_shingle_length` that are not listed hold nothing.
    pub indexes: Vec<LevelMap>,
    /// Slot table by id, tombstones included
    pub records: Vec<Slot>,
    pub free_ids: Vec<SlotId>,
    pub next_id: SlotId,
    /// Primitive leaves indexed over the engine's lifetime
    #[serde(default)]
    pub leaf_count: u64,
    /// Settings changed after records were indexed
    #[serde(default)]
    pub needs_reindex: bool,
}

impl Snapshot {
    /// Write the snapshot as pretty JSON. The file is written beside `path`
    /// and renamed into place, so readers never see a half-written file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize index")?;
            writer.flush().context("Failed to write index")?;
        }
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move index into {}", path.display()))?;

        debug!(path = %path.display(), records = self.records.len(), "saved snapshot");
        Ok(())
    }

    /// Read a snapshot written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), records = snapshot.records.len(), "loaded snapshot");
        Ok(snapshot)
    }
}
