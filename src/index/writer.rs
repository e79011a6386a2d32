use crate::error::Result;
use crate::index::ngram::NgramIndex;
use crate::index::types::SlotId;
use crate::record::Record;
use crate::utils::{cut_slices, traverse, FieldFilter};
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// Every shingle a record contributes, grouped by level.
///
/// Plans are computed before the index is touched, so a record that fails
/// traversal leaves the index exactly as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShinglePlan {
    /// `levels[i]` holds the shingles of length `i + 1`, leaf by leaf. Stops
    /// at the longest leaf, so it can be shorter than the index depth.
    pub levels: Vec<Vec<String>>,
    /// Primitive leaves that fed the plan
    pub leaves: u64,
}

impl ShinglePlan {
    pub fn shingle_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}

/// Drives traversal and shingle cutting into the n-gram index
pub struct IndexWriter<'a> {
    index: &'a mut NgramIndex,
    case_insensitive: bool,
}

impl<'a> IndexWriter<'a> {
    pub fn new(index: &'a mut NgramIndex, case_insensitive: bool) -> Self {
        Self {
            index,
            case_insensitive,
        }
    }

    /// Compute the shingles `record` contributes, honoring `filter`.
    pub fn plan(&self, record: &Record, filter: Option<&FieldFilter<'_>>) -> Result<ShinglePlan> {
        build_plan(record, filter, self.index.depth(), self.case_insensitive)
    }

    /// Index every leaf of `record` under `id`. Returns the leaf count.
    pub fn index_add(
        &mut self,
        id: SlotId,
        record: &Record,
        filter: Option<&FieldFilter<'_>>,
    ) -> Result<u64> {
        let plan = self.plan(record, filter)?;
        self.apply_add(id, &plan);
        Ok(plan.leaves)
    }

    /// Remove `id` from every shingle `record` could have contributed.
    ///
    /// The plan is recomputed without a filter: that is a superset of what
    /// was inserted, and removing an absent id is a no-op.
    pub fn index_remove(&mut self, id: SlotId, record: &Record) -> Result<usize> {
        let plan = self.plan(record, None)?;
        Ok(self.apply_remove(id, &plan))
    }

    /// Insert a precomputed plan. Cannot fail.
    pub fn apply_add(&mut self, id: SlotId, plan: &ShinglePlan) {
        for (level, shingles) in plan.levels.iter().enumerate() {
            for shingle in shingles {
                self.index.insert(level, shingle, id);
            }
        }
        debug!(
            id,
            leaves = plan.leaves,
            shingles = plan.shingle_count(),
            "indexed record"
        );
    }

    /// Remove a precomputed plan. Returns how many postings dropped `id`.
    pub fn apply_remove(&mut self, id: SlotId, plan: &ShinglePlan) -> usize {
        let mut removed = 0;
        for (level, shingles) in plan.levels.iter().enumerate() {
            for shingle in shingles {
                if self.index.remove(level, shingle, id) {
                    removed += 1;
                }
            }
        }
        debug!(id, removed, "unindexed record");
        removed
    }
}

/// Shingle plan for `record` over `depth` levels.
pub fn build_plan(
    record: &Record,
    filter: Option<&FieldFilter<'_>>,
    depth: usize,
    case_insensitive: bool,
) -> Result<ShinglePlan> {
    let mut texts: Vec<String> = Vec::new();
    traverse(record, filter, |key, value| {
        if let Some(text) = value.leaf_text(case_insensitive) {
            trace!(field = %key, kind = value.kind(), "leaf");
            texts.push(text);
        }
        ControlFlow::Continue(())
    })?;

    let mut plan = ShinglePlan {
        levels: Vec::new(),
        leaves: texts.len() as u64,
    };

    // Levels are only as deep as the longest leaf, whatever `depth` is
    for text in &texts {
        for level in 0..depth {
            let shingles = cut_slices(text, level + 1)?;
            // Nothing at this length means nothing at any longer length
            if shingles.is_empty() {
                break;
            }
            if plan.levels.len() == level {
                plan.levels.push(Vec::new());
            }
            plan.levels[level].extend(shingles.into_iter().map(str::to_owned));
        }
    }

    Ok(plan)
}
