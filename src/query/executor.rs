use crate::error::Result;
use crate::index::ngram::NgramIndex;
use crate::index::slots::SlotStore;
use crate::index::types::{Hit, SlotId};
use crate::record::{Record, SearchTerm};
use crate::utils::{char_len, cut_slices, traverse};
use rustc_hash::FxHashMap;
use std::ops::ControlFlow;
use tracing::debug;

/// Strategy chosen for a normalized query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    /// Empty query: nothing matches
    Empty,
    /// Query fits an indexed level: one lookup
    Direct { level: usize },
    /// Query is longer than the deepest level: decompose, count, verify
    Indirect { shingle_length: usize },
}

impl SearchPath {
    /// Pick the path for a query of `query_len` characters over `depth` levels
    pub fn for_length(query_len: usize, depth: usize) -> Self {
        if query_len == 0 || depth == 0 {
            SearchPath::Empty
        } else if query_len <= depth {
            SearchPath::Direct { level: query_len - 1 }
        } else {
            SearchPath::Indirect { shingle_length: depth }
        }
    }
}

/// Read-only searcher over one index/store snapshot
pub struct QueryExecutor<'a> {
    index: &'a NgramIndex,
    slots: &'a SlotStore,
    case_insensitive: bool,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(index: &'a NgramIndex, slots: &'a SlotStore, case_insensitive: bool) -> Self {
        Self {
            index,
            slots,
            case_insensitive,
        }
    }

    /// Execute a query and return matching live records
    pub fn execute(&self, term: &SearchTerm) -> Result<Vec<Hit<'a>>> {
        let query = term.normalized(self.case_insensitive);
        let path = SearchPath::for_length(char_len(&query), self.index.depth());
        debug!(query = %query, ?path, "search");

        match path {
            SearchPath::Empty => Ok(Vec::new()),
            SearchPath::Direct { level } => Ok(self.direct(level, &query)),
            SearchPath::Indirect { shingle_length } => self.indirect(shingle_length, &query),
        }
    }

    fn direct(&self, level: usize, query: &str) -> Vec<Hit<'a>> {
        let ids = self.index.lookup(level, query);
        debug!(level, found = ids.len(), "direct lookup");
        ids.iter().filter_map(|&id| self.live(id)).collect()
    }

    fn indirect(&self, shingle_length: usize, query: &str) -> Result<Vec<Hit<'a>>> {
        let level = shingle_length - 1;
        let parts = cut_slices(query, shingle_length)?;

        // Occurrence count per id, remembering first-seen order
        let mut counts: FxHashMap<SlotId, usize> = FxHashMap::default();
        let mut order: Vec<SlotId> = Vec::new();
        let mut parts_found = 0;

        for part in &parts {
            let ids = self.index.lookup(level, part);
            if ids.is_empty() {
                continue;
            }
            parts_found += 1;
            for &id in ids {
                let count = counts.entry(id).or_insert(0);
                if *count == 0 {
                    order.push(id);
                }
                *count += 1;
            }
        }

        debug!(parts = parts.len(), parts_found, candidates = order.len(), "indirect lookup");

        // The parts cover the query end to end, so a real match hits every one
        if order.is_empty() || parts_found < parts.len() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for id in order {
            if counts.get(&id) != Some(&parts.len()) {
                continue;
            }
            let Some(hit) = self.live(id) else {
                continue;
            };
            if self.verify(hit.record, query)? {
                hits.push(hit);
            }
        }

        debug!(matched = hits.len(), "verified candidates");
        Ok(hits)
    }

    /// Does some leaf of `record` literally contain `query`?
    fn verify(&self, record: &Record, query: &str) -> Result<bool> {
        let case_insensitive = self.case_insensitive;
        let flow = traverse(record, None, |_, leaf| match leaf.leaf_text(case_insensitive) {
            Some(text) if text.contains(query) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        })?;
        Ok(flow.is_break())
    }

    fn live(&self, id: SlotId) -> Option<Hit<'a>> {
        match self.slots.get(id) {
            Ok(Some(record)) => Some(Hit { id, record }),
            _ => {
                debug!(id, "index references a dead slot");
                None
            }
        }
    }
}
