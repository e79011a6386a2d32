//! Property tests for shingling, search and removal.

use gramdex::record::normalize;
use gramdex::utils::{char_len, cut, leaves};
use gramdex::{Engine, EngineConfig, FieldKey, Record, Snapshot};
use proptest::prelude::*;

fn engine_with(k: usize) -> Engine {
    Engine::new(EngineConfig::default().with_max_shingle_length(k)).unwrap()
}

/// Small alphabet so that queries actually hit, with one folded letter
fn text() -> impl Strategy<Value = String> {
    "[abcAB ä]{0,12}"
}

fn query() -> impl Strategy<Value = String> {
    "[abcä]{1,7}"
}

/// Nested records over every leaf kind. Object keys come from a tiny pool so
/// repeated keys inside one object are common.
fn record() -> impl Strategy<Value = Record> {
    let leaf = prop_oneof![
        4 => text().prop_map(Record::from),
        1 => any::<i64>().prop_map(Record::from),
        1 => any::<bool>().prop_map(Record::from),
        1 => Just(Record::Null),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Record::Array),
            prop::collection::vec(("[ab]{1,2}", inner), 0..4).prop_map(Record::Object),
        ]
    })
}

/// Save and restore through JSON text, the way `save`/`load` do
fn through_json(engine: &Engine) -> Engine {
    let json = serde_json::to_string_pretty(&engine.export_state()).unwrap();
    let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
    Engine::import_state(snapshot).unwrap()
}

fn contains_in_some_leaf(record: &Record, query: &str) -> bool {
    let needle = normalize(query, true);
    leaves(record, None)
        .unwrap()
        .iter()
        .filter_map(|(_, leaf)| leaf.leaf_text(true))
        .any(|text| text.contains(needle.as_ref()))
}

/// Ids whose text contains `query` after folding, in ascending order
fn expected_ids(texts: &[String], query: &str) -> Vec<u32> {
    let needle = normalize(query, true);
    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| normalize(t, true).contains(needle.as_ref()))
        .map(|(i, _)| i as u32)
        .collect()
}

proptest! {
    #[test]
    fn prop_cut_is_unique_ordered_and_complete(s in text(), len in 1usize..6) {
        let shingles = cut(&s, len).unwrap();
        let chars: Vec<char> = s.chars().collect();

        for shingle in &shingles {
            prop_assert_eq!(char_len(shingle), len);
        }
        for (i, a) in shingles.iter().enumerate() {
            prop_assert!(!shingles[i + 1..].contains(a));
        }

        // Every window appears, in order of first occurrence
        let mut first_seen: Vec<String> = Vec::new();
        for window in chars.windows(len) {
            let w: String = window.iter().collect();
            if !first_seen.contains(&w) {
                first_seen.push(w);
            }
        }
        prop_assert_eq!(shingles, first_seen);
    }

    #[test]
    fn prop_search_agrees_with_containment(
        texts in prop::collection::vec(text(), 1..12),
        q in query(),
        k in 1usize..6,
    ) {
        let mut engine = engine_with(k);
        for t in &texts {
            engine.add(t.as_str()).unwrap();
        }

        let found: Vec<u32> = engine.search_hits(q.as_str()).unwrap().iter().map(|h| h.id).collect();
        prop_assert_eq!(found, expected_ids(&texts, &q));
    }

    #[test]
    fn prop_search_after_removals(
        texts in prop::collection::vec(text(), 1..12),
        removed in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        q in query(),
        k in 1usize..6,
    ) {
        let mut engine = engine_with(k);
        for t in &texts {
            engine.add(t.as_str()).unwrap();
        }
        let mut gone: Vec<u32> = Vec::new();
        for index in removed {
            let id = index.index(texts.len()) as u32;
            if !gone.contains(&id) {
                engine.remove(id).unwrap();
                gone.push(id);
            }
        }

        let mut found: Vec<u32> = engine.search_hits(q.as_str()).unwrap().iter().map(|h| h.id).collect();
        found.sort_unstable();
        let expected: Vec<u32> = expected_ids(&texts, &q)
            .into_iter()
            .filter(|id| !gone.contains(id))
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_structured_search_agrees_with_leaves(
        records in prop::collection::vec(record(), 1..8),
        q in query(),
        k in 1usize..5,
    ) {
        let mut engine = engine_with(k);
        for record in &records {
            engine.add(record.clone()).unwrap();
        }

        let found: Vec<u32> = engine.search_hits(q.as_str()).unwrap().iter().map(|h| h.id).collect();
        let expected: Vec<u32> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| contains_in_some_leaf(r, &q))
            .map(|(i, _)| i as u32)
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_removing_everything_empties_the_index(
        records in prop::collection::vec(record(), 0..10),
        k in 1usize..8,
    ) {
        let mut engine = engine_with(k);
        let ids: Vec<u32> = records.iter().map(|r| engine.add(r.clone()).unwrap()).collect();

        let mut engine = through_json(&engine);
        for &id in ids.iter().rev() {
            engine.remove(id).unwrap();
            prop_assert!(!engine.index().references(id));
        }

        prop_assert!(engine.index().is_empty());
        prop_assert!(engine.is_empty());
        let snapshot = engine.export_state();
        prop_assert!(snapshot.indexes.len() <= k);
        prop_assert_eq!(snapshot.free_ids.len(), records.len());

        // Freed ids come back in the original order and start clean
        let mut fresh = engine_with(k);
        for record in &records {
            engine.add(record.clone()).unwrap();
            fresh.add(record.clone()).unwrap();
        }
        prop_assert_eq!(engine.export_state().indexes, fresh.export_state().indexes);
    }

    #[test]
    fn prop_filtered_field_is_never_found(
        kept in "[ab]{1,6}",
        hidden in "[xy]{1,6}",
        k in 1usize..5,
    ) {
        let mut engine = engine_with(k);
        let record = Record::object([("kept", kept.clone()), ("hidden", hidden.clone())]);
        engine
            .add_filtered(record, |key: FieldKey<'_>, _: &Record| key.as_name() != Some("hidden"))
            .unwrap();

        prop_assert!(engine.search(hidden.as_str()).unwrap().is_empty());
        prop_assert_eq!(engine.search(kept.as_str()).unwrap().len(), 1);
    }

    #[test]
    fn prop_snapshot_json_roundtrip(
        records in prop::collection::vec(record(), 0..8),
        removed in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        q in query(),
        k in 1usize..5,
    ) {
        let mut engine = engine_with(k);
        for record in &records {
            engine.add(record.clone()).unwrap();
        }
        if !records.is_empty() {
            for index in removed {
                let id = index.index(records.len()) as u32;
                let _ = engine.remove(id);
            }
        }

        let mut restored = through_json(&engine);
        prop_assert_eq!(restored.export_state(), engine.export_state());
        prop_assert_eq!(restored.search(q.as_str()).unwrap(), engine.search(q.as_str()).unwrap());

        // Removal after a restore is as complete as before it
        let live: Vec<u32> = restored.records().map(|(id, _)| id).collect();
        for id in live {
            restored.remove(id).unwrap();
        }
        prop_assert!(restored.index().is_empty());
    }
}
