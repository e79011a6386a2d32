#![no_main]

use arbitrary::Arbitrary;
use gramdex::{Engine, EngineConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add(String),
    Remove(u8),
    Search(String),
    SetLength(u8),
    SetCaseInsensitive(bool),
    Roundtrip,
}

fuzz_target!(|input: (u8, Vec<Op>)| {
    let (k, ops) = input;
    let config = EngineConfig::default().with_max_shingle_length(k as usize % 8 + 1);
    let Ok(mut engine) = Engine::new(config) else {
        return;
    };

    for op in ops {
        match op {
            Op::Add(text) => {
                engine.add(text).unwrap();
            }
            Op::Remove(id) => {
                let _ = engine.remove(id as u32 % 16);
            }
            Op::Search(query) => {
                let found = engine.search(query.as_str()).unwrap();
                // Every hit is a live record
                assert!(found.len() <= engine.len());
            }
            Op::SetLength(k) => {
                let _ = engine.set_max_shingle_length(k as usize % 8);
            }
            Op::SetCaseInsensitive(on) => engine.set_case_insensitive(on),
            Op::Roundtrip => {
                engine = Engine::import_state(engine.export_state()).unwrap();
            }
        }
    }

    // Removing every live record leaves no posting behind
    let ids: Vec<u32> = engine.records().map(|(id, _)| id).collect();
    for id in ids {
        engine.remove(id).unwrap();
    }
    assert!(engine.index().is_empty());
});
