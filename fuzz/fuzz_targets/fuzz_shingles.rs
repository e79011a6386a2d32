#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, u8)| {
    let (text, len) = input;
    let len = len as usize % 16;
    // Length 0 must be an error, never a panic
    let Ok(shingles) = gramdex::utils::cut(text, len) else {
        assert_eq!(len, 0);
        return;
    };
    for shingle in &shingles {
        assert_eq!(gramdex::utils::char_len(shingle), len);
        assert!(text.contains(shingle.as_str()));
    }
});
