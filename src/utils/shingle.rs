use crate::error::{Error, Result};
use crate::record::Record;
use ahash::AHashSet;

/// Split `text` into every contiguous run of `length` characters.
///
/// Shingles come back in order of first occurrence with duplicates removed.
/// A text shorter than `length` yields an empty list; that emptiness always
/// means "too short", never "bad input", which is why `length == 0` is an
/// error instead.
pub fn cut(text: &str, length: usize) -> Result<Vec<String>> {
    Ok(cut_slices(text, length)?
        .into_iter()
        .map(str::to_owned)
        .collect())
}

/// Borrowing variant of [`cut`]: the shingles are slices of `text`.
pub fn cut_slices(text: &str, length: usize) -> Result<Vec<&str>> {
    if length < 1 {
        return Err(Error::InvalidShingleLength(length));
    }

    // Byte offset of every char boundary, including the end of the string
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = bounds.len() - 1;

    if length > char_count {
        return Ok(Vec::new());
    }

    let window_count = char_count - length + 1;

    // Single chars and short texts rarely repeat enough to need a set
    if window_count <= 8 {
        let mut shingles: Vec<&str> = Vec::with_capacity(window_count);
        for start in 0..window_count {
            let shingle = &text[bounds[start]..bounds[start + length]];
            if !shingles.contains(&shingle) {
                shingles.push(shingle);
            }
        }
        return Ok(shingles);
    }

    let mut seen: AHashSet<&str> = AHashSet::with_capacity(window_count);
    let mut shingles = Vec::with_capacity(window_count);
    for start in 0..window_count {
        let shingle = &text[bounds[start]..bounds[start + length]];
        if seen.insert(shingle) {
            shingles.push(shingle);
        }
    }

    Ok(shingles)
}

/// Cut a record value. Only text records can be cut; anything else is
/// rejected with [`Error::NonTextualInput`].
pub fn cut_record(value: &Record, length: usize) -> Result<Vec<String>> {
    match value {
        Record::Text(text) => cut(text, length),
        other => Err(Error::NonTextualInput { kind: other.kind() }),
    }
}

/// Length of `text` in characters, the unit shingles are measured in.
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
