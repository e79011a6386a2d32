//! Output formatting for the command line

use crate::index::types::{EngineStats, Hit};
use crate::record::normalize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Stdout stream honoring the color flag
pub fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print search hits as `id:record`, with the query highlighted
pub fn print_hits<W: WriteColor>(
    out: &mut W,
    hits: &[Hit<'_>],
    query: &str,
    case_insensitive: bool,
) -> io::Result<()> {
    for hit in hits {
        print_id(out, hit.id)?;
        write!(out, ":")?;
        let text = hit.record.to_string();
        print_highlighted(out, &text, query, case_insensitive)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Print search hits as one JSON object per line
pub fn print_json_hits<W: Write>(out: &mut W, hits: &[Hit<'_>]) -> io::Result<()> {
    for hit in hits {
        let line = serde_json::json!({ "id": hit.id, "record": hit.record });
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn print_id<W: WriteColor>(out: &mut W, id: u32) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", id)?;
    out.reset()
}

/// Write `text`, highlighting every occurrence of `query`
fn print_highlighted<W: WriteColor>(
    out: &mut W,
    text: &str,
    query: &str,
    case_insensitive: bool,
) -> io::Result<()> {
    let needle = normalize(query, case_insensitive);
    let haystack = normalize(text, case_insensitive);

    // Folding can change byte lengths; offsets only line up when it didn't
    if needle.is_empty() || haystack.len() != text.len() {
        return write!(out, "{}", text);
    }

    let mut last = 0;
    for (start, matched) in haystack.match_indices(needle.as_ref()) {
        if start < last || !text.is_char_boundary(start) {
            continue;
        }
        let end = start + matched.len();
        if !text.is_char_boundary(end) {
            continue;
        }
        write!(out, "{}", &text[last..start])?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}", &text[start..end])?;
        out.reset()?;
        last = end;
    }
    write!(out, "{}", &text[last..])
}

/// Print engine statistics
pub fn print_stats<W: Write>(out: &mut W, stats: &EngineStats) -> io::Result<()> {
    writeln!(out, "Index Statistics")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "Live records:     {}", stats.live_records)?;
    writeln!(out, "Tombstones:       {}", stats.tombstones)?;
    writeln!(out, "Free ids:         {}", stats.free_ids)?;
    writeln!(out, "Next id:          {}", stats.next_id)?;
    writeln!(out, "Indexed leaves:   {}", stats.leaf_count)?;
    writeln!(out, "Shingles:         {}", stats.total_shingles())?;
    writeln!(out, "Postings:         {}", stats.total_postings())?;
    writeln!(out)?;
    writeln!(out, "Levels:")?;
    for level in &stats.levels {
        writeln!(
            out,
            "  {:>3} chars  {:>8} shingles  {:>10} postings",
            level.shingle_length, level.shingles, level.postings
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::LevelStats;
    use crate::record::Record;
    use termcolor::Buffer;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Buffer) -> io::Result<()>,
    {
        let mut buf = Buffer::no_color();
        f(&mut buf).unwrap();
        String::from_utf8(buf.into_inner()).unwrap()
    }

    #[test]
    fn test_print_hits_plain() {
        let peter = Record::from("Peter");
        let paul = Record::from("Paul");
        let hits = [
            Hit { id: 0, record: &peter },
            Hit { id: 4, record: &paul },
        ];
        let text = render(|buf| print_hits(buf, &hits, "p", true));
        assert_eq!(text, "0:Peter\n4:Paul\n");
    }

    #[test]
    fn test_print_hits_highlights_with_color() {
        let record = Record::from("abcabc");
        let hits = [Hit { id: 1, record: &record }];
        let mut buf = Buffer::ansi();
        print_hits(&mut buf, &hits, "bc", true).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();
        assert_eq!(text.matches("bc").count(), 2);
        assert!(text.contains("\x1b["));
    }

    #[test]
    fn test_print_json_hits() {
        let record = Record::object([("name", "Hans")]);
        let hits = [Hit { id: 2, record: &record }];
        let mut out = Vec::new();
        print_json_hits(&mut out, &hits).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"id\":2,\"record\":{\"name\":\"Hans\"}}\n"
        );
    }

    #[test]
    fn test_print_stats() {
        let stats = EngineStats {
            live_records: 2,
            tombstones: 1,
            free_ids: 1,
            next_id: 3,
            leaf_count: 5,
            levels: vec![LevelStats {
                shingle_length: 1,
                shingles: 4,
                postings: 6,
            }],
        };
        let mut out = Vec::new();
        print_stats(&mut out, &stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Live records:     2"));
        assert!(text.contains("Postings:         6"));
    }
}
