//! Depth-first walk over a record's structure.
//!
//! The walk yields every primitive leaf together with the key it sits under.
//! It runs on an explicit stack, so nesting depth is bounded by memory rather
//! than by the call stack.

use crate::error::{Error, Result};
use crate::record::Record;
use rustc_hash::FxHashSet;
use std::fmt;
use std::ops::ControlFlow;
use tracing::trace;

/// Key of a field inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    /// The record itself is a primitive and has no enclosing container.
    Root,
    /// Named field of an object.
    Name(&'a str),
    /// Position inside an array.
    Index(usize),
}

impl FieldKey<'_> {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Root => f.write_str("$"),
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Insert-time field predicate: `(key, containing structure) -> keep?`.
/// Returning `false` prunes the field and everything beneath it.
pub type FieldFilter<'f> = dyn Fn(FieldKey<'_>, &Record) -> bool + 'f;

/// One container being walked, with the position of the next child.
struct Frame<'r> {
    container: &'r Record,
    next: usize,
}

impl<'r> Frame<'r> {
    fn next_child(&mut self) -> Option<(FieldKey<'r>, &'r Record)> {
        let container: &'r Record = self.container;
        let child = match container {
            Record::Array(items) => items.get(self.next).map(|v| (FieldKey::Index(self.next), v)),
            Record::Object(fields) => fields
                .get(self.next)
                .map(|(k, v)| (FieldKey::Name(k.as_str()), v)),
            _ => None,
        };
        self.next += 1;
        child
    }
}

/// Walk `record`, calling `visit` for every primitive leaf in field order.
///
/// Containers are descended into but never visited themselves; null values
/// are skipped. A primitive root is visited once under [`FieldKey::Root`]
/// without consulting the filter. `visit` may return `ControlFlow::Break` to
/// stop the walk early, which is reported back to the caller.
pub fn traverse<'r, F>(
    record: &'r Record,
    filter: Option<&FieldFilter<'_>>,
    mut visit: F,
) -> Result<ControlFlow<()>>
where
    F: FnMut(FieldKey<'r>, &'r Record) -> ControlFlow<()>,
{
    if record.is_primitive() {
        return Ok(visit(FieldKey::Root, record));
    }
    if !record.is_container() {
        return Ok(ControlFlow::Continue(()));
    }

    let mut seen: FxHashSet<*const Record> = FxHashSet::default();
    seen.insert(record as *const Record);
    let mut stack = vec![Frame { container: record, next: 0 }];

    while let Some(frame) = stack.last_mut() {
        let Some((key, value)) = frame.next_child() else {
            stack.pop();
            continue;
        };
        let container = frame.container;

        if let Some(keep) = filter {
            if !keep(key, container) {
                trace!(field = %key, "ignoring field");
                continue;
            }
        }

        match value {
            Record::Null => {}
            Record::Array(_) | Record::Object(_) => {
                if !seen.insert(value as *const Record) {
                    return Err(Error::StructuralCycle { depth: stack.len() });
                }
                stack.push(Frame { container: value, next: 0 });
            }
            leaf => {
                if visit(key, leaf).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}

/// Collect every leaf `(key, value)` pair; handy for inspection and tests.
pub fn leaves<'r>(
    record: &'r Record,
    filter: Option<&FieldFilter<'_>>,
) -> Result<Vec<(FieldKey<'r>, &'r Record)>> {
    let mut out = Vec::new();
    traverse(record, filter, |key, value| {
        out.push((key, value));
        ControlFlow::Continue(())
    })?;
    Ok(out)
}
