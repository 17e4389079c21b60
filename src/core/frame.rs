//! Frames: consistent variable assignments and the set algebra over them.

use crate::core::pattern::{unify_fields, Pattern, Term};
use crate::core::record::{ActionRecord, Payload};
use serde_json::Value;
use std::collections::BTreeMap;

/// One consistent variable → value assignment. A variable has exactly one
/// value for the lifetime of a frame.
pub type Frame = BTreeMap<String, Value>;

/// An ordered collection of frames. Order reflects match discovery order;
/// duplicates are permitted except where the dispatcher deduplicates
/// firings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frames(Vec<Frame>);

impl Frames {
    /// No surviving frames. The normal "nothing matched" outcome.
    pub fn empty() -> Self {
        Frames(Vec::new())
    }

    /// The join identity: a single frame with no bindings.
    pub fn seed() -> Self {
        Frames(vec![Frame::new()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Frame> {
        self.0
    }

    /// Extend every frame with each record the pattern unifies against.
    /// A frame with no unifying record is dropped with its whole lineage,
    /// the standard relational-join semantics.
    pub fn join(self, pattern: &Pattern, records: &[ActionRecord]) -> Frames {
        let mut next = Vec::new();
        for frame in &self.0 {
            for record in records {
                if let Some(extended) = pattern.unify(record, frame) {
                    next.push(extended);
                }
            }
        }
        Frames(next)
    }

    /// Keep only frames satisfying the predicate.
    pub fn filter(self, predicate: impl Fn(&Frame) -> bool) -> Frames {
        Frames(self.0.into_iter().filter(|frame| predicate(frame)).collect())
    }

    /// Add computed bindings to every frame.
    pub fn extend_each(self, f: impl Fn(&mut Frame)) -> Frames {
        Frames(
            self.0
                .into_iter()
                .map(|mut frame| {
                    f(&mut frame);
                    frame
                })
                .collect(),
        )
    }

    /// Inner-join one frame against the rows an external query returned:
    /// each row that unifies with the bind template yields one output
    /// frame; zero unifying rows drop the input frame entirely.
    pub fn fan_out(frame: &Frame, bind: &[(String, Term)], rows: &[Payload]) -> Vec<Frame> {
        let mut out = Vec::new();
        for row in rows {
            let mut extended = frame.clone();
            if unify_fields(bind, row, &mut extended).is_some() {
                out.push(extended);
            }
        }
        out
    }

    /// Drop exact duplicates, keeping first occurrences in order.
    pub fn dedup(self) -> Frames {
        let mut seen: Vec<Frame> = Vec::new();
        for frame in self.0 {
            if !seen.contains(&frame) {
                seen.push(frame);
            }
        }
        Frames(seen)
    }
}

impl From<Vec<Frame>> for Frames {
    fn from(frames: Vec<Frame>) -> Self {
        Frames(frames)
    }
}

impl FromIterator<Frame> for Frames {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Frames(iter.into_iter().collect())
    }
}

/// Fold a pattern list over the seed frame: the relational join a rule's
/// `when` clause evaluates to.
pub fn join_all(patterns: &[Pattern], records: &[ActionRecord]) -> Frames {
    patterns
        .iter()
        .fold(Frames::seed(), |frames, pattern| frames.join(pattern, records))
}
