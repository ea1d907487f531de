// ============================================================
// Layer 3 — EntitySpan Domain Type
// ============================================================
// A half-open range [start, end) of raw-token indices naming
// the tokens of one entity mention.
//
// Corpus files store spans as two-element arrays:
//   "pos": [3, 4]   → raw_tokens[3..4]
//
// Spans are taken as they come: empty, overlapping or
// out-of-range spans are representable on purpose, the
// marker turns them into a counted fallback later.

use serde::{Deserialize, Serialize};

/// Half-open raw-token index range of an entity mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct EntitySpan {
    pub start: usize,
    pub end:   usize,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `index` lies inside [start, end)
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// True when no raw token can fall inside the span
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<[usize; 2]> for EntitySpan {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}

impl From<EntitySpan> for [usize; 2] {
    fn from(span: EntitySpan) -> Self {
        [span.start, span.end]
    }
}
