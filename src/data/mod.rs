// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a JSON-lines corpus file and encoder-ready
// marked examples:
//
//   train.txt
//       │
//       ▼
//   loader          → reads / writes JSON lines
//       │
//       ├──▶ type_vocab  → subj_/obj_ type label ids
//       ├──▶ sampler     → relation-stratified subsets
//       ▼
//   marker          → entity markers, WordPiece, ids, positions
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads and writes JSON-lines corpus files
pub mod loader;

/// Marks head/tail entities and encodes the sentence
pub mod marker;

/// Builds the entity type vocabulary
pub mod type_vocab;

/// Samples a training set per relation
pub mod sampler;
