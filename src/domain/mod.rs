// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing relation-extraction
// examples and the tokenizer boundary.
//
// Rules for this layer:
//   - NO tokenizer crate types
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Half-open entity span into the raw token sequence
pub mod span;

// Corpus rows and marked output rows
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
