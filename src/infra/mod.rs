// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one layer:
//
//   tokenizer_store.rs — Tokenizer persistence
//                        Loads a HuggingFace tokenizer.json, or
//                        builds one from a BERT vocab.txt, and
//                        binds it to the SubwordTokenizer trait.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;
