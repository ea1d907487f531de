// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The subword tokenizer is an external collaborator. The marker
// only needs three things from it:
//   - split text into subword strings
//   - look a single token up in the vocabulary
//   - map a token sequence to ids (unknowns → [UNK])
//
// Implementations:
//   - tokenizers::Tokenizer → infra/tokenizer_store.rs
//   - test doubles in unit tests
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

/// Token every out-of-vocabulary string maps to.
pub const UNK_TOKEN: &str = "[UNK]";

// ─── SubwordTokenizer ─────────────────────────────────────────────────────────
/// Anything that splits text into subword strings over a fixed vocabulary.
pub trait SubwordTokenizer {
    /// Split `text` into its ordered subword strings.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Vocabulary id of a single token, `None` if unknown.
    fn vocab_id(&self, token: &str) -> Option<u32>;

    /// Map every token to its id; tokens missing from the
    /// vocabulary get the id of [`UNK_TOKEN`].
    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Vec<u32> {
        let unk_id = self.vocab_id(UNK_TOKEN).unwrap_or_default();
        tokens
            .iter()
            .map(|t| self.vocab_id(t).unwrap_or(unk_id))
            .collect()
    }
}

impl<T: SubwordTokenizer + ?Sized> SubwordTokenizer for &T {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        (**self).tokenize(text)
    }

    fn vocab_id(&self, token: &str) -> Option<u32> {
        (**self).vocab_id(token)
    }
}
