// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the BERT-uncased WordPiece tokenizer the marker runs on.
//
// A tokenizer directory holds either:
//   tokenizer.json  ← HuggingFace serialised tokenizer, used as-is
//   vocab.txt       ← one WordPiece token per line, id = line number
//                     (the layout bert-base-uncased ships with)
//
// From a bare vocab.txt we write the tokenizer JSON ourselves
// (BertNormalizer + BertPreTokenizer + WordPiece model), save it
// next to the vocab and load it back, so later runs take the
// fast path.
//
// Reference: Wu et al. (2016) WordPiece
//            Devlin et al. (2019) BERT

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}, str::FromStr};
use tokenizers::Tokenizer;

use crate::domain::traits::SubwordTokenizer;

/// Tokens that get an `added_tokens` entry when present in the vocabulary
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load `tokenizer.json`, building it from `vocab.txt` first if needed
    pub fn load_or_build(&self) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading tokenizer from '{}'", tok_path.display());
            return self.load();
        }

        let vocab_path = self.dir.join("vocab.txt");
        if !vocab_path.exists() {
            bail!(
                "Neither tokenizer.json nor vocab.txt found in '{}'",
                self.dir.display()
            );
        }
        tracing::info!("Building WordPiece tokenizer from '{}'", vocab_path.display());
        self.build_and_save(&vocab_path)
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    fn build_and_save(&self, vocab_path: &Path) -> Result<Tokenizer> {
        let text = fs::read_to_string(vocab_path)
            .with_context(|| format!("Cannot read '{}'", vocab_path.display()))?;
        let tokens: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();

        let tokenizer_json = wordpiece_json(&tokens)?;

        let tok_path = self.dir.join("tokenizer.json");
        fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write '{}'", tok_path.display()))?;

        tracing::info!(
            "Tokenizer built with {} tokens, saved to '{}'",
            tokens.len(),
            tok_path.display()
        );

        self.load()
    }
}

/// Build an uncased WordPiece tokenizer in memory from an ordered
/// token list (token `i` gets id `i`).
pub fn wordpiece_from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Tokenizer> {
    let json = wordpiece_json(tokens)?;
    Tokenizer::from_str(&json.to_string())
        .map_err(|e| anyhow::anyhow!("Cannot build WordPiece tokenizer: {e}"))
}

/// HuggingFace tokenizer JSON for a BERT-uncased WordPiece vocabulary
fn wordpiece_json<S: AsRef<str>>(tokens: &[S]) -> Result<serde_json::Value> {
    let mut vocab = serde_json::Map::new();
    for (id, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }
        // First occurrence wins, like BERT's vocab loader
        vocab
            .entry(token.to_string())
            .or_insert_with(|| serde_json::json!(id));
    }

    if !vocab.contains_key("[UNK]") {
        bail!("WordPiece vocabulary has no [UNK] token");
    }

    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .filter_map(|&special| {
            vocab.get(special).map(|id| serde_json::json!({
                "id": id, "content": special, "single_word": false,
                "lstrip": false, "rstrip": false, "normalized": false, "special": true
            }))
        })
        .collect();

    Ok(serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": {
            "type": "BertPreTokenizer"
        },
        "post_processor": null,
        "decoder": {
            "type": "WordPiece",
            "prefix": "##",
            "cleanup": true
        },
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab
        }
    }))
}

// ─── SubwordTokenizer for HuggingFace tokenizers ─────────────────────────────
impl SubwordTokenizer for Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let enc = self
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(enc.get_tokens().to_vec())
    }

    fn vocab_id(&self, token: &str) -> Option<u32> {
        self.token_to_id(token)
    }
}
