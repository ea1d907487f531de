// ============================================================
// Layer 2 — TypeVocabUseCase
// ============================================================
// dataset/train.txt  →  dataset/type2id.json

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{loader::read_jsonl, type_vocab::TypeVocab};
use crate::domain::record::RelationRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeVocabConfig {
    /// Directory holding train.txt; type2id.json is written here
    pub dataset_dir: PathBuf,
}

impl Default for TypeVocabConfig {
    fn default() -> Self {
        Self { dataset_dir: PathBuf::from("mtb") }
    }
}

pub struct TypeVocabUseCase {
    config: TypeVocabConfig,
}

impl TypeVocabUseCase {
    pub fn new(config: TypeVocabConfig) -> Self {
        Self { config }
    }

    /// Build and save the vocabulary, returning where it was written
    pub fn execute(&self) -> Result<PathBuf> {
        let dir = &self.config.dataset_dir;

        let records: Vec<RelationRecord> = read_jsonl(&dir.join("train.txt"))?;
        let vocab = TypeVocab::build(&records)?;

        let out = dir.join("type2id.json");
        vocab.save(&out)?;
        tracing::info!("Saved {} type labels to '{}'", vocab.len(), out.display());
        Ok(out)
    }
}
