// ============================================================
// Layer 2 — MarkUseCase
// ============================================================
// Marks every relation instance of a JSON-lines dataset:
//
//   Step 1: Load / build the tokenizer     (Layer 6 - infra)
//   Step 2: Bind it to an EntityMarker     (Layer 4 - data)
//   Step 3: Read the dataset               (Layer 4 - data)
//   Step 4: Load type2id.json (ct only)    (Layer 4 - data)
//   Step 5: Mark each record               (Layer 4 - data)
//   Step 6: Write marked examples          (Layer 4 - data)
//
// Modes:
//   cm — context + mention
//   ct — context + type, types rendered as [unusedN] tokens
//   oc — only context, both mentions blanked

use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::data::{
    loader::{read_jsonl, write_jsonl},
    marker::{EntityMarker, Rendering},
    type_vocab::TypeVocab,
};
use crate::domain::record::{MarkedExample, RelationRecord};
use crate::domain::traits::SubwordTokenizer;
use crate::infra::tokenizer_store::TokenizerStore;

// ─── MarkMode ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkMode {
    /// Context + mention
    #[default]
    Cm,
    /// Context + type
    Ct,
    /// Only context: both mentions blanked
    Oc,
}

impl FromStr for MarkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cm" => Ok(Self::Cm),
            "ct" => Ok(Self::Ct),
            "oc" => Ok(Self::Oc),
            _ => Err(format!("invalid mode: {s:?} (expected \"cm\", \"ct\" or \"oc\")")),
        }
    }
}

impl fmt::Display for MarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cm => write!(f, "cm"),
            Self::Ct => write!(f, "ct"),
            Self::Oc => write!(f, "oc"),
        }
    }
}

// ─── Mark Configuration ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkConfig {
    /// JSON-lines dataset to mark
    pub input:             PathBuf,
    /// Where the marked examples are written
    pub output:            PathBuf,
    /// Directory holding tokenizer.json or vocab.txt
    pub tokenizer_dir:     PathBuf,
    pub mode:              MarkMode,
    /// type2id.json for `ct`; defaults to the one next to `input`
    pub type2id:           Option<PathBuf>,
    /// Type label id N is rendered as [unused{N + offset}]
    pub type_token_offset: u32,
    /// Chance of blanking each mention in `cm` / `ct`
    pub blank_prob:        f64,
    pub seed:              Option<u64>,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            input:             PathBuf::from("data/train.txt"),
            output:            PathBuf::from("data/train_marked.txt"),
            tokenizer_dir:     PathBuf::from("bert-base-uncased"),
            mode:              MarkMode::Cm,
            type2id:           None,
            type_token_offset: 10,
            blank_prob:        0.0,
            seed:              None,
        }
    }
}

/// What a marking run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSummary {
    pub examples: usize,
    /// Marker pairs that fell back to (0, 2)
    pub failures: usize,
}

// ─── MarkUseCase ──────────────────────────────────────────────────────────────
pub struct MarkUseCase {
    config: MarkConfig,
}

impl MarkUseCase {
    pub fn new(config: MarkConfig) -> Self {
        Self { config }
    }

    /// Run with the tokenizer found in `tokenizer_dir`
    pub fn execute(&self) -> Result<MarkSummary> {
        let tokenizer = TokenizerStore::new(&self.config.tokenizer_dir).load_or_build()?;
        self.execute_with(tokenizer)
    }

    /// Run with an already loaded tokenizer
    pub fn execute_with<T: SubwordTokenizer>(&self, tokenizer: T) -> Result<MarkSummary> {
        let cfg = &self.config;
        if !(0.0..=1.0).contains(&cfg.blank_prob) {
            bail!("Blank probability must be in [0, 1], got {}", cfg.blank_prob);
        }

        let marker = EntityMarker::new(tokenizer)?;

        tracing::info!("Marking '{}' in {} mode", cfg.input.display(), cfg.mode);
        let records: Vec<RelationRecord> = read_jsonl(&cfg.input)?;

        let type_vocab = match cfg.mode {
            MarkMode::Ct => Some(TypeVocab::load(&self.type2id_path())?),
            _ => None,
        };

        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut marked = Vec::with_capacity(records.len());
        for rec in &records {
            let types = type_vocab
                .as_ref()
                .and_then(|vocab| self.type_tokens(vocab, rec));
            if type_vocab.is_some() && types.is_none() {
                tracing::debug!("Record without head/tail type, keeping mentions");
            }

            let (head_blank, tail_blank) = match cfg.mode {
                MarkMode::Oc => (true, true),
                _ if cfg.blank_prob > 0.0 => (
                    rng.gen::<f64>() < cfg.blank_prob,
                    rng.gen::<f64>() < cfg.blank_prob,
                ),
                _ => (false, false),
            };

            let rendering = Rendering {
                head_type:  types.as_ref().map(|(h, _)| h.as_str()),
                tail_type:  types.as_ref().map(|(_, t)| t.as_str()),
                head_blank,
                tail_blank,
            };

            let out = marker.mark(&rec.token, rec.h.pos, rec.t.pos, &rendering)?;
            marked.push(MarkedExample {
                input_ids: out.input_ids,
                h_start:   out.h_start,
                h_end:     out.h_end,
                t_start:   out.t_start,
                t_end:     out.t_end,
                relation:  rec.relation.clone(),
            });
        }

        write_jsonl(&cfg.output, &marked)?;

        let summary = MarkSummary { examples: marked.len(), failures: marker.failures() };
        if summary.failures > 0 {
            tracing::warn!(
                "{} marker pairs could not be located in {} examples",
                summary.failures,
                summary.examples
            );
        }
        tracing::info!(
            "Wrote {} marked examples to '{}'",
            summary.examples,
            cfg.output.display()
        );
        Ok(summary)
    }

    fn type2id_path(&self) -> PathBuf {
        match &self.config.type2id {
            Some(path) => path.clone(),
            None => self
                .config
                .input
                .parent()
                .map(|dir| dir.join("type2id.json"))
                .unwrap_or_else(|| PathBuf::from("type2id.json")),
        }
    }

    /// `[unusedN]` tokens for the head (as subject) and tail (as
    /// object) types; types missing from the vocabulary map to UNK.
    fn type_tokens(&self, vocab: &TypeVocab, rec: &RelationRecord) -> Option<(String, String)> {
        let h = rec.h.entity_type.as_deref()?;
        let t = rec.t.entity_type.as_deref()?;
        let offset = self.config.type_token_offset;
        let h_id = vocab.subject_id(h).unwrap_or_default() + offset;
        let t_id = vocab.object_id(t).unwrap_or_default() + offset;
        Some((format!("[unused{h_id}]"), format!("[unused{t_id}]")))
    }
}
