// ============================================================
// Layer 2 — SampleUseCase
// ============================================================
// dataset/train.txt  →  dataset/train_<proportion>.txt
//
// One output file per requested proportion, each sampled
// independently from the full training set.

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    loader::{read_jsonl, write_jsonl},
    sampler::{check_proportion, sample_by_relation, sampled_file_name},
};
use crate::domain::record::RelationRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    pub dataset_dir: PathBuf,
    pub proportions: Vec<f64>,
    pub seed:        Option<u64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("mtb"),
            proportions: vec![0.01, 0.1],
            seed:        None,
        }
    }
}

/// One file written by the sampler
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutput {
    pub proportion: f64,
    pub path:       PathBuf,
    pub instances:  usize,
}

pub struct SampleUseCase {
    config: SampleConfig,
}

impl SampleUseCase {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<SampleOutput>> {
        let cfg = &self.config;
        // Fail before reading anything if a proportion is unusable
        for &p in &cfg.proportions {
            check_proportion(p)?;
        }

        let records: Vec<RelationRecord> = read_jsonl(&cfg.dataset_dir.join("train.txt"))?;
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut outputs = Vec::with_capacity(cfg.proportions.len());
        for &proportion in &cfg.proportions {
            let sampled = sample_by_relation(records.clone(), proportion, &mut rng)?;
            let path    = cfg.dataset_dir.join(sampled_file_name(proportion));
            write_jsonl(&path, &sampled)?;

            tracing::info!(
                "Sampled {} instances in '{}' train set",
                sampled.len(),
                cfg.dataset_dir.display()
            );
            outputs.push(SampleOutput { proportion, path, instances: sampled.len() });
        }

        Ok(outputs)
    }
}
