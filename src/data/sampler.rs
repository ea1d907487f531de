// ============================================================
// Layer 4 — Relation-Stratified Sampler
// ============================================================
// Shrinks a training set to a fraction of its size while
// keeping every relation represented:
//
//   1. Group records by relation (groups in first-seen order)
//   2. Shuffle each group
//   3. Keep the first ceil(len / (1 / proportion)) of each
//
// Rounding up means even a relation with a single example
// survives a 1% sample.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use anyhow::{bail, Result};
use rand::{seq::SliceRandom, Rng};
use std::collections::HashMap;

use crate::domain::record::RelationRecord;

/// Reject proportions outside (0, 1]
pub fn check_proportion(proportion: f64) -> Result<()> {
    if !(proportion > 0.0 && proportion <= 1.0) {
        bail!("Sampling proportion must be in (0, 1], got {proportion}");
    }
    Ok(())
}

/// How many of `len` records a relation keeps at `proportion`.
///
/// Floor-divides by the reduction factor `1 / proportion` and
/// adds one when that leaves a remainder.
pub fn sample_count(len: usize, proportion: f64) -> usize {
    let reduced_times = 1.0 / proportion;
    let len           = len as f64;
    let kept          = (len / reduced_times).floor() as usize;
    if len % reduced_times == 0.0 {
        kept
    } else {
        kept + 1
    }
}

/// File name a sample of `train.txt` is written to, e.g. `train_0.1.txt`
pub fn sampled_file_name(proportion: f64) -> String {
    format!("train_{proportion}.txt")
}

/// Sample `records` per relation. Output is grouped by relation,
/// relations in the order they first appear.
pub fn sample_by_relation<R: Rng + ?Sized>(
    records:    Vec<RelationRecord>,
    proportion: f64,
    rng:        &mut R,
) -> Result<Vec<RelationRecord>> {
    check_proportion(proportion)?;

    let mut group_of: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<RelationRecord>> = Vec::new();
    for rec in records {
        let idx = *group_of.entry(rec.relation.clone()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(rec);
    }

    let mut sampled = Vec::new();
    for mut group in groups {
        group.shuffle(rng);
        let keep = sample_count(group.len(), proportion);
        group.truncate(keep);
        sampled.extend(group);
    }

    tracing::debug!(
        "Sampled {} records across {} relations at {}",
        sampled.len(),
        group_of.len(),
        proportion
    );
    Ok(sampled)
}
