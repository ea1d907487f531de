// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and their flags:
//
//   mark     — mark entities in a dataset file
//   type2id  — build dataset/type2id.json
//   sample   — write relation-stratified subsets of train.txt
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    mark_use_case::{MarkConfig, MarkMode},
    sample_use_case::SampleConfig,
    type_vocab_use_case::TypeVocabConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark head/tail entities and encode every record of a dataset
    Mark(MarkArgs),

    /// Build type2id.json from a dataset's train.txt
    #[command(name = "type2id")]
    TypeVocab(TypeVocabArgs),

    /// Sample train.txt per relation into train_<proportion>.txt files
    Sample(SampleArgs),
}

/// All arguments for the `mark` command.
#[derive(Args, Debug)]
pub struct MarkArgs {
    /// JSON-lines dataset to mark
    #[arg(long, default_value = "data/train.txt")]
    pub input: PathBuf,

    /// Output JSON-lines file of marked examples
    #[arg(long, default_value = "data/train_marked.txt")]
    pub output: PathBuf,

    /// Directory containing tokenizer.json or a BERT vocab.txt
    #[arg(long, default_value = "bert-base-uncased")]
    pub tokenizer_dir: PathBuf,

    /// cm = context + mention, ct = context + type, oc = only context
    #[arg(long, default_value = "cm")]
    pub mode: MarkMode,

    /// Type vocabulary for `ct` (default: type2id.json next to --input)
    #[arg(long)]
    pub type2id: Option<PathBuf>,

    /// Type label id N becomes the token [unused{N + offset}]
    #[arg(long, default_value_t = 10)]
    pub type_token_offset: u32,

    /// Probability of blanking each mention in cm/ct modes
    #[arg(long, default_value_t = 0.0)]
    pub blank_prob: f64,

    /// Seed for the blanking RNG
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<MarkArgs> for MarkConfig {
    fn from(a: MarkArgs) -> Self {
        MarkConfig {
            input:             a.input,
            output:            a.output,
            tokenizer_dir:     a.tokenizer_dir,
            mode:              a.mode,
            type2id:           a.type2id,
            type_token_offset: a.type_token_offset,
            blank_prob:        a.blank_prob,
            seed:              a.seed,
        }
    }
}

/// All arguments for the `type2id` command.
#[derive(Args, Debug)]
pub struct TypeVocabArgs {
    /// Dataset directory containing train.txt
    #[arg(long, default_value = "mtb")]
    pub dataset: PathBuf,
}

impl From<TypeVocabArgs> for TypeVocabConfig {
    fn from(a: TypeVocabArgs) -> Self {
        TypeVocabConfig { dataset_dir: a.dataset }
    }
}

/// All arguments for the `sample` command.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Dataset directory containing train.txt
    #[arg(long, default_value = "mtb")]
    pub dataset: PathBuf,

    /// Fractions of each relation to keep, one output file each
    #[arg(long, num_args = 1.., default_values_t = [0.01, 0.1])]
    pub proportions: Vec<f64>,

    /// Seed for the per-relation shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<SampleArgs> for SampleConfig {
    fn from(a: SampleArgs) -> Self {
        SampleConfig {
            dataset_dir: a.dataset,
            proportions: a.proportions,
            seed:        a.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_mark_defaults() {
        let cli = Cli::try_parse_from(["entity-marker", "mark", "--mode", "ct"]).unwrap();
        let Commands::Mark(args) = cli.command else { panic!("expected mark") };
        let cfg = MarkConfig::from(args);
        assert_eq!(cfg.mode, MarkMode::Ct);
        assert_eq!(cfg.type_token_offset, 10);
        assert_eq!(cfg.type2id, None);
    }

    #[test]
    fn test_sample_proportions() {
        let cli = Cli::try_parse_from(["entity-marker", "sample"]).unwrap();
        let Commands::Sample(args) = cli.command else { panic!("expected sample") };
        assert_eq!(args.proportions, vec![0.01, 0.1]);

        let cli = Cli::try_parse_from([
            "entity-marker", "sample", "--dataset", "tacred", "--proportions", "0.2", "0.5",
        ])
        .unwrap();
        let Commands::Sample(args) = cli.command else { panic!("expected sample") };
        assert_eq!(args.proportions, vec![0.2, 0.5]);
        assert_eq!(args.dataset, PathBuf::from("tacred"));
    }

    #[test]
    fn test_type2id_name_and_bad_mode() {
        assert!(Cli::try_parse_from(["entity-marker", "type2id", "--dataset", "x"]).is_ok());
        assert!(Cli::try_parse_from(["entity-marker", "mark", "--mode", "om"]).is_err());
    }
}
