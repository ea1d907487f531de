// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and hands each subcommand to its use case in Layer 2.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, MarkArgs, SampleArgs, TypeVocabArgs};

#[derive(Parser, Debug)]
#[command(
    name = "entity-marker",
    version,
    about = "Mark entity pairs in relation-extraction data for BERT-style encoders."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Mark(args)      => run_mark(args),
            Commands::TypeVocab(args) => run_type_vocab(args),
            Commands::Sample(args)    => run_sample(args),
        }
    }
}

fn run_mark(args: MarkArgs) -> Result<()> {
    use crate::application::mark_use_case::MarkUseCase;

    let summary = MarkUseCase::new(args.into()).execute()?;
    println!(
        "Marked {} examples ({} unresolved marker pairs).",
        summary.examples, summary.failures
    );
    Ok(())
}

fn run_type_vocab(args: TypeVocabArgs) -> Result<()> {
    use crate::application::type_vocab_use_case::TypeVocabUseCase;

    let path = TypeVocabUseCase::new(args.into()).execute()?;
    println!("File `type2id.json` has been stored in '{}'.", path.display());
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    use crate::application::sample_use_case::SampleUseCase;

    for out in SampleUseCase::new(args.into()).execute()? {
        println!(
            "Sampled {} instances ({}) into '{}'.",
            out.instances,
            out.proportion,
            out.path.display()
        );
    }
    Ok(())
}
