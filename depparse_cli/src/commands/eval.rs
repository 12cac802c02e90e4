use super::CommandResult;
use clap::Args;
use depparse_core::{corpus, AttachmentScores};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Gold corpus
    #[arg(short, long)]
    pub gold: PathBuf,

    /// Parser output aligned with the gold corpus
    #[arg(short, long)]
    pub parsed: PathBuf,

    /// Print scores as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &EvalArgs) -> CommandResult {
    let gold = corpus::read_file(&args.gold)?;
    let parsed = corpus::read_file(&args.parsed)?;
    let scores = AttachmentScores::compute(&gold, &parsed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
    } else {
        println!("{}", scores);
    }
    Ok(())
}
