use super::CommandResult;
use clap::Args;
use depparse_core::{corpus, log_info, ParserOptions, Trainer};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Parser options file (TOML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Gold training corpus in CoNLL-X format
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the trained model is written to
    #[arg(short, long)]
    pub model: PathBuf,
}

pub fn run(args: &TrainArgs) -> CommandResult {
    let start = Instant::now();
    let options = ParserOptions::from_file(&args.config)?;
    let sentences = corpus::read_file(&args.input)?;
    log_info!("Training started",
        "algorithm" => &options.parser.algorithm,
        "sentences" => sentences.len()
    );

    let trainer = Trainer::new(options)?;
    let (model, statistics) = trainer.train(&sentences)?;
    model.save(&args.model)?;

    println!(
        "Trained {} on {} sentences ({} skipped, {} instances) in {:.2}s",
        model.algorithm().name(),
        statistics.sentences,
        statistics.skipped,
        statistics.instances,
        start.elapsed().as_secs_f64()
    );
    println!("Model written to {}", args.model.display());
    Ok(())
}
