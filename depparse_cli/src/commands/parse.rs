use super::CommandResult;
use clap::Args;
use depparse_core::{
    corpus, log_warning, ConcurrentEngine, EngineConfig, Sentence, TrainedModel,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Trained model directory
    #[arg(short, long)]
    pub model: PathBuf,

    /// Corpus to parse in CoNLL-X format
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where the parsed corpus is written
    #[arg(short, long)]
    pub output: PathBuf,

    /// Worker threads; defaults to the model's setting capped by the CPU count
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Blank HEAD and DEPREL before parsing
    #[arg(long)]
    pub strip_gold: bool,
}

/// Explicit count first, then the model's engine settings capped by the CPUs
fn resolve_threads(requested: Option<usize>, configured: usize, cpus: usize) -> usize {
    requested.unwrap_or_else(|| configured.min(cpus.max(1)))
}

pub fn run(args: &ParseArgs) -> CommandResult {
    let model = Arc::new(TrainedModel::load(&args.model)?);
    let mut sentences = corpus::read_file(&args.input)?;
    if args.strip_gold {
        sentences = sentences.iter().map(corpus::strip_gold).collect::<Vec<Sentence>>();
    }

    let config = EngineConfig::from_options(model.options());
    let threads = resolve_threads(args.threads, config.threads, num_cpus::get());
    let engine = ConcurrentEngine::new(model, config.with_threads(threads))?;

    let results = engine.parse_batch(&sentences)?;
    for failure in &results.failures {
        log_warning!("Sentence left unparsed",
            "sentence" => failure.sentence,
            "error" => &failure.error
        );
    }
    corpus::write_file(&args.output, &results.sentences)?;

    println!("{}", results.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_threads() {
        assert_eq!(resolve_threads(Some(3), 8, 16), 3);
        assert_eq!(resolve_threads(None, 8, 4), 4);
        assert_eq!(resolve_threads(None, 2, 16), 2);
        assert_eq!(resolve_threads(None, 8, 0), 1);
    }
}
