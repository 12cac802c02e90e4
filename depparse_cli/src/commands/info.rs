use super::CommandResult;
use clap::Args;
use depparse_core::TrainedModel;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Trained model directory
    #[arg(short, long)]
    pub model: PathBuf,
}

pub fn run(args: &InfoArgs) -> CommandResult {
    let model = TrainedModel::load(&args.model)?;
    println!("{}", serde_json::to_string_pretty(&model.summary())?);
    Ok(())
}
