//! Subcommand implementations

pub mod eval;
pub mod info;
pub mod parse;
pub mod train;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TRAINING: &str = "\
1\tJohn\t_\tN\tNNP\t_\t2\tSBJ\t_\t_
2\tsaw\t_\tV\tVBD\t_\t0\tROOT\t_\t_
3\tMary\t_\tN\tNNP\t_\t2\tOBJ\t_\t_
4\t.\t_\tP\t.\t_\t2\tP\t_\t_

1\tMary\t_\tN\tNNP\t_\t2\tSBJ\t_\t_
2\tsleeps\t_\tV\tVBZ\t_\t0\tROOT\t_\t_
3\t.\t_\tP\t.\t_\t2\tP\t_\t_

1\tJohn\t_\tN\tNNP\t_\t2\tSBJ\t_\t_
2\tsleeps\t_\tV\tVBZ\t_\t0\tROOT\t_\t_
3\t.\t_\tP\t.\t_\t2\tP\t_\t_
";

    #[test]
    fn train_parse_eval_info_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("options.toml");
        let train_file = dir.path().join("train.conll");
        let model_dir = dir.path().join("model");
        let output = dir.path().join("parsed.conll");

        fs::write(&config, "[parser]\nalgorithm = \"nivreeager\"\n").unwrap();
        fs::write(&train_file, TRAINING).unwrap();

        train::run(&train::TrainArgs {
            config: config.clone(),
            input: train_file.clone(),
            model: model_dir.clone(),
        })
        .unwrap();
        assert!(model_dir.join("guide.json").is_file());

        parse::run(&parse::ParseArgs {
            model: model_dir.clone(),
            input: train_file.clone(),
            output: output.clone(),
            threads: Some(2),
            strip_gold: true,
        })
        .unwrap();
        let parsed = fs::read_to_string(&output).unwrap();
        assert_eq!(parsed.lines().filter(|l| l.is_empty()).count(), 3);

        eval::run(&eval::EvalArgs {
            gold: train_file,
            parsed: output,
            json: true,
        })
        .unwrap();

        info::run(&info::InfoArgs { model: model_dir }).unwrap();
    }

    #[test]
    fn parse_rejects_missing_model() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.conll");
        fs::write(&input, TRAINING).unwrap();

        let result = parse::run(&parse::ParseArgs {
            model: dir.path().join("absent"),
            input,
            output: dir.path().join("out.conll"),
            threads: None,
            strip_gold: false,
        });
        assert!(result.is_err());
    }
}
