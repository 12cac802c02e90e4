//! Oracle-driven training

use super::encoding::{self, LABEL_TABLE};
use super::error::{ParserError, ParserResult};
use super::model::TrainedModel;
use crate::algorithm::{OracleError, OracleGuide, OracleResult, ParseMode, ParsingAlgorithm};
use crate::config::constants::parsing::transition_budget;
use crate::config::runtime::TrainingPreferences;
use crate::config::ParserOptions;
use crate::corpus::{CorpusError, Sentence};
use crate::feature::FeatureModel;
use crate::graph::{DependencyStructure, TokenPool};
use crate::guide::{factory_for, ActionMapper, ClassifierFactory, ComplexDecision, DecisionModel};
use crate::logging::{self, codes};
use crate::symbols::{HashSymbolTableHandler, SymbolTableHandler};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrainingStatistics {
    pub sentences: usize,
    /// Sentences outside the algorithm's structural class
    pub skipped: usize,
    pub transitions: usize,
    pub instances: usize,
}

/// Mutable state of one training run
struct TrainingRun<'a> {
    symbols: HashSymbolTableHandler,
    model: DecisionModel,
    features: &'a FeatureModel,
    decision: ComplexDecision,
    pool: TokenPool,
    root_label: i32,
    statistics: TrainingStatistics,
}

#[derive(Debug)]
pub struct Trainer {
    options: ParserOptions,
    preferences: TrainingPreferences,
    algorithm: ParsingAlgorithm,
    factory: Arc<dyn ClassifierFactory>,
}

impl Trainer {
    pub fn new(options: ParserOptions) -> ParserResult<Self> {
        options.validate()?;
        let algorithm = ParsingAlgorithm::from_options(&options)?;
        let factory: Arc<dyn ClassifierFactory> =
            Arc::from(factory_for(&options.guide.learner, options.guide.epochs)?);
        Ok(Self {
            options,
            preferences: TrainingPreferences::default(),
            algorithm,
            factory,
        })
    }

    pub fn with_preferences(mut self, preferences: TrainingPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Use another classifier implementation
    pub fn with_factory(mut self, factory: Arc<dyn ClassifierFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Derive oracle instances from every gold sentence and train the guide
    pub fn train(&self, sentences: &[Sentence]) -> ParserResult<(TrainedModel, TrainingStatistics)> {
        let start = Instant::now();
        let mut symbols = HashSymbolTableHandler::new(self.options.null_value_strategy()?);
        encoding::declare_tables(&mut symbols)?;
        let root_label = symbols.add_symbol(LABEL_TABLE, &self.options.parser.root_label)?;

        let mapper = ActionMapper::new(
            self.options.decision_settings()?,
            self.algorithm.transition_table(),
            root_label,
        );
        mapper.declare_tables(&mut symbols)?;
        let features = FeatureModel::new(&self.options.feature_specs()?, self.algorithm.algorithm())?;

        let mut run = TrainingRun {
            symbols,
            model: DecisionModel::learner(mapper, Arc::clone(&self.factory)),
            features: &features,
            decision: ComplexDecision::new(self.options.parser.k_best),
            pool: TokenPool::new(),
            root_label,
            statistics: TrainingStatistics::default(),
        };

        for (index, sentence) in sentences.iter().enumerate() {
            let sentence_id = index + 1;
            let outcome =
                logging::with_sentence_context(0, sentence_id, || self.train_sentence(&mut run, sentence_id, sentence));
            match outcome {
                Ok(()) => run.statistics.sentences += 1,
                Err(ParserError::Oracle(e @ OracleError::NotExpressible { .. }))
                    if self.preferences.skip_inexpressible =>
                {
                    crate::log_warning!(code = e.error_code(), "Skipping sentence",
                        "sentence" => sentence_id,
                        "reason" => &e
                    );
                    run.statistics.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if run.statistics.sentences == 0 {
            return Err(CorpusError::EmptyCorpus {
                path: "<training sentences>".to_string(),
            }
            .into());
        }
        crate::log_success!(codes::success::ORACLE_PASS_COMPLETE, "Oracle pass complete",
            "sentences" => run.statistics.sentences,
            "skipped" => run.statistics.skipped,
            "instances" => run.statistics.instances
        );

        let TrainingRun {
            symbols,
            model,
            statistics,
            ..
        } = run;
        let guide = model.no_more_instances()?;
        let trained = TrainedModel::new(self.options.clone(), symbols, guide)?;

        crate::log_info!("Training finished",
            "algorithm" => self.algorithm.name(),
            "duration_ms" => start.elapsed().as_millis()
        );
        Ok((trained, statistics))
    }

    fn train_sentence(
        &self,
        run: &mut TrainingRun<'_>,
        sentence_id: usize,
        sentence: &Sentence,
    ) -> ParserResult<()> {
        encoding::check_length(sentence_id, sentence)?;
        let gold = encoding::encode_gold(sentence, &mut run.symbols)?;
        let oracle = OracleGuide::new(self.algorithm, &gold)?;
        let structure = encoding::encode_input(sentence, &mut run.symbols, &mut run.pool)?;
        let mut config = self.algorithm.initial_configuration(structure);

        let budget = transition_budget(sentence.len());
        let mut transitions = 0;
        while !config.is_terminal() {
            let transition = match config.deterministic_transition() {
                Some(transition) => transition,
                None => {
                    let transition = oracle.predict(&config)?;
                    let vector = run.features.extract(&config, &run.symbols)?;
                    run.model
                        .mapper()
                        .encode(transition, &mut run.symbols, &mut run.decision)?;
                    run.model.add_instance(&vector, &run.decision)?;
                    run.statistics.instances += 1;
                    transition
                }
            };
            config
                .apply(transition, ParseMode::Learn)
                .map_err(OracleError::from)?;
            transitions += 1;
            if transitions > budget {
                return Err(OracleError::divergence(
                    sentence_id,
                    format!("no terminal state within {} transitions", budget),
                )
                .into());
            }
        }
        run.statistics.transitions += transitions;

        let derived = config.finish(Some(run.root_label));
        let verdict = if self.preferences.verify_oracle {
            verify(&derived, &gold, sentence_id, oracle.links_roots_implicitly())
        } else {
            Ok(())
        };
        derived.release(&mut run.pool);
        verdict?;
        Ok(())
    }
}

/// Derived heads must equal gold heads; labels too, except on arcs the
/// final root linking adds with the default label
fn verify(
    derived: &DependencyStructure,
    gold: &DependencyStructure,
    sentence_id: usize,
    implicit_roots: bool,
) -> OracleResult<()> {
    for token in 1..=gold.n_tokens() {
        if derived.head(token) != gold.head(token) {
            return Err(OracleError::divergence(
                sentence_id,
                format!(
                    "token {} attached to {:?}, gold head is {:?}",
                    token,
                    derived.head(token),
                    gold.head(token)
                ),
            ));
        }
        let relabeled = implicit_roots && gold.head(token) == Some(0);
        if !relabeled && derived.label(token) != gold.label(token) {
            return Err(OracleError::divergence(
                sentence_id,
                format!("token {} has the wrong label", token),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;
    use crate::parser::fixtures::{corpus, non_projective};
    use assert_matches::assert_matches;

    #[test]
    fn test_every_algorithm_trains() {
        for algorithm in Algorithm::ALL {
            let mut options = ParserOptions::for_algorithm(algorithm);
            options.guide.epochs = 2;
            let trainer = Trainer::new(options).unwrap();
            let (model, statistics) = trainer.train(&corpus()).unwrap();

            assert_eq!(statistics.sentences, 2, "{}", algorithm);
            assert!(statistics.instances > 0);
            assert_eq!(model.algorithm().algorithm(), algorithm);
            assert!(model.guide().model_names().count() >= 1);
        }
    }

    #[test]
    fn test_inexpressible_sentences_are_skipped_or_fatal() {
        let mut sentences = corpus();
        sentences.push(non_projective());
        let options = ParserOptions::for_algorithm(Algorithm::StackProj);

        let trainer = Trainer::new(options.clone()).unwrap().with_preferences(TrainingPreferences {
            verify_oracle: true,
            skip_inexpressible: true,
        });
        let (_, statistics) = trainer.train(&sentences).unwrap();
        assert_eq!(statistics.skipped, 1);
        assert_eq!(statistics.sentences, 2);

        let strict = Trainer::new(options).unwrap().with_preferences(TrainingPreferences {
            verify_oracle: true,
            skip_inexpressible: false,
        });
        assert_matches!(
            strict.train(&sentences),
            Err(ParserError::Oracle(OracleError::NotExpressible { .. }))
        );
    }

    #[test]
    fn test_non_projective_trains_with_covington() {
        let options = ParserOptions::for_algorithm(Algorithm::CovNonProj);
        let (_, statistics) = Trainer::new(options).unwrap().train(&[non_projective()]).unwrap();
        assert_eq!(statistics.skipped, 0);
        assert_eq!(statistics.sentences, 1);
    }

    #[test]
    fn test_two_planar_policy_flags_train_without_aborting() {
        let heads = ["0", "0", "5", "0", "6", "0", "2", "2", "6"];
        let text: String = heads
            .iter()
            .enumerate()
            .map(|(i, head)| format!("{}\tw{}\t_\tX\tX\t_\t{}\tDEP\t_\t_\n", i + 1, i + 1, head))
            .collect();
        let mut sentences = corpus();
        sentences.push(non_projective());
        sentences.extend(crate::corpus::read_sentences(std::io::Cursor::new(text)).unwrap());

        for (no_covered_roots, connectedness) in [(false, "reduce"), (true, "none"), (true, "reduce")] {
            let mut options = ParserOptions::for_algorithm(Algorithm::TwoPlanar);
            options.planar.no_covered_roots = no_covered_roots;
            options.planar.connectedness = connectedness.to_string();
            options.guide.epochs = 1;

            let (_, statistics) = Trainer::new(options).unwrap().train(&sentences).unwrap();
            assert_eq!(statistics.sentences + statistics.skipped, sentences.len());
            assert!(statistics.sentences > 0);
        }
    }

    #[test]
    fn test_empty_or_unlabeled_input() {
        let trainer = Trainer::new(ParserOptions::default()).unwrap();
        assert_matches!(
            trainer.train(&[]),
            Err(ParserError::Corpus(CorpusError::EmptyCorpus { .. }))
        );

        let stripped: Vec<Sentence> = corpus().iter().map(crate::corpus::strip_gold).collect();
        assert_matches!(
            trainer.train(&stripped),
            Err(ParserError::Corpus(CorpusError::MalformedRow { .. }))
        );
    }

    #[test]
    fn test_invalid_options_rejected_before_training() {
        let mut options = ParserOptions::default();
        options.parser.k_best = 0;
        assert_matches!(Trainer::new(options), Err(ParserError::Config(_)));
    }
}
