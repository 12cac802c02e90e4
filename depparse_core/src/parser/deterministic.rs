//! Single-threaded parsing of sentences with a trained model

use super::encoding;
use super::error::{ParserError, ParserResult};
use super::model::TrainedModel;
use crate::algorithm::{ParseMode, ParserConfiguration};
use crate::config::constants::parsing::transition_budget;
use crate::corpus::Sentence;
use crate::graph::TokenPool;
use crate::guide::{ComplexDecision, DecisionModel, GuideError};
use crate::logging::codes;
use crate::symbols::OverlaySymbolTableHandler;
use crate::transition::Transition;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStatistics {
    pub sentences: usize,
    pub tokens: usize,
    pub transitions: usize,
    /// Transitions forced by the configuration without asking the guide
    pub deterministic: usize,
    /// Default transitions taken after every ranked candidate was illegal
    pub fallbacks: usize,
    pub kbest_retries: usize,
}

impl ParseStatistics {
    pub fn merge(&mut self, other: &ParseStatistics) {
        self.sentences += other.sentences;
        self.tokens += other.tokens;
        self.transitions += other.transitions;
        self.deterministic += other.deterministic;
        self.fallbacks += other.fallbacks;
        self.kbest_retries += other.kbest_retries;
    }
}

/// Parser owned by one worker
///
/// Holds the worker's private state over the shared model: an overlay for
/// symbols unseen in training, a decision model and a token pool.
pub struct DeterministicParser {
    model: Arc<TrainedModel>,
    symbols: OverlaySymbolTableHandler,
    decision_model: DecisionModel,
    decision: ComplexDecision,
    pool: TokenPool,
    statistics: ParseStatistics,
}

impl DeterministicParser {
    pub fn new(model: Arc<TrainedModel>) -> Self {
        let symbols = OverlaySymbolTableHandler::new(model.symbols());
        let decision_model = DecisionModel::classifier(model.mapper(), model.guide());
        let decision = ComplexDecision::new(model.options().parser.k_best);
        Self {
            model,
            symbols,
            decision_model,
            decision,
            pool: TokenPool::new(),
            statistics: ParseStatistics::default(),
        }
    }

    pub fn statistics(&self) -> &ParseStatistics {
        &self.statistics
    }

    /// Parse `sentence`, returning a copy with HEAD and DEPREL filled in
    pub fn parse(&mut self, sentence: &Sentence) -> ParserResult<Sentence> {
        let result = self.parse_sentence(sentence);
        self.symbols.clear_tmp_storage();
        result
    }

    fn parse_sentence(&mut self, sentence: &Sentence) -> ParserResult<Sentence> {
        encoding::check_length(self.statistics.sentences + 1, sentence)?;
        let structure = encoding::encode_input(sentence, &mut self.symbols, &mut self.pool)?;
        let mut config = self.model.algorithm().initial_configuration(structure);

        let budget = transition_budget(sentence.len());
        let mut transitions = 0;
        while !config.is_terminal() {
            let transition = match config.deterministic_transition() {
                Some(transition) => {
                    self.statistics.deterministic += 1;
                    transition
                }
                None => self.predict(&config)?,
            };
            config.apply(transition, ParseMode::Parse)?;
            transitions += 1;
            if transitions > budget {
                return Err(ParserError::TransitionLimit { budget });
            }
        }

        let structure = config.finish(Some(self.model.root_label()));
        let mut parsed = sentence.clone();
        let written = encoding::write_arcs(&structure, &self.symbols, &mut parsed);
        structure.release(&mut self.pool);
        written?;

        self.statistics.sentences += 1;
        self.statistics.tokens += sentence.len();
        self.statistics.transitions += transitions;
        Ok(parsed)
    }

    /// Best ranked transition that is legal in `config`
    ///
    /// Candidates that decode to nothing or to an illegal transition are
    /// skipped. When the ranked lists run out the configuration's default
    /// transition is taken.
    fn predict(&mut self, config: &ParserConfiguration) -> ParserResult<Transition> {
        let features = self.model.features().extract(config, &self.symbols)?;
        self.decision_model.predict(&features, &mut self.decision)?;

        loop {
            match self.decision_model.mapper().decode(&self.decision, &self.symbols) {
                Ok(transition) if config.is_permissible(&transition) => return Ok(transition),
                Ok(_) | Err(GuideError::MalformedDecision { .. }) => {}
                Err(e) => return Err(e.into()),
            }
            if !self.decision_model.predict_from_kbest(&mut self.decision)? {
                break;
            }
            self.statistics.kbest_retries += 1;
        }

        let fallback = config.default_transition(self.model.root_label());
        self.statistics.fallbacks += 1;
        crate::log_warning!(code = codes::guide::KBEST_EXHAUSTED, "No legal transition among ranked candidates",
            "algorithm" => config.name(),
            "fallback" => fallback
        );
        Ok(fallback)
    }

    /// Parse a run of sentences in order
    pub fn parse_all(&mut self, sentences: &[Sentence]) -> ParserResult<Vec<Sentence>> {
        sentences.iter().map(|sentence| self.parse(sentence)).collect()
    }
}

impl Drop for DeterministicParser {
    fn drop(&mut self) {
        self.decision_model.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, ParserOptions};
    use crate::corpus::{diff_sentences, strip_gold};
    use crate::guide::{Classifier, GuideResult, TrainedGuide};
    use crate::parser::encoding::{declare_tables, LABEL_TABLE};
    use crate::parser::fixtures::corpus;
    use crate::parser::Trainer;
    use crate::symbols::{HashSymbolTableHandler, NullValueStrategy, SymbolTableHandler};
    use crate::transition::TransitionKind;
    use std::collections::BTreeMap;

    /// Returns the same ranking for every feature vector
    #[derive(Debug)]
    struct Scripted(Vec<i32>);

    impl Classifier for Scripted {
        fn add_instance(&mut self, _: &[i32], _: i32) -> GuideResult<()> {
            Ok(())
        }

        fn train(&mut self) -> GuideResult<()> {
            Ok(())
        }

        fn predict(&self, _: &[i32]) -> GuideResult<Vec<i32>> {
            Ok(self.0.clone())
        }

        fn instance_count(&self) -> usize {
            0
        }

        fn save_state(&self) -> GuideResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    /// Unlabeled arc-eager model whose only sub-model ranks RE, LA, SH, RA
    fn scripted_model(k_best: i32) -> Arc<TrainedModel> {
        let mut options = ParserOptions::for_algorithm(Algorithm::NivreEager);
        options.parser.decision_settings = "T.TRANS".to_string();
        options.parser.k_best = k_best;

        let mut symbols = HashSymbolTableHandler::new(NullValueStrategy::One);
        declare_tables(&mut symbols).unwrap();
        symbols.add_symbol(LABEL_TABLE, "ROOT").unwrap();

        let table = crate::algorithm::ParsingAlgorithm::from_options(&options)
            .unwrap()
            .transition_table();
        let ranking = [
            TransitionKind::Reduce,
            TransitionKind::LeftArc,
            TransitionKind::Shift,
            TransitionKind::RightArc,
        ]
        .iter()
        .map(|&kind| table.code(kind).unwrap())
        .collect();

        let mut models: BTreeMap<String, Box<dyn Classifier>> = BTreeMap::new();
        models.insert("odm0".to_string(), Box::new(Scripted(ranking)));
        let guide = TrainedGuide::new(options.decision_settings().unwrap(), "scripted", models);
        Arc::new(TrainedModel::new(options, symbols, guide).unwrap())
    }

    fn two_tokens() -> Sentence {
        let row = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Sentence::from_rows(vec![
            row(&["1", "Birds", "_", "N", "NNS"]),
            row(&["2", "sing", "_", "V", "VBP"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_kbest_skips_illegal_top_candidates() {
        let mut parser = DeterministicParser::new(scripted_model(3));
        let parsed = parser.parse(&two_tokens()).unwrap();

        // SH, LA(1 <- 2), SH; the final linking attaches 2 to the root
        assert_eq!(parsed.head(1), Some(2));
        assert_eq!(parsed.head(2), Some(0));
        assert_eq!(parsed.deprel(1), Some("ROOT"));
        let statistics = parser.statistics();
        assert_eq!(statistics.fallbacks, 0);
        assert_eq!(statistics.kbest_retries, 2 + 1 + 2);
        assert_eq!(statistics.transitions, 3);
    }

    #[test]
    fn test_exhausted_kbest_takes_default_transition() {
        let mut parser = DeterministicParser::new(scripted_model(1));
        let parsed = parser.parse(&two_tokens()).unwrap();

        // only RE is ranked, so every guided step shifts
        assert_eq!(parser.statistics().fallbacks, 2);
        assert_eq!(parsed.head(1), Some(0));
        assert_eq!(parsed.head(2), Some(0));
    }

    #[test]
    fn test_overlay_is_cleared_between_sentences() {
        let model = scripted_model(-1);
        let mut parser = DeterministicParser::new(Arc::clone(&model));
        parser.parse(&two_tokens()).unwrap();

        assert_eq!(parser.symbols.overlay_size("FORM"), 0);
        assert_eq!(model.symbols().symbol_to_code("FORM", "Birds").unwrap(), None);
    }

    #[test]
    fn test_trained_model_reparses_training_data() {
        let mut options = ParserOptions::default();
        options.guide.epochs = 20;
        let (model, _) = Trainer::new(options).unwrap().train(&corpus()).unwrap();

        let mut parser = DeterministicParser::new(Arc::new(model));
        for gold in corpus() {
            let parsed = parser.parse(&strip_gold(&gold)).unwrap();
            assert_eq!(parsed.len(), gold.len());
            assert!(diff_sentences(&gold, &parsed).is_some());
            assert!((1..=parsed.len()).all(|t| parsed.head(t).is_some()));
        }
        assert_eq!(parser.statistics().sentences, 2);
    }
}
