//! Decision models: the bridge between transitions and classifiers
//!
//! A decision model routes each decision to a named sub-model:
//!
//! | relation   | sub-models                                   |
//! |------------|----------------------------------------------|
//! | none       | `odm0`                                       |
//! | sequential | `sdm0` (transition), `sdm1` (label)          |
//! | branched   | `bdm0` (transition), `bdm1<SYMBOL>` (label)  |
//!
//! During training the sub-models collect instances; [`DecisionModel::no_more_instances`]
//! trains them into a read-only [`TrainedGuide`] that parse-time models share.

use super::classifier::{Classifier, ClassifierFactory};
use super::decision::{ActionMapper, ComplexDecision};
use super::error::{GuideError, GuideResult};
use super::settings::{DecisionSettings, RelationToNextDecision};
use crate::logging::codes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// TRAINED GUIDE
// ============================================================================

/// Trained sub-models, shared read-only by every parser
#[derive(Debug)]
pub struct TrainedGuide {
    settings: DecisionSettings,
    learner: String,
    models: BTreeMap<String, Box<dyn Classifier>>,
}

#[derive(Serialize, Deserialize)]
struct GuideFile {
    settings: String,
    learner: String,
    models: BTreeMap<String, serde_json::Value>,
}

impl TrainedGuide {
    pub fn new(
        settings: DecisionSettings,
        learner: &str,
        models: BTreeMap<String, Box<dyn Classifier>>,
    ) -> Self {
        Self {
            settings,
            learner: learner.to_string(),
            models,
        }
    }

    pub fn settings(&self) -> &DecisionSettings {
        &self.settings
    }

    pub fn learner(&self) -> &str {
        &self.learner
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Ranking from a sub-model; a sub-model never trained ranks nothing
    pub fn predict(&self, model: &str, features: &[i32]) -> GuideResult<Vec<i32>> {
        match self.models.get(model) {
            Some(classifier) => classifier.predict(features),
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&self, path: &Path) -> GuideResult<()> {
        let models = self
            .models
            .iter()
            .map(|(name, classifier)| Ok((name.clone(), classifier.save_state()?)))
            .collect::<GuideResult<BTreeMap<_, _>>>()?;
        let file = GuideFile {
            settings: self.settings.to_string(),
            learner: self.learner.clone(),
            models,
        };
        let json = serde_json::to_string(&file)?;
        fs::write(path, json).map_err(|e| GuideError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    pub fn load(path: &Path, factory: &dyn ClassifierFactory) -> GuideResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| GuideError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let file: GuideFile = serde_json::from_str(&json)?;
        if !file.learner.eq_ignore_ascii_case(factory.learner()) {
            return Err(GuideError::Serialization {
                error: format!(
                    "guide was trained with '{}' but '{}' was requested",
                    file.learner,
                    factory.learner()
                ),
            });
        }
        let settings = DecisionSettings::parse(&file.settings)
            .map_err(|e| GuideError::Serialization { error: e.to_string() })?;

        let mut models = BTreeMap::new();
        for (name, state) in file.models {
            let classifier = factory.restore(&name, state)?;
            models.insert(name, classifier);
        }
        Ok(Self::new(settings, &file.learner, models))
    }
}

// ============================================================================
// CLASSIFIER BANK
// ============================================================================

/// Where a decision model's sub-models live
#[derive(Debug)]
enum Bank {
    Learn {
        factory: Arc<dyn ClassifierFactory>,
        models: BTreeMap<String, Box<dyn Classifier>>,
    },
    Classify(Arc<TrainedGuide>),
    Terminated,
}

impl Bank {
    fn mode(&self) -> &'static str {
        match self {
            Bank::Learn { .. } => "learning",
            Bank::Classify(_) => "classifying",
            Bank::Terminated => "terminated",
        }
    }

    fn add_instance(&mut self, model: &str, features: &[i32], code: i32) -> GuideResult<()> {
        match self {
            Bank::Learn { factory, models } => models
                .entry(model.to_string())
                .or_insert_with(|| factory.create(model))
                .add_instance(features, code),
            _ => Err(GuideError::mode_violation("add_instance", self.mode())),
        }
    }

    fn predict(&self, model: &str, features: &[i32]) -> GuideResult<Vec<i32>> {
        match self {
            Bank::Classify(guide) => guide.predict(model, features),
            _ => Err(GuideError::mode_violation("predict", self.mode())),
        }
    }
}

// ============================================================================
// DECISION MODELS
// ============================================================================

/// Sub-model routing per relation between the two decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionModelKind {
    One,
    Seq,
    Branched,
}

impl DecisionModelKind {
    fn for_relation(relation: RelationToNextDecision) -> Self {
        match relation {
            RelationToNextDecision::None => DecisionModelKind::One,
            RelationToNextDecision::Sequential => DecisionModelKind::Seq,
            RelationToNextDecision::Branched => DecisionModelKind::Branched,
        }
    }

    fn first_model(&self) -> &'static str {
        match self {
            DecisionModelKind::One => "odm0",
            DecisionModelKind::Seq => "sdm0",
            DecisionModelKind::Branched => "bdm0",
        }
    }
}

/// One per parser or trainer; never shared between threads
#[derive(Debug)]
pub struct DecisionModel {
    kind: DecisionModelKind,
    mapper: ActionMapper,
    bank: Bank,
    /// Features of the last prediction, kept for re-predicting the label
    last_features: Vec<i32>,
}

impl DecisionModel {
    /// Model that collects training instances
    pub fn learner(mapper: ActionMapper, factory: Arc<dyn ClassifierFactory>) -> Self {
        Self {
            kind: DecisionModelKind::for_relation(mapper.settings().relation()),
            mapper,
            bank: Bank::Learn {
                factory,
                models: BTreeMap::new(),
            },
            last_features: Vec::new(),
        }
    }

    /// Model that predicts with a trained guide
    pub fn classifier(mapper: ActionMapper, guide: Arc<TrainedGuide>) -> Self {
        Self {
            kind: DecisionModelKind::for_relation(mapper.settings().relation()),
            mapper,
            bank: Bank::Classify(guide),
            last_features: Vec::new(),
        }
    }

    pub fn kind(&self) -> DecisionModelKind {
        self.kind
    }

    pub fn mapper(&self) -> &ActionMapper {
        &self.mapper
    }

    /// Name of the sub-model predicting the label after `first`
    fn second_model(&self, first: i32) -> GuideResult<Option<String>> {
        match self.kind {
            DecisionModelKind::One => Ok(None),
            DecisionModelKind::Seq => Ok(self.mapper.settings().is_labeled().then(|| "sdm1".to_string())),
            DecisionModelKind::Branched => {
                if !self.mapper.needs_label(first)? {
                    return Ok(None);
                }
                Ok(Some(format!("bdm1{}", self.mapper.kind(first)?.symbol())))
            }
        }
    }

    /// Feature vector of the second sub-model
    fn second_features(&self, features: &[i32], first: i32) -> Vec<i32> {
        let mut extended = features.to_vec();
        if self.kind == DecisionModelKind::Seq {
            extended.push(first);
        }
        extended
    }

    /// Record the gold decision for `features`
    pub fn add_instance(&mut self, features: &[i32], decision: &ComplexDecision) -> GuideResult<()> {
        let (first, second) = decision.codes();
        let first = first.ok_or_else(|| GuideError::malformed("gold decision has no code"))?;
        self.bank.add_instance(self.kind.first_model(), features, first)?;

        // label models only see labeled gold transitions
        if let (Some(model), Some(label)) = (self.second_model(first)?, second) {
            let extended = self.second_features(features, first);
            self.bank.add_instance(&model, &extended, label)?;
        }
        Ok(())
    }

    /// Fill `decision` with the best ranked codes for `features`
    pub fn predict(&mut self, features: &[i32], decision: &mut ComplexDecision) -> GuideResult<()> {
        decision.clear();
        self.last_features.clear();
        self.last_features.extend_from_slice(features);

        let ranked = self.bank.predict(self.kind.first_model(), features)?;
        decision.first_mut().add_ranked(&ranked);
        self.predict_second(decision)
    }

    fn predict_second(&self, decision: &mut ComplexDecision) -> GuideResult<()> {
        let Some(first) = decision.first().code() else {
            decision.drop_second();
            return Ok(());
        };
        match self.second_model(first)? {
            Some(model) => {
                let extended = self.second_features(&self.last_features, first);
                let ranked = self.bank.predict(&model, &extended)?;
                decision.second_mut().add_ranked(&ranked);
            }
            None => decision.drop_second(),
        }
        Ok(())
    }

    /// Prediction plus the feature vectors each sub-model saw
    pub fn predict_extract(
        &mut self,
        features: &[i32],
        decision: &mut ComplexDecision,
    ) -> GuideResult<Vec<(String, Vec<i32>)>> {
        self.predict(features, decision)?;
        self.extract(features, decision)
    }

    /// Feature vectors per sub-model for an already filled decision
    pub fn extract(&self, features: &[i32], decision: &ComplexDecision) -> GuideResult<Vec<(String, Vec<i32>)>> {
        let mut vectors = vec![(self.kind.first_model().to_string(), features.to_vec())];
        if let Some(first) = decision.first().code() {
            if let Some(model) = self.second_model(first)? {
                vectors.push((model, self.second_features(features, first)));
            }
        }
        Ok(vectors)
    }

    /// Advance to the next candidate; `false` once every list is exhausted
    ///
    /// The label list is walked first. When it runs out the transition moves
    /// to its next candidate and a fresh label ranking is predicted for it.
    pub fn predict_from_kbest(&mut self, decision: &mut ComplexDecision) -> GuideResult<bool> {
        if let Some(second) = decision.second_if_present_mut() {
            if second.update_from_kbest() {
                return Ok(true);
            }
        }
        if !decision.first_mut().update_from_kbest() {
            return Ok(false);
        }
        self.predict_second(decision)?;
        Ok(true)
    }

    /// Train every sub-model and freeze them into a guide
    pub fn no_more_instances(self) -> GuideResult<TrainedGuide> {
        let settings = self.mapper.settings().clone();
        match self.bank {
            Bank::Learn { factory, mut models } => {
                for (name, classifier) in models.iter_mut() {
                    classifier
                        .train()
                        .map_err(|e| GuideError::training_failure(name, e.to_string()))?;
                }
                crate::log_success!(codes::success::GUIDE_TRAINED, "Decision models trained",
                    "models" => models.len(),
                    "learner" => factory.learner()
                );
                Ok(TrainedGuide::new(settings, factory.learner(), models))
            }
            other => Err(GuideError::mode_violation("no_more_instances", other.mode())),
        }
    }

    /// Release classifier resources
    pub fn terminate(&mut self) {
        self.bank = Bank::Terminated;
        self.last_features.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::classifier::PerceptronFactory;
    use crate::transition::{TransitionKind, TransitionTable};
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    /// Returns a fixed ranking and records nothing
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
            Ok(serde_json::json!(self.0))
        }
    }

    fn mapper(settings: &str) -> ActionMapper {
        use TransitionKind::*;
        ActionMapper::new(
            DecisionSettings::parse(settings).unwrap(),
            TransitionTable::new("nivreeager", &[Shift, Reduce, RightArc, LeftArc]),
            1,
        )
    }

    fn scripted(settings: &str, models: &[(&str, Vec<i32>)]) -> DecisionModel {
        let mapper = mapper(settings);
        let models = models
            .iter()
            .map(|(name, ranking)| (name.to_string(), Box::new(Scripted(ranking.clone())) as Box<dyn Classifier>))
            .collect();
        let guide = TrainedGuide::new(mapper.settings().clone(), "scripted", models);
        DecisionModel::classifier(mapper, Arc::new(guide))
    }

    #[test]
    fn test_one_decision_walks_kbest() {
        let mut model = scripted("T.TRANS+A.DEPREL", &[("odm0", vec![5, 2, 7])]);
        let mut decision = ComplexDecision::new(-1);
        model.predict(&[1, 2], &mut decision).unwrap();
        assert_eq!(decision.codes(), (Some(5), None));

        assert!(model.predict_from_kbest(&mut decision).unwrap());
        assert!(model.predict_from_kbest(&mut decision).unwrap());
        assert_eq!(decision.codes(), (Some(7), None));
        assert!(!model.predict_from_kbest(&mut decision).unwrap());
    }

    #[test]
    fn test_sequential_appends_first_code() {
        let mut model = scripted("T.TRANS,A.DEPREL", &[("sdm0", vec![3, 1]), ("sdm1", vec![9, 8])]);
        let mut decision = ComplexDecision::new(-1);
        let vectors = model.predict_extract(&[4, 4], &mut decision).unwrap();
        assert_eq!(decision.codes(), (Some(3), Some(9)));
        assert_eq!(vectors[1], ("sdm1".to_string(), vec![4, 4, 3]));

        // labels first, then the next transition with a fresh label ranking
        assert!(model.predict_from_kbest(&mut decision).unwrap());
        assert_eq!(decision.codes(), (Some(3), Some(8)));
        assert!(model.predict_from_kbest(&mut decision).unwrap());
        assert_eq!(decision.codes(), (Some(1), Some(9)));
    }

    #[test]
    fn test_branched_labels_only_arcs() {
        let mut model = scripted("T.TRANS#A.DEPREL", &[("bdm0", vec![1, 4]), ("bdm1LA", vec![6])]);
        let mut decision = ComplexDecision::new(-1);
        model.predict(&[0], &mut decision).unwrap();
        assert_eq!(decision.codes(), (Some(1), None));

        assert!(model.predict_from_kbest(&mut decision).unwrap());
        assert_eq!(decision.codes(), (Some(4), Some(6)));
        assert_eq!(model.extract(&[0], &decision).unwrap()[1].0, "bdm1LA");
    }

    #[test]
    fn test_learning_then_freezing() {
        let mut model = DecisionModel::learner(mapper("T.TRANS,A.DEPREL"), Arc::new(PerceptronFactory::new(2)));
        let mut decision = ComplexDecision::new(-1);

        decision.first_mut().set_code(1);
        model.add_instance(&[1], &decision).unwrap();
        decision.first_mut().set_code(3);
        decision.second_mut().set_code(2);
        model.add_instance(&[2], &decision).unwrap();

        assert_matches!(
            model.predict(&[1], &mut decision),
            Err(GuideError::ModeViolation { .. })
        );

        let guide = model.no_more_instances().unwrap();
        assert_eq!(guide.model_names().collect::<Vec<_>>(), vec!["sdm0", "sdm1"]);
        assert_eq!(guide.predict("sdm0", &[2]).unwrap()[0], 3);
        assert!(guide.predict("missing", &[2]).unwrap().is_empty());
    }

    #[test]
    fn test_terminated_model_refuses_work() {
        let mut model = scripted("T.TRANS+A.DEPREL", &[("odm0", vec![1])]);
        model.terminate();
        let mut decision = ComplexDecision::new(-1);
        assert_matches!(
            model.predict(&[1], &mut decision),
            Err(GuideError::ModeViolation { mode, .. }) if mode == "terminated"
        );
    }

    #[test]
    fn test_guide_file_round_trip() {
        let mut model = DecisionModel::learner(mapper("T.TRANS+A.DEPREL"), Arc::new(PerceptronFactory::new(3)));
        let mut decision = ComplexDecision::new(-1);
        for (features, code) in [([1, 1], 1), ([2, 2], 2), ([1, 2], 1)] {
            decision.clear();
            decision.first_mut().set_code(code);
            model.add_instance(&features, &decision).unwrap();
        }
        let guide = model.no_more_instances().unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("guide.json");
        guide.save(&path).unwrap();
        let loaded = TrainedGuide::load(&path, &PerceptronFactory::new(3)).unwrap();

        assert_eq!(loaded.settings(), guide.settings());
        assert_eq!(loaded.predict("odm0", &[2, 2]).unwrap(), guide.predict("odm0", &[2, 2]).unwrap());
    }
}
