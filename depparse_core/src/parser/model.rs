//! A trained parser model and its on-disk directory layout

use super::encoding::LABEL_TABLE;
use super::error::{ParserError, ParserResult};
use crate::algorithm::ParsingAlgorithm;
use crate::config::constants::model::{GUIDE_FILE, OPTIONS_FILE, SYMBOL_TABLE_FILE};
use crate::config::ParserOptions;
use crate::feature::FeatureModel;
use crate::guide::{factory_for, ActionMapper, TrainedGuide};
use crate::logging::codes;
use crate::symbols::{HashSymbolTableHandler, SymbolTableHandler};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Everything a parser needs, immutable once built and shared by every worker
#[derive(Debug)]
pub struct TrainedModel {
    options: ParserOptions,
    algorithm: ParsingAlgorithm,
    symbols: Arc<HashSymbolTableHandler>,
    guide: Arc<TrainedGuide>,
    features: FeatureModel,
    root_label: i32,
}

/// Printable description of a model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub algorithm: String,
    pub decision_settings: String,
    pub learner: String,
    pub k_best: i32,
    pub root_label: String,
    pub sub_models: Vec<String>,
    pub tables: Vec<(String, usize)>,
    pub features: Vec<String>,
}

impl TrainedModel {
    pub fn new(
        options: ParserOptions,
        symbols: HashSymbolTableHandler,
        guide: TrainedGuide,
    ) -> ParserResult<Self> {
        options.validate()?;
        let algorithm = ParsingAlgorithm::from_options(&options)?;
        if *guide.settings() != options.decision_settings()? {
            return Err(ParserError::model(
                "<memory>",
                format!(
                    "guide uses decision settings '{}' but the options ask for '{}'",
                    guide.settings(),
                    options.parser.decision_settings
                ),
            ));
        }
        let features = FeatureModel::new(&options.feature_specs()?, algorithm.algorithm())?;
        let root_label = symbols.require_code(LABEL_TABLE, &options.parser.root_label)?;

        Ok(Self {
            options,
            algorithm,
            symbols: Arc::new(symbols),
            guide: Arc::new(guide),
            features,
            root_label,
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn algorithm(&self) -> ParsingAlgorithm {
        self.algorithm
    }

    pub fn symbols(&self) -> Arc<HashSymbolTableHandler> {
        Arc::clone(&self.symbols)
    }

    pub fn guide(&self) -> Arc<TrainedGuide> {
        Arc::clone(&self.guide)
    }

    pub fn features(&self) -> &FeatureModel {
        &self.features
    }

    /// Code of the label given to arcs from the artificial root
    pub fn root_label(&self) -> i32 {
        self.root_label
    }

    /// A fresh mapper for a parser or trainer of this model
    pub fn mapper(&self) -> ActionMapper {
        ActionMapper::new(
            self.guide.settings().clone(),
            self.algorithm.transition_table(),
            self.root_label,
        )
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            algorithm: self.algorithm.name().to_string(),
            decision_settings: self.guide.settings().to_string(),
            learner: self.guide.learner().to_string(),
            k_best: self.options.parser.k_best,
            root_label: self.options.parser.root_label.clone(),
            sub_models: self.guide.model_names().map(str::to_string).collect(),
            tables: self
                .symbols
                .tables()
                .map(|table| (table.name().to_string(), table.size()))
                .collect(),
            features: self.features.specs().map(str::to_string).collect(),
        }
    }

    /// Write symbol tables, guide and options into `dir`
    pub fn save(&self, dir: &Path) -> ParserResult<()> {
        std::fs::create_dir_all(dir).map_err(|e| ParserError::model(dir.display(), e))?;
        self.symbols.save_to_file(&dir.join(SYMBOL_TABLE_FILE))?;
        self.guide.save(&dir.join(GUIDE_FILE))?;
        self.options.save(&dir.join(OPTIONS_FILE))?;

        crate::log_success!(codes::success::MODEL_SAVED, "Model saved",
            "path" => dir.display(),
            "algorithm" => self.algorithm.name()
        );
        Ok(())
    }

    pub fn load(dir: &Path) -> ParserResult<Self> {
        if !dir.is_dir() {
            return Err(ParserError::model(dir.display(), "not a model directory"));
        }
        let options = ParserOptions::from_file(&dir.join(OPTIONS_FILE))?;
        let symbols = HashSymbolTableHandler::load_from_file(&dir.join(SYMBOL_TABLE_FILE))?;
        let factory = factory_for(&options.guide.learner, options.guide.epochs)?;
        let guide = TrainedGuide::load(&dir.join(GUIDE_FILE), factory.as_ref())?;
        let model = Self::new(options, symbols, guide)?;

        crate::log_success!(codes::success::MODEL_LOADED, "Model loaded",
            "path" => dir.display(),
            "algorithm" => model.algorithm.name(),
            "sub_models" => model.guide.model_names().count()
        );
        Ok(model)
    }
}
