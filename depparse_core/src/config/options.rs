//! Run configuration loaded from TOML
//!
//! Every section has defaults, so an empty file is a valid configuration for
//! the `nivreeager` algorithm. String-valued flags are kept as written in the
//! file and resolved through the typed accessors, which is where
//! [`ParserOptions::validate`] catches malformed values.

use super::constants;
use super::error::{ConfigError, ConfigResult};
use crate::feature::FeatureModel;
use crate::guide::DecisionSettings;
use crate::symbols::NullValueStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// ENUMERATED FLAGS
// ============================================================================

/// Parsing algorithm names accepted in `parser.algorithm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    NivreEager,
    StackProj,
    CovNonProj,
    CovProj,
    Planar,
    TwoPlanar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::NivreEager,
        Algorithm::StackProj,
        Algorithm::CovNonProj,
        Algorithm::CovProj,
        Algorithm::Planar,
        Algorithm::TwoPlanar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::NivreEager => "nivreeager",
            Algorithm::StackProj => "stackproj",
            Algorithm::CovNonProj => "covnonproj",
            Algorithm::CovProj => "covproj",
            Algorithm::Planar => "planar",
            Algorithm::TwoPlanar => "2planar",
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownAlgorithm {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `planar.connectedness`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectedness {
    None,
    Reduce,
}

impl FromStr for Connectedness {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Connectedness::None),
            "reduce" => Ok(Connectedness::Reduce),
            _ => Err(ConfigError::invalid_option(
                "planar",
                "connectedness",
                s,
                "expected 'none' or 'reduce'",
            )),
        }
    }
}

/// `multiplanar.planar_root_handling`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootHandling {
    /// Root takes part in arcs like any other node
    Normal,
    /// Root never receives explicit arcs; headless nodes are linked at the end
    Relaxed,
}

impl FromStr for RootHandling {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(RootHandling::Normal),
            "relaxed" => Ok(RootHandling::Relaxed),
            _ => Err(ConfigError::invalid_option(
                "multiplanar",
                "planar_root_handling",
                s,
                "expected 'normal' or 'relaxed'",
            )),
        }
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    pub algorithm: String,
    pub decision_settings: String,
    /// Ranked candidates consulted on an illegal prediction, -1 for all
    pub k_best: i32,
    pub root_label: String,
    pub null_value_strategy: String,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::NivreEager.as_str().to_string(),
            decision_settings: "T.TRANS+A.DEPREL".to_string(),
            k_best: -1,
            root_label: "ROOT".to_string(),
            null_value_strategy: "one".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NivreSection {
    pub allow_root: bool,
    pub allow_reduce: bool,
}

impl Default for NivreSection {
    fn default() -> Self {
        Self {
            allow_root: true,
            allow_reduce: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovingtonSection {
    pub allow_root: bool,
    pub allow_shift: bool,
}

impl Default for CovingtonSection {
    fn default() -> Self {
        Self {
            allow_root: true,
            allow_shift: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarSection {
    pub no_covered_roots: bool,
    pub acyclicity: bool,
    pub connectedness: String,
}

impl Default for PlanarSection {
    fn default() -> Self {
        Self {
            no_covered_roots: false,
            acyclicity: true,
            connectedness: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplanarSection {
    pub planar_root_handling: String,
}

impl Default for MultiplanarSection {
    fn default() -> Self {
        Self {
            planar_root_handling: "normal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoPlanarSection {
    pub reduceonswitch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSection {
    /// Empty means the algorithm's default feature model
    pub specs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideSection {
    pub learner: String,
    pub epochs: usize,
}

impl Default for GuideSection {
    fn default() -> Self {
        Self {
            learner: "perceptron".to_string(),
            epochs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub threads: usize,
    /// Abort the batch on the first failing sentence
    pub fail_fast: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            threads: constants::engine::DEFAULT_THREADS,
            fail_fast: true,
        }
    }
}

// ============================================================================
// PARSER OPTIONS
// ============================================================================

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub parser: ParserSection,
    pub nivre: NivreSection,
    pub covington: CovingtonSection,
    pub planar: PlanarSection,
    pub multiplanar: MultiplanarSection,
    #[serde(rename = "2planar")]
    pub two_planar: TwoPlanarSection,
    pub features: FeatureSection,
    pub guide: GuideSection,
    pub engine: EngineSection,
}

impl ParserOptions {
    /// Defaults with the given algorithm selected
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        let mut options = Self::default();
        options.parser.algorithm = algorithm.as_str().to_string();
        options
    }

    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Syntax {
            error: e.to_string(),
        })
    }

    /// Read and validate an options file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let options = Self::from_toml_str(&source)?;
        options.validate()?;

        crate::log_success!(
            crate::logging::codes::success::OPTIONS_LOADED,
            "Parser options loaded",
            "path" => path.display(),
            "algorithm" => &options.parser.algorithm
        );
        Ok(options)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Syntax {
            error: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    pub fn algorithm(&self) -> ConfigResult<Algorithm> {
        self.parser.algorithm.parse()
    }

    pub fn decision_settings(&self) -> ConfigResult<DecisionSettings> {
        DecisionSettings::parse(&self.parser.decision_settings)
    }

    pub fn null_value_strategy(&self) -> ConfigResult<NullValueStrategy> {
        self.parser.null_value_strategy.parse().map_err(|_| {
            ConfigError::invalid_option(
                "parser",
                "null_value_strategy",
                &self.parser.null_value_strategy,
                "expected 'one', 'rootnode' or 'novalue'",
            )
        })
    }

    pub fn connectedness(&self) -> ConfigResult<Connectedness> {
        self.planar.connectedness.parse()
    }

    pub fn root_handling(&self) -> ConfigResult<RootHandling> {
        self.multiplanar.planar_root_handling.parse()
    }

    /// Feature specifications, falling back to the algorithm default
    pub fn feature_specs(&self) -> ConfigResult<Vec<String>> {
        if !self.features.specs.is_empty() {
            return Ok(self.features.specs.clone());
        }
        Ok(FeatureModel::default_specs(self.algorithm()?))
    }

    /// Check every flag before any sentence is read
    pub fn validate(&self) -> ConfigResult<()> {
        let algorithm = self.algorithm()?;
        self.decision_settings()?;
        self.null_value_strategy()?;
        self.connectedness()?;
        self.root_handling()?;

        if self.parser.k_best == 0 || self.parser.k_best < -1 {
            return Err(ConfigError::invalid_option(
                "parser",
                "k_best",
                self.parser.k_best,
                "must be positive or -1",
            ));
        }
        if self.parser.root_label.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "parser",
                "root_label",
                &self.parser.root_label,
                "must not be empty",
            ));
        }
        if self.engine.threads == 0 || self.engine.threads > constants::engine::MAX_THREADS {
            return Err(ConfigError::invalid_option(
                "engine",
                "threads",
                self.engine.threads,
                "must be between 1 and the thread limit",
            ));
        }
        if self.guide.epochs == 0 {
            return Err(ConfigError::invalid_option(
                "guide",
                "epochs",
                self.guide.epochs,
                "must be positive",
            ));
        }
        if !self.guide.learner.eq_ignore_ascii_case("perceptron") {
            return Err(ConfigError::invalid_option(
                "guide",
                "learner",
                &self.guide.learner,
                "only 'perceptron' is available",
            ));
        }

        for spec in &self.features.specs {
            FeatureModel::check_spec(spec, algorithm).map_err(|e| {
                ConfigError::invalid_option("features", "specs", spec, &e.to_string())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_file_gives_defaults() {
        let options = ParserOptions::from_toml_str("").unwrap();
        assert_eq!(options, ParserOptions::default());
        assert_eq!(options.algorithm().unwrap(), Algorithm::NivreEager);
        assert_eq!(options.parser.k_best, -1);
        assert_eq!(options.engine.threads, 8);
        assert!(options.nivre.allow_root);
        assert!(!options.covington.allow_shift);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_sections_are_read() {
        let source = r#"
[parser]
algorithm = "2planar"
decision_settings = "T.TRANS,A.DEPREL"
k_best = 3

[planar]
connectedness = "reduce"

[2planar]
reduceonswitch = true

[engine]
threads = 2
"#;
        let options = ParserOptions::from_toml_str(source).unwrap();
        assert_eq!(options.algorithm().unwrap(), Algorithm::TwoPlanar);
        assert_eq!(options.connectedness().unwrap(), Connectedness::Reduce);
        assert!(options.two_planar.reduceonswitch);
        assert_eq!(options.engine.threads, 2);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let options = ParserOptions::from_toml_str("[parser]\nalgorithm = \"arcswift\"\n").unwrap();
        assert_matches!(
            options.validate(),
            Err(ConfigError::UnknownAlgorithm { name }) if name == "arcswift"
        );
    }

    #[test]
    fn test_malformed_flags_rejected() {
        let mut options = ParserOptions::default();
        options.parser.k_best = 0;
        assert_matches!(options.validate(), Err(ConfigError::InvalidOption { option, .. }) if option == "k_best");

        let mut options = ParserOptions::default();
        options.engine.threads = 0;
        assert_matches!(options.validate(), Err(ConfigError::InvalidOption { option, .. }) if option == "threads");

        let mut options = ParserOptions::default();
        options.parser.decision_settings = "T.TRANS".to_string() + "?A.DEPREL";
        assert_matches!(options.validate(), Err(ConfigError::InvalidDecisionSettings { .. }));

        let mut options = ParserOptions::default();
        options.multiplanar.planar_root_handling = "loose".to_string();
        assert_matches!(options.validate(), Err(ConfigError::InvalidOption { .. }));

        let mut options = ParserOptions::default();
        options.features.specs = vec!["InputColumn(FORM, Nowhere[0])".to_string()];
        assert_matches!(options.validate(), Err(ConfigError::InvalidOption { section, .. }) if section == "features");
    }

    #[test]
    fn test_bad_toml_is_syntax_error() {
        assert_matches!(
            ParserOptions::from_toml_str("[parser\nalgorithm ="),
            Err(ConfigError::Syntax { .. })
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");

        let mut options = ParserOptions::for_algorithm(Algorithm::CovNonProj);
        options.covington.allow_shift = true;
        options.save(&path).unwrap();

        let reloaded = ParserOptions::from_file(&path).unwrap();
        assert_eq!(reloaded, options);
    }

    #[test]
    fn test_default_features_follow_algorithm() {
        let options = ParserOptions::for_algorithm(Algorithm::TwoPlanar);
        let specs = options.feature_specs().unwrap();
        assert!(specs.iter().any(|s| s.contains("ActiveStack")));
    }
}
