//! Error, warning and success codes with their classification metadata
//!
//! Every code the parser can emit is declared here together with the metadata
//! used by the logging service (category, severity, halting behaviour).

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

pub mod config {
    use super::Code;

    pub const INVALID_OPTION: Code = Code::new("E010");
    pub const UNKNOWN_ALGORITHM: Code = Code::new("E011");
    pub const INVALID_DECISION_SETTINGS: Code = Code::new("E012");
    pub const OPTIONS_IO: Code = Code::new("E013");
    pub const OPTIONS_SYNTAX: Code = Code::new("E014");
}

pub mod symbols {
    use super::Code;

    pub const UNKNOWN_TABLE: Code = Code::new("E020");
    pub const UNKNOWN_CODE: Code = Code::new("E021");
    pub const UNKNOWN_SYMBOL: Code = Code::new("E022");
    pub const EMPTY_SYMBOL: Code = Code::new("E023");
    pub const INVALID_VALUE: Code = Code::new("E024");
    pub const SYMBOL_IO: Code = Code::new("E025");
    pub const MALFORMED_TABLE: Code = Code::new("E026");
}

pub mod graph {
    use super::Code;

    pub const INVALID_NODE: Code = Code::new("E030");
    pub const MULTIPLE_HEADS: Code = Code::new("E031");
    pub const ROOT_AS_DEPENDENT: Code = Code::new("E032");
}

pub mod transition {
    use super::Code;

    pub const ILLEGAL_TRANSITION: Code = Code::new("E040");
    pub const CONFIGURATION_MISMATCH: Code = Code::new("E041");
    pub const UNKNOWN_TRANSITION: Code = Code::new("E042");
    pub const TRANSITION_LIMIT: Code = Code::new("E043");
}

pub mod oracle {
    use super::Code;

    pub const NOT_EXPRESSIBLE: Code = Code::new("E050");
    pub const DIVERGENCE: Code = Code::new("E051");
}

pub mod guide {
    use super::Code;

    pub const MODE_VIOLATION: Code = Code::new("E060");
    pub const TRAINING_FAILURE: Code = Code::new("E061");
    pub const MALFORMED_DECISION: Code = Code::new("E062");
    pub const GUIDE_IO: Code = Code::new("E063");
    pub const KBEST_EXHAUSTED: Code = Code::new("W101");
}

pub mod features {
    use super::Code;

    pub const UNKNOWN_FUNCTION: Code = Code::new("E070");
    pub const MALFORMED_SPEC: Code = Code::new("E071");
    pub const UNSUPPORTED_ADDRESS: Code = Code::new("E072");
}

pub mod corpus {
    use super::Code;

    pub const CORPUS_IO: Code = Code::new("E080");
    pub const MALFORMED_ROW: Code = Code::new("E081");
    pub const EMPTY_CORPUS: Code = Code::new("E082");
}

pub mod engine {
    use super::Code;

    pub const WORKER_FAILURE: Code = Code::new("E090");
    pub const THREAD_PANICKED: Code = Code::new("E091");
    pub const INVALID_THREAD_COUNT: Code = Code::new("E092");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const OPTIONS_LOADED: Code = Code::new("I010");
    pub const SYMBOL_TABLES_SAVED: Code = Code::new("I020");
    pub const SYMBOL_TABLES_LOADED: Code = Code::new("I021");
    pub const ORACLE_PASS_COMPLETE: Code = Code::new("I050");
    pub const GUIDE_TRAINED: Code = Code::new("I060");
    pub const MODEL_SAVED: Code = Code::new("I061");
    pub const MODEL_LOADED: Code = Code::new("I062");
    pub const CORPUS_READ: Code = Code::new("I080");
    pub const CORPUS_WRITTEN: Code = Code::new("I081");
    pub const BATCH_COMPLETE: Code = Code::new("I090");
    pub const WORKER_COMPLETE: Code = Code::new("I091");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type MetadataRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const METADATA: &[MetadataRow] = &[
    ("ERR001", "System", Severity::Critical, false, true,
        "Internal parser error", "File a bug report with the failing input"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Subsystem failed to initialise", "Check logging and runtime preferences"),
    ("E010", "Configuration", Severity::High, false, true,
        "Option value is malformed or out of range", "Fix the option in the configuration file"),
    ("E011", "Configuration", Severity::High, false, true,
        "Unknown parsing algorithm", "Use one of nivreeager, stackproj, covnonproj, covproj, planar, 2planar"),
    ("E012", "Configuration", Severity::High, false, true,
        "Decision settings string cannot be interpreted", "Use T.TRANS+A.DEPREL, T.TRANS,A.DEPREL or T.TRANS#A.DEPREL"),
    ("E013", "Configuration", Severity::High, false, true,
        "Options file could not be read or written", "Check the path and permissions"),
    ("E014", "Configuration", Severity::High, false, true,
        "Options file is not valid TOML", "Fix the syntax reported by the TOML parser"),
    ("E020", "Symbols", Severity::High, false, true,
        "Symbol table does not exist", "The model and the data format do not match"),
    ("E021", "Symbols", Severity::High, false, true,
        "Code is not present in a frozen symbol table", "The model file is corrupted or mismatched"),
    ("E022", "Symbols", Severity::High, false, true,
        "Symbol is not present in a frozen symbol table", "The model file is corrupted or mismatched"),
    ("E023", "Symbols", Severity::Medium, false, true,
        "Empty strings cannot be encoded", "Use an explicit null value in the input"),
    ("E024", "Symbols", Severity::Medium, false, true,
        "Value does not match the table's value type", "Check the column type of the data format"),
    ("E025", "Symbols", Severity::High, false, true,
        "Symbol table file could not be read or written", "Check the model directory"),
    ("E026", "Symbols", Severity::High, false, true,
        "Symbol table file is malformed", "Regenerate the model"),
    ("E030", "Graph", Severity::High, false, true,
        "Node index outside the sentence", "Transition system bug or corrupted input"),
    ("E031", "Graph", Severity::High, false, true,
        "Token already has a head", "Transition legality check was bypassed"),
    ("E032", "Graph", Severity::High, false, true,
        "The artificial root cannot be a dependent", "Transition legality check was bypassed"),
    ("E040", "Transition", Severity::High, false, true,
        "Transition is not legal in the current configuration", "Check legality before applying"),
    ("E041", "Transition", Severity::Critical, false, true,
        "Configuration belongs to another algorithm family", "Internal wiring error"),
    ("E042", "Transition", Severity::High, false, true,
        "Decision code does not map to a transition", "The model and the algorithm do not match"),
    ("E043", "Transition", Severity::High, false, true,
        "Sentence exceeded its transition budget", "The transition system is not making progress"),
    ("E050", "Oracle", Severity::Medium, true, false,
        "Gold structure is outside the algorithm's structural class", "Choose a more expressive algorithm or filter the sentence"),
    ("E051", "Oracle", Severity::High, false, true,
        "Oracle derivation did not reproduce the gold structure", "Oracle bug or inconsistent gold annotation"),
    ("E060", "Guide", Severity::High, false, true,
        "Operation not available in the decision model's current mode", "Train before parsing, parse after training"),
    ("E061", "Guide", Severity::High, false, true,
        "Classifier training failed", "Inspect the training instances"),
    ("E062", "Guide", Severity::High, false, true,
        "Decision does not have the shape required by the decision settings", "The model and the decision settings do not match"),
    ("E063", "Guide", Severity::High, false, true,
        "Guide file could not be read or written", "Check the model directory"),
    ("W101", "Guide", Severity::Low, true, false,
        "Every k-best candidate was illegal, the default transition was used", "Increase k or retrain the model"),
    ("E070", "Features", Severity::High, false, true,
        "Feature function is not registered", "Check the feature specification"),
    ("E071", "Features", Severity::High, false, true,
        "Feature specification cannot be parsed", "Check parentheses and arguments"),
    ("E072", "Features", Severity::High, false, true,
        "Address function is not provided by the algorithm", "Use an address function of the configured family"),
    ("E080", "Corpus", Severity::High, false, true,
        "Corpus file could not be read or written", "Check the path and permissions"),
    ("E081", "Corpus", Severity::Medium, false, true,
        "Row does not have the expected number of columns", "Fix the input file"),
    ("E082", "Corpus", Severity::Medium, true, false,
        "Corpus contains no sentences", "Provide a non-empty input"),
    ("E090", "Engine", Severity::High, false, true,
        "A worker failed while parsing its slice", "Inspect the worker error; the batch was aborted"),
    ("E091", "Engine", Severity::Critical, false, true,
        "A worker thread panicked", "File a bug report with the failing input"),
    ("E092", "Engine", Severity::High, false, true,
        "Thread count must be at least one", "Fix the engine configuration"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        METADATA
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_constant_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            config::INVALID_OPTION,
            config::UNKNOWN_ALGORITHM,
            symbols::UNKNOWN_CODE,
            symbols::MALFORMED_TABLE,
            graph::MULTIPLE_HEADS,
            transition::ILLEGAL_TRANSITION,
            oracle::DIVERGENCE,
            guide::KBEST_EXHAUSTED,
            features::UNSUPPORTED_ADDRESS,
            corpus::MALFORMED_ROW,
            engine::THREAD_PANICKED,
        ];
        for code in declared {
            assert_ne!(get_description(code.as_str()), "Unknown error", "{}", code);
        }
    }

    #[test]
    fn classification_lookups() {
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E051"));
        assert!(!requires_halt("W101"));
        assert!(is_recoverable("E050"));
        assert_eq!(get_category("E031"), "Graph");
        assert_eq!(get_category("nope"), "Unknown");
    }
}
