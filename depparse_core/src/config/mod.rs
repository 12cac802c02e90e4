//! Configuration for the parser
//!
//! * [`constants`]: compile-time limits and model file names
//! * [`runtime`]: environment-driven preferences
//! * [`options`]: the TOML run configuration shared by training and parsing

pub mod constants;
pub mod error;
pub mod options;
pub mod runtime;

pub use error::{ConfigError, ConfigResult};
pub use options::{Algorithm, Connectedness, ParserOptions, RootHandling};
