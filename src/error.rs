//! @ai:module:intent Define error types for launch and generation failures
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for configuration, launch and generation
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {field}: \"{value}\" (expected {expected})")]
    InvalidOption {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid duration for {field}: \"{value}\" (expected <number>[ns|us|ms|s|m|h])")]
    InvalidDuration { field: &'static str, value: String },

    #[error("Classpath entry does not exist: {0}")]
    MissingClasspathEntry(PathBuf),

    #[error("Failed to spawn {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JMH exited with status code {code}")]
    HarnessExit { code: i32 },

    #[error("Malformed class file {path}: {reason}")]
    ClassFormat { path: PathBuf, reason: String },

    #[error("Failed to load class {name}: {reason}")]
    ClassLoad { name: String, reason: String },

    #[error("{}", render_generation_failure(.0))]
    Generation(Vec<String>),

    #[error("JMH version {version} is not supported by this plugin (requires {supported}); plugin and JMH versions are mismatched")]
    VersionMismatch {
        version: String,
        supported: &'static str,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// @ai:intent Render an aggregated generation report, one line per error
/// @ai:effects pure
fn render_generation_failure(errors: &[String]) -> String {
    let mut message = String::from("Generation of benchmark descriptors failed:\n");
    for error in errors {
        message.push_str("  - ");
        message.push_str(error);
        message.push('\n');
    }
    message.push_str(&format!("{} errors in total", errors.len()));
    message
}
