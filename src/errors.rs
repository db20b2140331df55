//! Error kinds for the schema pipeline.
//!
//! One enum per stage: read, infer, write, validate. Every variant is fatal
//! to the run; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the NDJSON log sample.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unable to open log sample {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the JSON sample on line {line} failed to be loaded, is the JSON valid? ({source})")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("the JSON sample on line {line} is not an object")]
    NotAnObject { line: usize },

    #[error("the JSON log sample must be one blob per log line (must not be pretty printed)")]
    PrettyPrinted,

    #[error("no log records found in {path}")]
    EmptySample { path: PathBuf },
}

/// Failures while deriving the schema draft from the sample.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("unable to find eventTimeField {field} in any sample record")]
    EventTimeFieldMissing { field: String },

    #[error("unable to find indicator field(s) {fields:?}")]
    IndicatorFieldMissing { fields: Vec<String> },

    #[error("the log sample contains no records")]
    NoRecords,
}

/// Failures while rendering or writing the schema/test documents.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to render {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while running the external pantherlog binary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unable to find pantherlog binary located at {path}")]
    BinaryMissing { path: PathBuf },

    #[error("failed to launch pantherlog: {source}")]
    Launch {
        #[source]
        source: std::io::Error,
    },

    #[error("pantherlog test failed. Exception from pantherlog:\n\n{output}")]
    Failed { output: String },
}
