//! Configure the liquid biopsy analysis pipeline
//!
//! Reads a sample sheet and reference data, builds a job graph of external tool invocations and
//! exports it for a scheduler. Nothing here runs the tools.

/// Shell command templates
pub mod command;

pub mod error;

/// Write the job graph as JSON, a bash script or a SQLite database
pub mod export;

pub mod job;

/// The pipeline builder and its stages
pub mod pipeline;

/// Reference genome files and capture panel targets
pub mod refdata;

/// Outputs of configured jobs, looked up by downstream stages
pub mod registry;

/// Sample sheet entries and normal/cancer pairing
pub mod sample;

/// Embedded JSON schemas for the input files
pub mod schema;

/// One descriptor per wrapped tool
pub mod tools;
