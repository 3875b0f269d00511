//! Read JSON inputs and validate them against schemas compiled into the binary

use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ConfigError;

/// Schemas for the JSON files the pipeline reads
#[derive(Debug, Clone, Copy)]
pub enum InputSchema {
    SampleSheet,
    ReferenceData,
}

impl InputSchema {
    fn source(&self) -> &'static str {
        static SAMPLE_SHEET: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/sample_sheet.json"));
        static REFDATA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/refdata.json"));
        match self {
            InputSchema::SampleSheet => SAMPLE_SHEET,
            InputSchema::ReferenceData => REFDATA,
        }
    }

    fn compile(&self) -> JSONSchema {
        // both schemas are fixed at compile time and covered by tests
        let schema: Value = serde_json::from_str(self.source()).expect("Valid embedded schema JSON");
        JSONSchema::compile(&schema).expect("Valid embedded schema")
    }
}

/// Read a JSON file, validate it, then deserialise into a typed struct
pub fn read_validated<T: DeserializeOwned>(path: &Path, schema: InputSchema) -> Result<T, ConfigError> {
    let json = read_untyped(path)?;
    validate(path, &json, schema)?;
    info!("Deserialising {} into typed object", path.display());
    serde_json::from_value::<T>(json).map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
}

/// Read a JSON file without a schema
pub fn read_plain<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let json = read_untyped(path)?;
    serde_json::from_value::<T>(json).map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
}

pub fn validate(path: &Path, json: &Value, schema: InputSchema) -> Result<(), ConfigError> {
    info!("Validating {} against {:?} schema", path.display(), schema);
    let compiled = schema.compile();
    let result = compiled.validate(json);
    if let Err(errors) = result {
        let errors: Vec<String> = errors.map(|e| format!("{} at {}", e, e.instance_path)).collect();
        warn!("{} fails validation", path.display());
        return Err(ConfigError::Schema { path: path.to_path_buf(), errors });
    }
    Ok(())
}

fn read_untyped(path: &Path) -> Result<Value, ConfigError> {
    info!("Reading {}", path.display());
    let json_string = fs::read_to_string(path).map_err(|source| {
        warn!("Can't read {}: {}", path.display(), source);
        ConfigError::Read { path: path.to_path_buf(), source }
    })?;
    serde_json::from_str::<Value>(&json_string).map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
}
