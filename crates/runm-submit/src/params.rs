use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;
use runm_core::errors::{ErrorInfo, RunmError};
use runm_sweep::ParameterAssignment;
use serde_json::{Map, Value};

use crate::config::{Config, ParametersFormat};
use crate::serde::write_json_atomic;

/// Flat parameter dictionary written for one run.
pub type ParameterDict = IndexMap<String, Value>;

/// Merges constants, run number, seed, and the sweep assignment in that
/// priority order; later entries overwrite earlier ones.
pub fn merged_parameters(
    config: &Config,
    assignment: &ParameterAssignment,
    run_number: &str,
    seed: &str,
) -> ParameterDict {
    let mut params = config.constants.clone();
    params.insert(
        config.run_number_parameter_name.clone(),
        Value::String(run_number.to_string()),
    );
    params.insert(
        config.random_seed_parameter_name.clone(),
        Value::String(seed.to_string()),
    );
    for (name, value) in assignment {
        params.insert(name.clone(), Value::String(value.clone()));
    }
    params
}

/// Text form of a parameter value for flat formats and argument lists.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Nests dot-segmented keys (`a.b` becomes `{"a": {"b": ..}}`), keeping
/// first-seen order at every level.
pub fn hierarchical(params: &ParameterDict) -> Result<Map<String, Value>, RunmError> {
    let conflict = |key: &str| {
        RunmError::Config(
            ErrorInfo::new("parameter_key_conflict", "parameter is both a value and a group")
                .with_parameter(key),
        )
    };
    let mut root = Map::new();
    for (key, value) in params {
        let segments: Vec<&str> = key.split('.').collect();
        let (leaf, groups) = segments.split_last().ok_or_else(|| conflict(key))?;
        let mut node = &mut root;
        for segment in groups {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match entry {
                Value::Object(inner) => inner,
                _ => return Err(conflict(key)),
            };
        }
        if matches!(node.get(*leaf), Some(Value::Object(_))) {
            return Err(conflict(key));
        }
        node.insert(leaf.to_string(), value.clone());
    }
    Ok(root)
}

/// Writes `params` to `path` in `format`.
pub fn write_parameters(
    path: &Path,
    format: ParametersFormat,
    params: &ParameterDict,
) -> Result<(), RunmError> {
    match format {
        ParametersFormat::Json => write_json_atomic(path, &hierarchical(params)?),
        ParametersFormat::Csv => write_rows(path, b',', params),
        ParametersFormat::Tsv => write_rows(path, b'\t', params),
    }
}

fn write_rows(path: &Path, delimiter: u8, params: &ParameterDict) -> Result<(), RunmError> {
    let file = File::create(path).map_err(|err| RunmError::io("params_create", path, err))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(BufWriter::new(file));
    for (key, value) in params {
        writer
            .write_record([key.as_str(), value_text(value).as_str()])
            .map_err(|err| RunmError::io("params_write", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| RunmError::io("params_flush", path, err))
}
