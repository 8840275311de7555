use std::fs;
use std::path::{Path, PathBuf};

use runm_core::errors::{ErrorInfo, RunmError};
use serde::de::{
    DeserializeOwned, DeserializeSeed, Deserializer, Error as _, IgnoredAny, MapAccess, SeqAccess,
    Visitor,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> RunmError {
    RunmError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Drops `//` line comments that sit outside of string literals.
pub fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let mut in_string = false;
        let mut escaped = false;
        let mut cut = line.len();
        let bytes = line.as_bytes();
        for (pos, &byte) in bytes.iter().enumerate() {
            if in_string {
                match byte {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
            } else if byte == b'"' {
                in_string = true;
            } else if byte == b'/' && bytes.get(pos + 1) == Some(&b'/') {
                cut = pos;
                break;
            }
        }
        out.push_str(&line[..cut]);
    }
    out
}

/// Parses JSON text that may carry `//` comments.
pub fn from_commented_json_str<T: DeserializeOwned>(text: &str) -> Result<T, RunmError> {
    serde_json::from_str(&strip_line_comments(text))
        .map_err(|err| serde_error("json_deserialize", err))
}

/// Deserializes a YAML payload into the requested type.
///
/// Floating point scalars keep the digits they were written with (`0.50`
/// stays `0.50`), the same as the JSON path with `arbitrary_precision`.
pub fn from_yaml_str<T: DeserializeOwned>(text: &str) -> Result<T, RunmError> {
    let yaml_error = |err: serde_yaml::Error| serde_error("yaml_deserialize", err);
    let shape: serde_yaml::Value = serde_yaml::from_str(text).map_err(yaml_error)?;
    let exact = ExactYaml(&shape)
        .deserialize(serde_yaml::Deserializer::from_str(text))
        .map_err(yaml_error)?;
    serde_json::from_value(exact).map_err(|err| serde_error("yaml_deserialize", err))
}

/// Re-reads a YAML document whose shape is already known, taking float
/// scalars as raw text instead of going through `f64`.
struct ExactYaml<'a>(&'a serde_yaml::Value);

impl<'de, 'a> DeserializeSeed<'de> for ExactYaml<'a> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        match self.0 {
            serde_yaml::Value::Mapping(mapping) => {
                deserializer.deserialize_map(ExactMapping(mapping))
            }
            serde_yaml::Value::Sequence(items) => {
                deserializer.deserialize_seq(ExactSequence(items))
            }
            serde_yaml::Value::Number(number) if number.is_f64() => {
                let text = deserializer.deserialize_str(ScalarText)?;
                match serde_json::from_str::<Value>(&text) {
                    Ok(Value::Number(exact)) => Ok(Value::Number(exact)),
                    // `.inf`, `.nan`, `+1.5` and friends are not JSON numbers.
                    _ => serde_json::to_value(number).map_err(D::Error::custom),
                }
            }
            other => {
                IgnoredAny::deserialize(deserializer)?;
                serde_json::to_value(other).map_err(D::Error::custom)
            }
        }
    }
}

struct ExactMapping<'a>(&'a serde_yaml::Mapping);

impl<'de, 'a> Visitor<'de> for ExactMapping<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut object = Map::new();
        let mut shapes = self.0.values();
        while let Some(key) = access.next_key::<String>()? {
            let shape = shapes
                .next()
                .ok_or_else(|| A::Error::custom("mapping changed between passes"))?;
            object.insert(key, access.next_value_seed(ExactYaml(shape))?);
        }
        Ok(Value::Object(object))
    }
}

struct ExactSequence<'a>(&'a [serde_yaml::Value]);

impl<'de, 'a> Visitor<'de> for ExactSequence<'a> {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(self.0.len());
        for shape in self.0 {
            match access.next_element_seed(ExactYaml(shape))? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(Value::Array(items))
    }
}

struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<String, E> {
        Ok(text.to_string())
    }
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, RunmError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Writes pretty JSON (2-space indent, trailing newline) through a sibling
/// temp file so readers never observe a half-written document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), RunmError> {
    let mut text =
        serde_json::to_string_pretty(value).map_err(|err| serde_error("json_serialize", err))?;
    text.push('\n');
    let mut tmp = path.as_os_str().to_owned();
    tmp.push("~");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text).map_err(|err| RunmError::io("json_write", &tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| RunmError::io("json_rename", path, err))
}
