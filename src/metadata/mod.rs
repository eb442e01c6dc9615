//! Metadata merging across the group hierarchy
//!
//! A node's metadata is built from layers: the metadata of each of its
//! groups (parents before subgroups) followed by the node's own metadata.
//! Each layer is merged into the result with [`merge_layer`]:
//!
//! - mapping into mapping: merged recursively
//! - list into list: appended
//! - anything else: replaced
//!
//! A value tagged `!atomic` in YAML is never merged, it always replaces
//! whatever the previous layers produced for its key.

pub mod processors;

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::Result;

pub use processors::ProcessorRegistry;

/// Merged metadata of a node
pub type Metadata = Map<String, Value>;

/// YAML tag that disables merging for a value
pub const ATOMIC_TAG: &str = "atomic";

/// Merge one layer of user-written metadata into `base`
pub fn merge_layer(base: &mut Metadata, update: &serde_yaml::Mapping) -> Result<()> {
    for (key, value) in update {
        let key = key_to_string(key)?;
        let (value, atomic) = unwrap_atomic(value);

        let merged = match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), YamlValue::Mapping(mapping)) if !atomic => {
                merge_layer(existing, mapping)?;
                true
            }
            (Some(Value::Array(existing)), YamlValue::Sequence(sequence)) if !atomic => {
                for entry in sequence {
                    existing.push(to_json(entry)?);
                }
                true
            }
            _ => false,
        };

        if !merged {
            base.insert(key, to_json(value)?);
        }
    }
    Ok(())
}

/// Merge all layers in order, later layers winning
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a serde_yaml::Mapping>) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for layer in layers {
        merge_layer(&mut metadata, layer)?;
    }
    Ok(metadata)
}

/// Strip an `!atomic` tag, reporting whether it was present
fn unwrap_atomic(value: &YamlValue) -> (&YamlValue, bool) {
    match value {
        YamlValue::Tagged(tagged) if is_atomic_tag(&tagged.tag) => (&tagged.value, true),
        _ => (value, false),
    }
}

fn is_atomic_tag(tag: &serde_yaml::value::Tag) -> bool {
    tag.to_string().trim_start_matches('!') == ATOMIC_TAG
}

fn key_to_string(key: &YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        other => Err(crate::error::metadata::invalid(format!(
            "unsupported metadata key: {other:?}"
        ))),
    }
}

/// Convert a YAML value to JSON, dropping atomic markers
pub fn to_json(value: &YamlValue) -> Result<Value> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => number_to_json(n)?,
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(sequence) => Value::Array(
            sequence
                .iter()
                .map(to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, entry) in mapping {
                map.insert(key_to_string(key)?, to_json(entry)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => {
            if !is_atomic_tag(&tagged.tag) {
                return Err(crate::error::metadata::invalid(format!(
                    "unsupported YAML tag in metadata: {}",
                    tagged.tag
                )));
            }
            to_json(&tagged.value)?
        }
    })
}

fn number_to_json(n: &serde_yaml::Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Number(i.into()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::Number(u.into()));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| {
            crate::error::metadata::invalid(format!("number cannot be represented in metadata: {n}"))
        })
}
