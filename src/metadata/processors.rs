//! Metadata processors
//!
//! Groups reference processors by name in `metadata_processors`. After a
//! node's metadata has been merged, every processor referenced by any of its
//! groups is called once with the node name, the node's group names and the
//! current metadata, and returns the metadata to continue with.
//!
//! References resolve to built-in processors or, with the `exec:` prefix, to
//! a local command that exchanges JSON over stdin/stdout.

use std::collections::{BTreeMap, HashSet};
use std::process::{Command, Stdio};
use std::sync::Arc;

use serde_json::{Value, json};

use super::Metadata;
use crate::error::{BwError, Result};
use crate::node::runner::communicate;

/// Prefix for processors implemented by a local command
pub const EXEC_PREFIX: &str = "exec:";

/// Post-processes merged metadata of a node
pub trait MetadataProcessor: Send + Sync {
    /// Return the modified metadata
    fn process(&self, node_name: &str, groups: &[String], metadata: Metadata) -> Result<Metadata>;
}

impl<F> MetadataProcessor for F
where
    F: Fn(&str, &[String], Metadata) -> Result<Metadata> + Send + Sync,
{
    fn process(&self, node_name: &str, groups: &[String], metadata: Metadata) -> Result<Metadata> {
        self(node_name, groups, metadata)
    }
}

/// Sets `node_name` to the node's name
fn node_name(node_name: &str, _groups: &[String], mut metadata: Metadata) -> Result<Metadata> {
    metadata.insert("node_name".to_string(), Value::String(node_name.to_string()));
    Ok(metadata)
}

/// Sets `groups` to the sorted names of the node's groups
fn group_names(_node_name: &str, groups: &[String], mut metadata: Metadata) -> Result<Metadata> {
    let mut names = groups.to_vec();
    names.sort();
    metadata.insert("groups".to_string(), json!(names));
    Ok(metadata)
}

/// Removes repeated entries from every list, keeping the first occurrence
fn dedup_lists(_node_name: &str, _groups: &[String], metadata: Metadata) -> Result<Metadata> {
    Ok(metadata
        .into_iter()
        .map(|(key, value)| (key, dedup_value(value)))
        .collect())
}

fn dedup_value(value: Value) -> Value {
    match value {
        Value::Array(entries) => {
            let mut unique: Vec<Value> = Vec::with_capacity(entries.len());
            for entry in entries.into_iter().map(dedup_value) {
                if !unique.contains(&entry) {
                    unique.push(entry);
                }
            }
            Value::Array(unique)
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, dedup_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Processor backed by a local shell command
///
/// The command receives `{"node_name", "groups", "metadata"}` as JSON on
/// stdin and must print the new metadata as a JSON object.
#[derive(Debug, Clone)]
pub struct ExecProcessor {
    command: String,
}

impl ExecProcessor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn reference(&self) -> String {
        format!("{EXEC_PREFIX}{}", self.command)
    }
}

impl MetadataProcessor for ExecProcessor {
    fn process(&self, node_name: &str, groups: &[String], metadata: Metadata) -> Result<Metadata> {
        let failed = |reason: String| {
            crate::error::metadata::processor_failed(self.reference(), node_name, reason)
        };

        let input = serde_json::to_vec(&json!({
            "node_name": node_name,
            "groups": groups,
            "metadata": metadata,
        }))?;

        tracing::debug!(node = node_name, command = %self.command, "running metadata processor");
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        let output = communicate(child, Some(&input)).map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(failed("output is not a JSON object".to_string())),
            Err(e) => Err(failed(format!("invalid JSON output: {e}"))),
        }
    }
}

/// Resolves processor references to implementations
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: BTreeMap<String, Arc<dyn MetadataProcessor>>,
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.processors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ProcessorRegistry {
    /// Registry without any processors
    pub fn empty() -> Self {
        Self {
            processors: BTreeMap::new(),
        }
    }

    /// Registry with the built-in processors
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("node_name", node_name);
        registry.register("group_names", group_names);
        registry.register("dedup_lists", dedup_lists);
        registry
    }

    /// Register a processor under a name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, processor: impl MetadataProcessor + 'static) {
        self.processors.insert(name.into(), Arc::new(processor));
    }

    /// Look up a processor reference
    pub fn resolve(&self, reference: &str) -> Result<Arc<dyn MetadataProcessor>> {
        if let Some(command) = reference.strip_prefix(EXEC_PREFIX) {
            if command.trim().is_empty() {
                return Err(BwError::UnknownMetadataProcessor {
                    name: reference.to_string(),
                });
            }
            return Ok(Arc::new(ExecProcessor::new(command)));
        }

        self.processors
            .get(reference)
            .cloned()
            .ok_or_else(|| BwError::UnknownMetadataProcessor {
                name: reference.to_string(),
            })
    }

    /// Run the referenced processors in order, each reference at most once
    pub fn run_all<'a>(
        &self,
        references: impl IntoIterator<Item = &'a str>,
        node_name: &str,
        groups: &[String],
        mut metadata: Metadata,
    ) -> Result<Metadata> {
        let mut seen = HashSet::new();
        for reference in references {
            if !seen.insert(reference) {
                continue;
            }
            let processor = self.resolve(reference)?;
            tracing::debug!(node = node_name, processor = reference, "applying metadata processor");
            metadata = processor.process(node_name, groups, metadata)?;
        }
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<String> {
        vec!["web".to_string(), "all".to_string()]
    }

    #[test]
    fn test_node_name() {
        let registry = ProcessorRegistry::with_builtins();
        let result = registry
            .run_all(["node_name"], "node1", &groups(), Metadata::new())
            .unwrap();
        assert_eq!(result["node_name"], json!("node1"));
    }

    #[test]
    fn test_group_names_sorted() {
        let registry = ProcessorRegistry::with_builtins();
        let result = registry
            .run_all(["group_names"], "node1", &groups(), Metadata::new())
            .unwrap();
        assert_eq!(result["groups"], json!(["all", "web"]));
    }

    #[test]
    fn test_dedup_lists_recursive() {
        let mut metadata = Metadata::new();
        metadata.insert("dns".to_string(), json!(["a", "b", "a"]));
        metadata.insert("nested".to_string(), json!({"x": [1, 1, 2]}));

        let registry = ProcessorRegistry::with_builtins();
        let result = registry
            .run_all(["dedup_lists"], "node1", &groups(), metadata)
            .unwrap();
        assert_eq!(result["dns"], json!(["a", "b"]));
        assert_eq!(result["nested"], json!({"x": [1, 2]}));
    }

    #[test]
    fn test_unknown_processor() {
        let registry = ProcessorRegistry::with_builtins();
        let err = registry
            .run_all(["does_not_exist"], "node1", &groups(), Metadata::new())
            .unwrap_err();
        assert!(matches!(err, BwError::UnknownMetadataProcessor { .. }));
    }

    #[test]
    fn test_empty_exec_reference_rejected() {
        let registry = ProcessorRegistry::with_builtins();
        assert!(registry.resolve("exec:  ").is_err());
    }

    #[test]
    fn test_custom_processor_runs_once() {
        let mut registry = ProcessorRegistry::empty();
        registry.register(
            "count",
            |_: &str, _: &[String], mut metadata: Metadata| -> Result<Metadata> {
                let count = metadata.get("count").and_then(Value::as_u64).unwrap_or(0);
                metadata.insert("count".to_string(), json!(count + 1));
                Ok(metadata)
            },
        );
        let result = registry
            .run_all(["count", "count"], "node1", &groups(), Metadata::new())
            .unwrap();
        assert_eq!(result["count"], json!(1));
    }

    #[test]
    fn test_processors_run_in_order() {
        let registry = ProcessorRegistry::with_builtins();
        let mut metadata = Metadata::new();
        metadata.insert("groups".to_string(), json!(["x", "x"]));
        let result = registry
            .run_all(["dedup_lists", "group_names"], "node1", &groups(), metadata)
            .unwrap();
        assert_eq!(result["groups"], json!(["all", "web"]));
    }

    #[test]
    fn test_exec_processor_output_replaces_metadata() {
        let registry = ProcessorRegistry::with_builtins();
        let mut metadata = Metadata::new();
        metadata.insert("old".to_string(), json!(true));
        let result = registry
            .run_all([r#"exec:printf '{"new": 1}'"#], "node1", &groups(), metadata)
            .unwrap();
        assert_eq!(Value::Object(result), json!({"new": 1}));
    }

    #[test]
    fn test_exec_processor_receives_input() {
        let registry = ProcessorRegistry::with_builtins();
        let result = registry
            .run_all(
                [r#"exec:sed 's/.*"node_name":"\([^"]*\)".*/{"seen": "\1"}/'"#],
                "node7",
                &groups(),
                Metadata::new(),
            )
            .unwrap();
        assert_eq!(result["seen"], json!("node7"));
    }

    #[test]
    fn test_exec_processor_large_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("blob".to_string(), json!("x".repeat(1024 * 1024)));
        let registry = ProcessorRegistry::with_builtins();
        // cat echoes the whole request back, nesting the metadata one level down
        let result = registry
            .run_all(["exec:cat"], "node1", &groups(), metadata)
            .unwrap();
        assert_eq!(result["node_name"], json!("node1"));
        assert_eq!(result["metadata"]["blob"].as_str().map(str::len), Some(1024 * 1024));
    }

    #[test]
    fn test_exec_processor_failure() {
        let registry = ProcessorRegistry::with_builtins();
        let err = registry
            .run_all(["exec:exit 3"], "node1", &groups(), Metadata::new())
            .unwrap_err();
        assert!(matches!(err, BwError::MetadataProcessorFailed { .. }));
        assert!(err.to_string().contains("exit code 3"));
    }

    #[test]
    fn test_exec_processor_invalid_output() {
        let registry = ProcessorRegistry::with_builtins();
        let err = registry
            .run_all(["exec:echo '[1, 2]'"], "node1", &groups(), Metadata::new())
            .unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }
}
