//! Syntax-tree documents and compile options from disk.
//!
//! Trees are YAML (or JSON, which YAML accepts). Validation walks the
//! whole tree and reports every node type the registry cannot compile,
//! so a template author sees all problems at once instead of the first.

use super::registry::HandlerRegistry;
use super::types::{CompileOptions, Node};
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Parse a tree document from disk.
pub fn parse_tree_file(path: &Path) -> Result<Node, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_tree(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parse a tree document from a string.
pub fn parse_tree(yaml: &str) -> Result<Node, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("tree parse error: {}", e))
}

/// Load compile options from a TOML file.
pub fn load_options(path: &Path) -> Result<CompileOptions, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let options: CompileOptions = toml::from_str(&content)
        .map_err(|e| format!("invalid options {}: {}", path.display(), e))?;
    options
        .validate()
        .map_err(|e| format!("invalid options {}: {}", path.display(), e))?;
    Ok(options)
}

/// Report every node whose type has no handler. Empty = compilable.
pub fn validate_tree(root: &Node, registry: &HandlerRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    root.walk(&mut |path, node| {
        if !registry.contains(&node.node_type) {
            errors.push(ValidationError {
                path: format!("/{}", path.join("/")),
                message: format!("no handler for node type '{}'", node.node_type),
            });
        }
    });
    errors
}
