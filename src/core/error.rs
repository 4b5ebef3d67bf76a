//! Compile-time and render-time errors.
//!
//! Compile errors are fatal for the whole compilation: no partial output
//! is returned. Each carries the path of child names from the root down to
//! the node that failed, filled in while the error unwinds.

use std::fmt;
use thiserror::Error;

/// Path from the root node to a descendant, as child names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Compilation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No handler for a node type, or a required child is absent.
    #[error("unknown structure at {path}: {detail}")]
    UnknownStructure { path: NodePath, detail: String },

    /// The handler knows the node type but not this attribute/child combination.
    #[error("not implemented at {path}: {node_type} {detail}")]
    NotImplemented {
        path: NodePath,
        node_type: String,
        detail: String,
    },

    /// A handler produced a command whose placeholders don't match its arguments.
    #[error("malformed command at {path}: format {format:?} has {expected} placeholder(s), got {found} argument(s)")]
    MalformedCommand {
        path: NodePath,
        format: String,
        expected: usize,
        found: usize,
    },
}

impl CompileError {
    pub fn unknown_node_type(node_type: &str) -> Self {
        Self::UnknownStructure {
            path: NodePath::default(),
            detail: format!("no handler for node type '{}'", node_type),
        }
    }

    pub fn missing_child(node_type: &str, child: &str) -> Self {
        Self::UnknownStructure {
            path: NodePath::default(),
            detail: format!("'{}' node has no '{}' child", node_type, child),
        }
    }

    pub fn not_implemented(node_type: &str, detail: impl Into<String>) -> Self {
        Self::NotImplemented {
            path: NodePath::default(),
            node_type: node_type.to_string(),
            detail: detail.into(),
        }
    }

    /// Prefix the error path with the child name it surfaced through.
    pub fn within(mut self, child: &str) -> Self {
        self.path_mut().0.insert(0, child.to_string());
        self
    }

    pub fn path(&self) -> &NodePath {
        match self {
            Self::UnknownStructure { path, .. }
            | Self::NotImplemented { path, .. }
            | Self::MalformedCommand { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut NodePath {
        match self {
            Self::UnknownStructure { path, .. }
            | Self::NotImplemented { path, .. }
            | Self::MalformedCommand { path, .. } => path,
        }
    }
}

/// Render failure raised by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The reference could not be resolved to a template function.
    #[error("template not found: {reference}")]
    MissingTemplate { reference: String },

    /// A resolved template failed while producing output.
    #[error("error rendering {reference}: {message}")]
    Execution { reference: String, message: String },
}
