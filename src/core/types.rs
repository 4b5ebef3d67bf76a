//! Syntax tree, compile options, and compiled output types.
//!
//! The syntax tree is produced by an external template front end and handed
//! to the compiler as a YAML/JSON document. All types derive Serialize/Deserialize
//! so trees and options can be round-tripped through files.

use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// Syntax tree
// ============================================================================

/// One node of a parsed template. Read-only to the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Node {
    /// Node type tag, resolved through the handler registry
    #[serde(rename = "type")]
    pub node_type: String,

    /// Named child nodes (document order)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Node>,

    /// Named scalar attributes (document order)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Attribute>,
}

impl Node {
    /// A node with no children and no attributes.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            children: IndexMap::new(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder: add a named child.
    pub fn with_child(mut self, name: impl Into<String>, child: Node) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    /// Builder: add a named attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Read a boolean flag attribute. Absent means false.
    pub fn flag(&self, name: &str) -> bool {
        self.attr(name).is_some_and(Attribute::is_truthy)
    }

    /// Visit this node and every descendant, depth-first, with its path.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&[&'a str], &'a Node)) {
        fn go<'a>(
            node: &'a Node,
            path: &mut Vec<&'a str>,
            f: &mut impl FnMut(&[&'a str], &'a Node),
        ) {
            f(path, node);
            for (name, child) in &node.children {
                path.push(name);
                go(child, path, f);
                path.pop();
            }
        }
        go(self, &mut Vec::new(), f);
    }
}

/// Scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Attribute {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Attribute {
    /// Template-language truthiness: null, false, 0, 0.0, "" and "0" are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Str(s) => !s.is_empty() && s != "0",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }
}

impl From<bool> for Attribute {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Attribute {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Attribute {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

// ============================================================================
// Options and output
// ============================================================================

/// Compile options, usually loaded from `tmplc.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Wrap statements in a render function
    pub wrap: bool,

    /// Spaces per indentation level inside the function body
    pub indent: usize,

    /// Assign the function to this variable name
    pub export: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            wrap: true,
            indent: 4,
            export: None,
        }
    }
}

/// Words that cannot name a variable in generated code.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap_or_else(|e| unreachable!("{}", e))
    })
}

/// True when `name` can be used verbatim as a variable name in generated code.
pub fn is_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name) && !RESERVED_WORDS.contains(&name)
}

impl CompileOptions {
    /// Check option values that end up verbatim in generated source.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.export {
            if !is_identifier(name) {
                return Err(format!("export name {:?} is not a valid identifier", name));
            }
        }
        Ok(())
    }
}

/// Result of compiling one template tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledTemplate {
    /// Template name (usually the tree file stem)
    pub name: String,

    /// Generated target-language source
    pub source: String,

    /// BLAKE3 of `source`, formatted as `blake3:{hex}`
    pub fingerprint: String,
}
