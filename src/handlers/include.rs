//! Include handler: splice another template's output at this point.
//!
//! Emits exactly one statement:
//!
//! ```text
//! html += render(<target>, <data>, <context>, <ignore_missing>);
//! ```
//!
//! - target: compiled `expr` child (required)
//! - data: compiled `variables` child, or `[]` when absent
//! - context: `undefined` when `only` is set, otherwise `context`
//! - ignore_missing: `1` when `ignore_missing` is set, otherwise `0`

use super::Handler;
use crate::core::command::{Arg, Command};
use crate::core::compiler::{Compiler, CONTEXT_VAR};
use crate::core::error::CompileError;
use crate::core::types::Node;

pub const RENDER_FORMAT: &str = "html += render(%s, %s, %s, %s);";

/// Data argument when the include passes no explicit variables.
pub const EMPTY_MAPPING: &str = "[]";

/// Context argument for `only`: no ambient scope is forwarded.
pub const ISOLATED_CONTEXT: &str = "undefined";

/// Context argument otherwise: the caller's whole scope is forwarded.
pub const INHERITED_CONTEXT: &str = CONTEXT_VAR;

pub struct IncludeHandler;

impl Handler for IncludeHandler {
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        Ok(vec![Command::new(
            RENDER_FORMAT,
            vec![
                Arg::Segment(compiler.require_child(node, "expr")?),
                include_data(node, compiler)?,
                Arg::literal(include_context(node)),
                Arg::literal(ignore_missing_flag(node)),
            ],
        )])
    }
}

fn include_data(node: &Node, compiler: &Compiler<'_>) -> Result<Arg, CompileError> {
    Ok(match compiler.compile_child(node, "variables")? {
        Some(segment) => Arg::Segment(segment),
        None => Arg::literal(EMPTY_MAPPING),
    })
}

fn include_context(node: &Node) -> &'static str {
    if node.flag("only") {
        ISOLATED_CONTEXT
    } else {
        INHERITED_CONTEXT
    }
}

fn ignore_missing_flag(node: &Node) -> &'static str {
    if node.flag("ignore_missing") {
        "1"
    } else {
        "0"
    }
}
