//! Print handler: append an expression's value to the output.

use super::Handler;
use crate::core::command::{Arg, Command};
use crate::core::compiler::Compiler;
use crate::core::error::CompileError;
use crate::core::types::Node;

pub struct PrintHandler;

impl Handler for PrintHandler {
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let expr = compiler.require_child(node, "expr")?;
        Ok(vec![Command::new("html += %s;", vec![Arg::Segment(expr)])])
    }
}
