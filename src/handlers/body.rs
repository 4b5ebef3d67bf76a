//! Body handler: a sequence of child nodes, emitted in document order.

use super::Handler;
use crate::core::command::Command;
use crate::core::compiler::Compiler;
use crate::core::error::CompileError;
use crate::core::types::Node;

pub struct BodyHandler;

impl Handler for BodyHandler {
    fn compile(&self, node: &Node, compiler: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
        let mut commands = Vec::with_capacity(node.children.len());
        for (name, child) in &node.children {
            let segment = compiler.compile_named(name, child)?;
            // Nested empty bodies contribute no line
            if !segment.is_empty() {
                commands.push(Command::verbatim(segment));
            }
        }
        Ok(commands)
    }
}
