//! Dispatch: resolve each node's handler, compile children, emit source.
//!
//! Compilation is a pure function of the tree: no I/O, no shared mutable
//! state. The only shared input is the read-only [`HandlerRegistry`].

use super::command::{serialize_all, Segment};
use super::error::CompileError;
use super::registry::HandlerRegistry;
use super::types::{CompileOptions, CompiledTemplate, Node};
use tracing::{debug, info};

/// Accumulator variable the generated statements append to.
pub const OUTPUT_VAR: &str = "html";

/// Parameter name of the generated function; also the inherit marker.
pub const CONTEXT_VAR: &str = "context";

/// Compiles syntax trees against one handler registry.
#[derive(Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r HandlerRegistry,
}

impl Compiler<'static> {
    /// A compiler over the process-wide standard registry.
    pub fn standard() -> Self {
        Self::new(HandlerRegistry::standard())
    }
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r HandlerRegistry {
        self.registry
    }

    /// Compile one node (and, through its handler, its descendants).
    pub fn compile(&self, node: &Node) -> Result<Segment, CompileError> {
        let handler = self
            .registry
            .get(&node.node_type)
            .ok_or_else(|| CompileError::unknown_node_type(&node.node_type))?;
        debug!(node_type = %node.node_type, "dispatch");

        let commands = handler.compile(node, self)?;
        Ok(Segment::new(serialize_all(&commands)?))
    }

    /// Compile a child reached through `name`, recording the name in error paths.
    pub fn compile_named(&self, name: &str, child: &Node) -> Result<Segment, CompileError> {
        self.compile(child).map_err(|e| e.within(name))
    }

    /// Compile the named child if present.
    pub fn compile_child(&self, node: &Node, name: &str) -> Result<Option<Segment>, CompileError> {
        node.child(name)
            .map(|child| self.compile_named(name, child))
            .transpose()
    }

    /// Compile the named child, or fall back to `default` when it is absent.
    pub fn compile_child_or(
        &self,
        node: &Node,
        name: &str,
        default: &str,
    ) -> Result<Segment, CompileError> {
        Ok(self
            .compile_child(node, name)?
            .unwrap_or_else(|| Segment::new(default)))
    }

    /// Compile a child the node cannot do without.
    pub fn require_child(&self, node: &Node, name: &str) -> Result<Segment, CompileError> {
        self.compile_child(node, name)?
            .ok_or_else(|| CompileError::missing_child(&node.node_type, name))
    }

    /// Compile a whole template tree into a render function.
    pub fn compile_template(
        &self,
        name: &str,
        root: &Node,
        options: &CompileOptions,
    ) -> Result<CompiledTemplate, CompileError> {
        let body = self.compile(root)?;
        let source = if options.wrap {
            wrap_function(body.as_str(), options)
        } else {
            body.into_string()
        };
        let fingerprint = format!("blake3:{}", blake3::hash(source.as_bytes()).to_hex());
        info!(template = name, bytes = source.len(), %fingerprint, "compiled");

        Ok(CompiledTemplate {
            name: name.to_string(),
            source,
            fingerprint,
        })
    }
}

/// Wrap compiled statements in a function over `context`.
fn wrap_function(body: &str, options: &CompileOptions) -> String {
    let pad = " ".repeat(options.indent);
    let mut lines = vec![format!("{}var {} = \"\";", pad, OUTPUT_VAR)];
    lines.extend(body.lines().map(|line| {
        if line.is_empty() {
            String::new()
        } else {
            format!("{}{}", pad, line)
        }
    }));
    lines.push(format!("{}return {};", pad, OUTPUT_VAR));

    let head = format!("function ({}) {{", CONTEXT_VAR);
    match options.export {
        Some(ref export) => format!("var {} = {}\n{}\n}};", export, head, lines.join("\n")),
        None => format!("{}\n{}\n}}", head, lines.join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::{Arg, Command};
    use crate::core::types::Attribute;

    fn text(s: &str) -> Node {
        Node::new("text").with_attr("data", s)
    }

    fn constant(s: &str) -> Node {
        Node::new("constant").with_attr("value", s)
    }

    #[test]
    fn test_compile_dispatches_by_type() {
        let seg = Compiler::standard().compile(&text("hi")).unwrap();
        assert_eq!(seg.as_str(), "html += \"hi\";");
    }

    #[test]
    fn test_unknown_node_type_fails() {
        let err = Compiler::standard().compile(&Node::new("for")).unwrap_err();
        assert!(matches!(err, CompileError::UnknownStructure { .. }));
        assert_eq!(err.path().to_string(), "/");
    }

    #[test]
    fn test_unknown_descendant_fails_whole_compile() {
        let tree = Node::new("body")
            .with_child("0", text("before"))
            .with_child("1", Node::new("if"))
            .with_child("2", text("after"));
        let err = Compiler::standard()
            .compile_template("page", &tree, &CompileOptions::default())
            .unwrap_err();
        assert_eq!(err.path().to_string(), "/1");
        assert!(err.to_string().contains("'if'"));
    }

    #[test]
    fn test_compile_child_absent_is_none() {
        let node = Node::new("include");
        let compiler = Compiler::standard();
        assert_eq!(compiler.compile_child(&node, "variables").unwrap(), None);
        assert_eq!(
            compiler.compile_child_or(&node, "variables", "[]").unwrap().as_str(),
            "[]"
        );
    }

    #[test]
    fn test_compile_child_present() {
        let node = Node::new("print").with_child("expr", constant("x"));
        let seg = Compiler::standard().compile_child(&node, "expr").unwrap();
        assert_eq!(seg.unwrap().as_str(), "\"x\"");
    }

    #[test]
    fn test_require_child_missing() {
        let node = Node::new("print");
        let err = Compiler::standard().require_child(&node, "expr").unwrap_err();
        assert!(matches!(err, CompileError::UnknownStructure { .. }));
        assert!(err.to_string().contains("'print' node has no 'expr' child"));
    }

    #[test]
    fn test_error_path_through_nesting() {
        let tree = Node::new("body").with_child(
            "0",
            Node::new("include")
                .with_child("expr", constant("a.tpl"))
                .with_child(
                    "variables",
                    Node::new("hash")
                        .with_child("0", Node::new("filter"))
                        .with_child("1", constant("v")),
                ),
        );
        let err = Compiler::standard().compile(&tree).unwrap_err();
        assert_eq!(err.path().to_string(), "/0/variables/0");
    }

    #[test]
    fn test_custom_registry_handler() {
        fn shout(node: &Node, _: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
            let word = node.attr("word").and_then(Attribute::as_str).unwrap_or("");
            Ok(vec![Command::new(
                "html += %s;",
                vec![Arg::string(&word.to_uppercase())],
            )])
        }
        let registry = HandlerRegistry::empty().with("shout", shout);
        let seg = Compiler::new(&registry)
            .compile(&Node::new("shout").with_attr("word", "hey"))
            .unwrap();
        assert_eq!(seg.as_str(), "html += \"HEY\";");
    }

    #[test]
    fn test_malformed_command_surfaces() {
        fn broken(_: &Node, _: &Compiler<'_>) -> Result<Vec<Command>, CompileError> {
            Ok(vec![Command::new("f(%s, %s);", vec![])])
        }
        let registry = HandlerRegistry::empty().with("broken", broken);
        let err = Compiler::new(&registry)
            .compile(&Node::new("broken"))
            .unwrap_err();
        assert!(matches!(err, CompileError::MalformedCommand { expected: 2, found: 0, .. }));
    }

    #[test]
    fn test_compile_template_wraps_function() {
        let tree = Node::new("body")
            .with_child("0", text("a"))
            .with_child("1", text("b"));
        let out = Compiler::standard()
            .compile_template("page", &tree, &CompileOptions::default())
            .unwrap();
        assert_eq!(
            out.source,
            "function (context) {\n    var html = \"\";\n    html += \"a\";\n    html += \"b\";\n    return html;\n}"
        );
        assert!(out.fingerprint.starts_with("blake3:"));
        assert_eq!(out.name, "page");
    }

    #[test]
    fn test_compile_template_export_and_indent() {
        let opts = CompileOptions {
            wrap: true,
            indent: 2,
            export: Some("tpl_page".to_string()),
        };
        let out = Compiler::standard()
            .compile_template("page", &text("a"), &opts)
            .unwrap();
        assert_eq!(
            out.source,
            "var tpl_page = function (context) {\n  var html = \"\";\n  html += \"a\";\n  return html;\n};"
        );
    }

    #[test]
    fn test_compile_template_unwrapped() {
        let opts = CompileOptions {
            wrap: false,
            ..CompileOptions::default()
        };
        let out = Compiler::standard()
            .compile_template("page", &text("a"), &opts)
            .unwrap();
        assert_eq!(out.source, "html += \"a\";");
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let opts = CompileOptions::default();
        let a = Compiler::standard().compile_template("a", &text("x"), &opts).unwrap();
        let b = Compiler::standard().compile_template("b", &text("x"), &opts).unwrap();
        let c = Compiler::standard().compile_template("c", &text("y"), &opts).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_concurrent_compiles_share_registry() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let label = format!("t{}", i);
                    Compiler::standard().compile(&text(&label)).unwrap().into_string()
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), format!("html += \"t{}\";", i));
        }
    }
}
