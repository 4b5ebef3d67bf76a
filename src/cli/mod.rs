//! CLI subcommands: compile, validate, handlers, schema, init.

use crate::core::compiler::Compiler;
use crate::core::registry::HandlerRegistry;
use crate::core::types::{CompileOptions, CompiledTemplate, Node};
use crate::core::parser;
use clap::Subcommand;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const OPTIONS_FILE: &str = "tmplc.toml";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile syntax-tree documents to render functions
    Compile {
        /// Tree files (YAML/JSON); glob patterns allowed
        #[arg(required = true)]
        trees: Vec<String>,

        /// Options file (default: ./tmplc.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write <name>.js files here instead of stdout
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Emit bare statements without the function wrapper
        #[arg(long)]
        no_wrap: bool,

        /// Assign the function to this variable
        #[arg(long)]
        export: Option<String>,
    },

    /// Check that every node type in the trees has a handler
    Validate {
        /// Tree files (YAML/JSON); glob patterns allowed
        #[arg(required = true)]
        trees: Vec<String>,
    },

    /// List registered node types
    Handlers,

    /// Print the JSON Schema of the syntax-tree format
    Schema,

    /// Write a default tmplc.toml
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "warn,tmplc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Compile {
            trees,
            config,
            out_dir,
            no_wrap,
            export,
        } => {
            let mut options = resolve_options(config.as_deref())?;
            if no_wrap {
                options.wrap = false;
            }
            if export.is_some() {
                options.export = export;
            }
            options.validate()?;
            cmd_compile(&trees, &options, out_dir.as_deref())
        }
        Commands::Validate { trees } => cmd_validate(&trees),
        Commands::Handlers => cmd_handlers(),
        Commands::Schema => cmd_schema(),
        Commands::Init { path } => cmd_init(&path),
    }
}

/// Load options from `explicit`, else ./tmplc.toml, else defaults.
fn resolve_options(explicit: Option<&Path>) -> Result<CompileOptions, String> {
    match explicit {
        Some(path) => parser::load_options(path),
        None => {
            let local = Path::new(OPTIONS_FILE);
            if local.exists() {
                parser::load_options(local)
            } else {
                Ok(CompileOptions::default())
            }
        }
    }
}

/// Expand glob patterns; plain paths pass through unchanged.
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let matches = glob::glob(pattern).map_err(|e| format!("bad pattern '{}': {}", pattern, e))?;
        let before = paths.len();
        for entry in matches {
            paths.push(entry.map_err(|e| format!("cannot read {}: {}", pattern, e))?);
        }
        if paths.len() == before {
            return Err(format!("pattern '{}' matched no files", pattern));
        }
    }
    Ok(paths)
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "template".to_string())
}

/// Two inputs with the same stem would write the same output file.
fn check_unique_names(paths: &[PathBuf]) -> Result<(), String> {
    let mut seen: FxHashMap<String, &Path> = FxHashMap::default();
    for path in paths {
        let name = template_name(path);
        if let Some(first) = seen.insert(name.clone(), path) {
            return Err(format!(
                "{} and {} both compile to {}.js",
                first.display(),
                path.display(),
                name
            ));
        }
    }
    Ok(())
}

/// Parse and compile one tree file.
fn compile_file(path: &Path, options: &CompileOptions) -> Result<CompiledTemplate, String> {
    let tree: Node = parser::parse_tree_file(path)?;
    Compiler::standard()
        .compile_template(&template_name(path), &tree, options)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

fn cmd_compile(
    trees: &[String],
    options: &CompileOptions,
    out_dir: Option<&Path>,
) -> Result<(), String> {
    let paths = expand_patterns(trees)?;
    if out_dir.is_some() {
        check_unique_names(&paths)?;
    }

    // Compile everything first so a failure writes nothing
    let mut compiled = Vec::with_capacity(paths.len());
    for path in &paths {
        compiled.push(compile_file(path, options)?);
    }

    match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;
            for template in &compiled {
                let target = dir.join(format!("{}.js", template.name));
                std::fs::write(&target, format!("{}\n", template.source))
                    .map_err(|e| format!("cannot write {}: {}", target.display(), e))?;
                eprintln!("  {} ({})", target.display(), template.fingerprint);
            }
        }
        None => {
            for template in &compiled {
                println!("// {} {}", template.name, template.fingerprint);
                println!("{}", template.source);
            }
        }
    }
    Ok(())
}

fn cmd_validate(trees: &[String]) -> Result<(), String> {
    let registry = HandlerRegistry::standard();
    let mut total = 0;
    for path in expand_patterns(trees)? {
        let tree = parser::parse_tree_file(&path)?;
        let errors = parser::validate_tree(&tree, registry);
        if errors.is_empty() {
            println!("OK: {}", path.display());
            continue;
        }
        for e in &errors {
            eprintln!("  ERROR: {}: {}", path.display(), e);
        }
        total += errors.len();
    }

    if total == 0 {
        Ok(())
    } else {
        Err(format!("{} validation error(s)", total))
    }
}

fn cmd_handlers() -> Result<(), String> {
    for tag in HandlerRegistry::standard().tags() {
        println!("{}", tag);
    }
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(Node);
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("JSON serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let options_path = path.join(OPTIONS_FILE);
    if options_path.exists() {
        return Err(format!("{} already exists", options_path.display()));
    }
    std::fs::create_dir_all(path)
        .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;

    let template = r#"# tmplc compile options

# Wrap statements in `function (context) { ... }`
wrap = true

# Spaces per indentation level inside the function
indent = 4

# Assign the function to a variable, e.g. export = "tpl_page"
# export = "tpl_page"
"#;
    std::fs::write(&options_path, template)
        .map_err(|e| format!("cannot write {}: {}", options_path.display(), e))?;

    println!("Initialized tmplc options at {}", options_path.display());
    Ok(())
}
