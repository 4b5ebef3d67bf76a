//! tmplc CLI: compile template syntax trees to render functions.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tmplc",
    version,
    about = "Template compiler: syntax trees in, render functions out"
)]
struct Cli {
    /// Verbose logging (debug level for tmplc)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: tmplc::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    tmplc::cli::init_logging(cli.verbose);
    if let Err(e) = tmplc::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
