#![forbid(unsafe_code)]

mod cmd;
mod mermaid;
mod output;

use std::env;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{CommandFactory, Parser, Subcommand};
use markov_core::EdgePolicy;
use markov_core::config::resolve_config;
use output::OutputMode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "markov: communicating classes and long-run behaviour of Markov chains",
    long_about = None
)]
struct Cli {
    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Read settings from this file instead of `markov.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail on the first malformed line or rejected edge.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Check that every row of the chain sums to 1",
        long_about = "Report each vertex's outgoing probability sum against the tolerance band. \
                      Exits non-zero when any vertex is out of band.",
        after_help = "EXAMPLES:\n    # Verify a chain\n    markov check weather.txt\n\n    # Loosen the band\n    markov check weather.txt --lo 0.95 --hi 1.05"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List communicating classes and the links between them",
        long_about = "Decompose the chain into communicating classes, label each as transient, \
                      recurrent or absorbing, and list the (reduced) links between classes.",
        after_help = "EXAMPLES:\n    # Classes with reduced links\n    markov classes chain.txt\n\n    # Every link, as JSON\n    markov classes chain.txt --no-reduce --format json"
    )]
    Classes(cmd::classes::ClassesArgs),

    #[command(
        next_help_heading = "Diagrams",
        about = "Write the class diagram as Mermaid",
        after_help = "EXAMPLES:\n    # Print the diagram\n    markov hasse chain.txt\n\n    # Write it to a file\n    markov hasse chain.txt -o classes.mmd"
    )]
    Hasse(cmd::hasse::HasseArgs),

    #[command(
        next_help_heading = "Diagrams",
        about = "Write the transition graph as a Mermaid flowchart",
        long_about = "Write the transition graph as a Mermaid flowchart. The graph must pass \
                      the row-sum check unless --force is given.",
        after_help = "EXAMPLES:\n    # Export a chain\n    markov export chain.txt -o chain.mmd\n\n    # Export raw weights\n    markov export weights.txt --force"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Analyze",
        about = "Matrix powers, convergence, periods and stationary distributions",
        after_help = "EXAMPLES:\n    # Full report\n    markov analyze chain.txt\n\n    # Tighter convergence\n    markov analyze chain.txt --epsilon 1e-9 --max-iter 5000"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analyze",
        about = "Distribution after a number of steps from one state",
        after_help = "EXAMPLES:\n    # Weather in three days, starting sunny\n    markov forecast weather.txt --start 1 --steps 3"
    )]
    Forecast(cmd::forecast::ForecastArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    markov completions bash > ~/.local/share/bash-completion/completions/markov"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MARKOV_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "markov=debug,info"
        } else {
            "markov=info,warn"
        })
    });

    let format = env::var("MARKOV_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    let project_root = env::current_dir()?;
    let (mut config, source) = resolve_config(&project_root, cli.config.as_deref())
        .context("failed to resolve configuration")?;
    if cli.strict {
        config.load.edge_policy = EdgePolicy::Strict;
    }
    debug!(source = ?source, "configuration resolved");

    let ctx = cmd::Context { output, config };

    match cli.command {
        Commands::Check(ref args) => cmd::check::run_check(args, &ctx),
        Commands::Classes(ref args) => cmd::classes::run_classes(args, &ctx),
        Commands::Hasse(ref args) => cmd::hasse::run_hasse(args, &ctx),
        Commands::Export(ref args) => cmd::export::run_export(args, &ctx),
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, &ctx),
        Commands::Forecast(ref args) => cmd::forecast::run_forecast(args, &ctx),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command, &mut std::io::stdout())
        }
    }
}
