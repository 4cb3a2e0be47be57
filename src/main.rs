//! ferrule CLI
//!
//! Main entry point for the `frl` command.

use clap::{Parser, Subcommand};
use ferrule::interp::MAX_RECURSION_LIMIT;
use ferrule::{Interpreter, RunConfig, SourceFile};
use miette::{Diagnostic, IntoDiagnostic, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "frl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run and inspect ferrule programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program and print the entry function's final variables
    Run {
        /// Input file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Function to start from
        #[arg(long)]
        entry: Option<String>,

        /// Maximum call depth
        #[arg(
            long,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(..=MAX_RECURSION_LIMIT)
        )]
        recursion_limit: Option<i64>,

        /// TOML file with run settings; flags take precedence
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the final scope as JSON
        #[arg(long)]
        json: bool,

        /// Do not print the final scope
        #[arg(short, long, conflicts_with = "json")]
        quiet: bool,
    },

    /// Print the token stream
    Tokens {
        /// Input file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print every function with its statements in postfix form
    Parse {
        /// Input file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Show information about the language
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Run {
            input,
            entry,
            recursion_limit,
            config,
            json,
            quiet,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::default(),
            };
            if let Some(entry) = entry {
                run_config.entry = entry;
            }
            if let Some(limit) = recursion_limit {
                run_config.recursion_limit = limit;
            }
            run(&input, &run_config, json, quiet)
        }

        Commands::Tokens { input, json } => tokens(&input, json),

        Commands::Parse { input, json } => parse(&input, json),

        Commands::Info => info(),
    }
}

fn read_source(input: &Path) -> Result<SourceFile> {
    if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| miette::miette!("Failed to read stdin: {}", e))?;
        return Ok(SourceFile::new("<stdin>", content));
    }
    let content = std::fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read input file: {}", e))?;
    Ok(SourceFile::new(input.to_string_lossy(), content))
}

/// Attach the source so labels render against it
fn with_source<E>(err: E, source: &SourceFile) -> miette::Report
where
    E: Diagnostic + Send + Sync + 'static,
{
    miette::Report::new(err).with_source_code(source.to_named_source())
}

fn run(input: &Path, config: &RunConfig, json: bool, quiet: bool) -> Result<()> {
    tracing::info!(
        "Running {:?} from `{}` with recursion limit {}",
        input,
        config.entry,
        config.recursion_limit
    );

    let source = read_source(input)?;
    let functions = ferrule::parse(&source.content).map_err(|e| with_source(e, &source))?;
    let interpreter = Interpreter::new(functions);
    let scope = interpreter
        .run(config)
        .map_err(|e| with_source(e, &source))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scope).into_diagnostic()?);
    } else if !quiet {
        print!("{}", scope);
    }
    Ok(())
}

fn tokens(input: &Path, json: bool) -> Result<()> {
    tracing::info!("Tokenizing {:?}", input);

    let source = read_source(input)?;
    let tokens = ferrule::tokenize(&source.content);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens).into_diagnostic()?);
        return Ok(());
    }
    for token in &tokens {
        println!("{:>4}  {:<12} {}", token.line, format!("{:?}", token.kind), token.text);
    }
    Ok(())
}

fn parse(input: &Path, json: bool) -> Result<()> {
    tracing::info!("Parsing {:?}", input);

    let source = read_source(input)?;
    let functions = ferrule::parse(&source.content).map_err(|e| with_source(e, &source))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&functions).into_diagnostic()?);
    } else {
        print!("{}", functions.render());
    }
    Ok(())
}

fn info() -> Result<()> {
    println!("ferrule");
    println!("Version: {}", ferrule::VERSION);
    println!();
    println!("Language:");
    println!("  - fn NAME(params) ... end");
    println!("  - statements end with `;`");
    println!("  - operators: + - * / equals notequals, assignment `is`");
    println!("  - calls: NAME(args);");
    println!();
    println!("Defaults:");
    println!("  - entry: {}", ferrule::interp::DEFAULT_ENTRY);
    println!("  - recursion limit: {}", ferrule::interp::DEFAULT_RECURSION_LIMIT);
    println!("  - maximum recursion limit: {}", MAX_RECURSION_LIMIT);

    Ok(())
}
