//! Templar CLI - Compile template event streams to SPARQL
//!
//! Usage:
//!   templar compile <events.jsonl> [--query <form>] [--rendering <mode>] [--config <file>]
//!   templar clusters <events.jsonl>
//!   templar validate <events.jsonl>
//!
//! Examples:
//!   templar compile page.jsonl
//!   templar compile page.jsonl --query ask --rendering optional
//!   templar validate page.jsonl

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use templar::cluster::ClusterCounter;
use templar::compile::{compile_events, compile_file, CompileOptions};
use templar::compiler::{QueryType, Rendering, SparqlProducer};
use templar::config::Settings;
use templar::event::{check_brackets, read_all, EventReader, JsonLinesReader};
use templar::sparql::test_utils::validate_sparql;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "templar")]
#[command(about = "Templar - compiles annotated template event streams to SPARQL")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template event stream to SPARQL
    Compile {
        /// Path to the JSON Lines event file
        file: PathBuf,

        /// Query form to generate (defaults to the config file, then select)
        #[arg(short, long)]
        query: Option<QueryArg>,

        /// How sibling optional triples are combined
        #[arg(short, long)]
        rendering: Option<RenderingArg>,

        /// Settings file (defaults to TEMPLAR_CONFIG, ./templar.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "sparql")]
        output: OutputFormat,
    },

    /// Report the variable clusters of the compiled query
    Clusters {
        /// Path to the JSON Lines event file
        file: PathBuf,
    },

    /// Validate a template event stream without printing the query
    Validate {
        /// Path to the JSON Lines event file
        file: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum QueryArg {
    Select,
    Ask,
    Construct,
}

impl From<QueryArg> for QueryType {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::Select => QueryType::Select,
            QueryArg::Ask => QueryType::Ask,
            QueryArg::Construct => QueryType::Construct,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum RenderingArg {
    Union,
    Optional,
}

impl From<RenderingArg> for Rendering {
    fn from(arg: RenderingArg) -> Self {
        match arg {
            RenderingArg::Union => Rendering::Union,
            RenderingArg::Optional => Rendering::Optional,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SPARQL only
    Sparql,
    /// Output SPARQL with a comment header and variable origins
    Verbose,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("templar=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            file,
            query,
            rendering,
            config,
            output,
        } => cmd_compile(file, query, rendering, config, output),
        Commands::Clusters { file } => cmd_clusters(file),
        Commands::Validate { file } => cmd_validate(file),
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings, String> {
    let settings = match config {
        Some(path) => Settings::from_file(&path),
        None => Settings::load(),
    };
    settings.map_err(|e| format!("Error loading settings: {}", e))
}

fn cmd_compile(
    file: PathBuf,
    query: Option<QueryArg>,
    rendering: Option<RenderingArg>,
    config: Option<PathBuf>,
    output: OutputFormat,
) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let editors = match settings.editors() {
        Ok(editors) => editors,
        Err(e) => {
            eprintln!("Invalid edit rule: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = CompileOptions::from_settings(&settings);
    if let Some(query) = query {
        options = options.with_query(query.into());
    }
    if let Some(rendering) = rendering {
        options = options.with_rendering(rendering.into());
    }

    match compile_file(&file, &options, editors) {
        Ok(compiled) => {
            match output {
                OutputFormat::Sparql => {
                    print!("{}", compiled.sparql);
                }
                OutputFormat::Verbose => {
                    println!("# Templar Compiled SPARQL");
                    println!("# Source: {}", file.display());
                    println!("# Query: {}", compiled.query);
                    for (name, origin) in &compiled.origins {
                        println!("# ?{} <- {}", name, origin);
                    }
                    println!();
                    print!("{}", compiled.sparql);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_clusters(file: PathBuf) -> ExitCode {
    let reader = match JsonLinesReader::open(&file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::default();
    let producer = match SparqlProducer::new(reader, &options.compiler_config()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut counter = ClusterCounter::new(producer);
    if let Err(e) = read_all(&mut counter).and_then(|_| counter.close()) {
        eprintln!("Read error: {}", e);
        return ExitCode::FAILURE;
    }

    let clusters = counter.clusters();
    println!("File: {}", file.display());
    println!("Clusters: {}", clusters.len());
    for (i, cluster) in clusters.iter().enumerate() {
        let names: Vec<String> = cluster.iter().map(|name| format!("?{}", name)).collect();
        println!("  {}. {}", i + 1, names.join(" "));
    }
    if clusters.len() > 1 {
        if let Some(smallest) = counter.smallest_cluster() {
            let names: Vec<&str> = smallest.iter().map(String::as_str).collect();
            println!("Smallest: {}", names.join(", "));
        }
    }
    ExitCode::SUCCESS
}

fn cmd_validate(file: PathBuf) -> ExitCode {
    let events = match JsonLinesReader::open(&file).and_then(|mut reader| {
        let events = read_all(&mut reader)?;
        reader.close()?;
        Ok(events)
    }) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = check_brackets(&events) {
        eprintln!("Validation error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = CompileOptions::default();
    let compiled = match compile_events(events, &options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Validation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = validate_sparql(&compiled.sparql) {
        eprintln!("Validation error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("✓ {} is valid ({} variables)", file.display(), compiled.origins.len());
    ExitCode::SUCCESS
}
