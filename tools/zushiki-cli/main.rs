use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt};
use zushiki::prelude::*;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EndNodeCli {
    OnReturn,
    Always,
}

impl From<EndNodeCli> for EndNodePolicy {
    fn from(value: EndNodeCli) -> Self {
        match value {
            EndNodeCli::OnReturn => EndNodePolicy::OnReturn,
            EndNodeCli::Always => EndNodePolicy::Always,
        }
    }
}

/// Converts tagged program statements into a flowchart JSON document
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the statement JSON file
    input: String,
    /// Where to write the flowchart JSON (stdout when omitted)
    output: Option<String>,

    /// Optional JSON file overriding layout, node sizes, labels or the end-node policy
    #[arg(short, long)]
    config: Option<String>,

    /// Require the `{ "main": [...], "functions": [...] }` input shape
    #[arg(short, long)]
    multi_function: bool,

    /// When to append an end node to a function's fall-through paths
    #[arg(long, value_enum)]
    end_node: Option<EndNodeCli>,

    /// Print a text outline of the flowchart to stderr
    #[arg(long)]
    outline: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) {
    let total_start = Instant::now();

    // --- 1. Configuration ---
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            FlowchartConfig::from_json_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid config '{}': {}", path, e)))
        }
        None => FlowchartConfig::default(),
    };
    if let Some(policy) = cli.end_node {
        config.end_node = policy.into();
    }

    // --- 2. Input ---
    let input_json = fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read input file '{}': {}", cli.input, e))
    });
    let source = if cli.multi_function {
        SourceProgram::from_json_str_multi(&input_json)
    } else {
        SourceProgram::from_json_str(&input_json)
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to load statements: {}", e)));

    // --- 3. Conversion ---
    let converter = Converter::builder()
        .with_config(config)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));

    let convert_start = Instant::now();
    let flowchart = converter
        .convert_source(source)
        .unwrap_or_else(|e| exit_with_conversion_error(&e));
    tracing::info!(
        nodes = flowchart.items.len(),
        connections = flowchart.connections.len(),
        elapsed = ?convert_start.elapsed(),
        "conversion finished"
    );

    if cli.outline {
        eprint!("{}", outline(&flowchart));
    }

    // --- 4. Output ---
    let json = flowchart
        .to_json_string(cli.pretty)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize flowchart: {}", e)));
    match &cli.output {
        Some(path) => {
            fs::write(path, &json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write output file '{}': {}", path, e))
            });
            eprintln!(
                "Wrote {} nodes and {} connections to '{}' in {:?}",
                flowchart.items.len(),
                flowchart.connections.len(),
                path,
                total_start.elapsed()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write output: {}", e)));
        }
    }
}

fn exit_with_conversion_error(error: &ConvertError) -> ! {
    eprintln!("\nConversion failed ({})", error.kind());
    eprintln!("  function:  {}", error.function());
    eprintln!("  statement: {}", error.statement_index());
    exit_with_error(&error.to_string())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
