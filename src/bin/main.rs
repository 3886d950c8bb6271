//! Queryscope CLI - Parse query text into graph JSON, positions, insights
//!
//! Usage:
//!   queryscope parse <file> [--mode <mode>] [--compact]
//!   queryscope layout <file> [--mode <mode>] [--direction <lr|tb>]
//!   queryscope insights <file> [--mode <mode>]
//!
//! Examples:
//!   queryscope parse report.sql
//!   queryscope parse chain.ts --mode orm-js --compact
//!   queryscope layout report.sql --direction tb
//!   queryscope insights orders.py

use clap::{Parser, Subcommand, ValueEnum};
use queryscope::{
    compute_layout, parse_to_graph, LayoutDirection, LayoutOptions, NodeKind, ParsedQuery,
    QueryMode,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "queryscope")]
#[command(about = "Queryscope - structure graphs and cost insight for SQL and ORM query code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query file and print the graph as JSON
    Parse {
        /// Path to the query file (.sql, .js/.ts/.tsx, .py)
        file: PathBuf,

        /// Input syntax (inferred from the file extension if not specified)
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// Print compact single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Parse a query file and print node positions as JSON
    Layout {
        /// Path to the query file
        file: PathBuf,

        /// Input syntax (inferred from the file extension if not specified)
        #[arg(short, long)]
        mode: Option<ModeArg>,

        /// Flow direction for ranks
        #[arg(short, long, default_value = "lr")]
        direction: DirectionArg,
    },

    /// Parse a query file and print a plain-text insight report
    Insights {
        /// Path to the query file
        file: PathBuf,

        /// Input syntax (inferred from the file extension if not specified)
        #[arg(short, long)]
        mode: Option<ModeArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Sql,
    OrmJs,
    OrmPy,
}

impl From<ModeArg> for QueryMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Sql => QueryMode::Sql,
            ModeArg::OrmJs => QueryMode::OrmJs,
            ModeArg::OrmPy => QueryMode::OrmPy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Left to right
    Lr,
    /// Top to bottom
    Tb,
}

impl From<DirectionArg> for LayoutDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Lr => LayoutDirection::LeftToRight,
            DirectionArg::Tb => LayoutDirection::TopToBottom,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            mode,
            compact,
        } => cmd_parse(file, mode, compact),
        Commands::Layout {
            file,
            mode,
            direction,
        } => cmd_layout(file, mode, direction),
        Commands::Insights { file, mode } => cmd_insights(file, mode),
    }
}

fn cmd_parse(file: PathBuf, mode: Option<ModeArg>, compact: bool) -> ExitCode {
    let (query, _) = match parse_file(&file, mode) {
        Ok(result) => result,
        Err(code) => return code,
    };

    let rendered = if compact {
        serde_json::to_string(&query)
    } else {
        serde_json::to_string_pretty(&query)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing graph: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_layout(file: PathBuf, mode: Option<ModeArg>, direction: DirectionArg) -> ExitCode {
    let (query, _) = match parse_file(&file, mode) {
        Ok(result) => result,
        Err(code) => return code,
    };

    let options = LayoutOptions {
        direction: direction.into(),
    };
    let positions = compute_layout(&query.nodes, &query.edges, &options);
    // Sorted keys keep the output stable for diffing.
    let ordered: BTreeMap<String, _> = positions.into_iter().collect();
    match serde_json::to_string_pretty(&ordered) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing layout: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_insights(file: PathBuf, mode: Option<ModeArg>) -> ExitCode {
    let (query, mode) = match parse_file(&file, mode) {
        Ok(result) => result,
        Err(code) => return code,
    };

    println!("Mode: {}", mode);
    if query.has_errors() {
        println!();
        println!("Errors:");
        for error in &query.errors {
            println!("  - {}", error);
        }
    }

    let ctes: Vec<&str> = query
        .nodes_of_kind(NodeKind::Cte)
        .map(|node| node.label.as_str())
        .collect();
    if !ctes.is_empty() {
        println!();
        println!("CTEs:");
        for cte in ctes {
            println!("  - {}", cte);
        }
    }

    let warnings = query.all_warnings();
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    println!("Nodes:");
    for node in &query.nodes {
        let tier = node
            .cost
            .map(|cost| cost.to_string())
            .unwrap_or_else(|| "-".to_string());
        match &node.complexity {
            Some(complexity) => {
                println!("  [{}] {} ({}, {})", tier, node.label, node.kind, complexity)
            }
            None => println!("  [{}] {} ({})", tier, node.label, node.kind),
        }
    }

    ExitCode::SUCCESS
}

fn parse_file(file: &Path, mode: Option<ModeArg>) -> Result<(ParsedQuery, QueryMode), ExitCode> {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return Err(ExitCode::FAILURE);
        }
    };

    let mode = mode
        .map(QueryMode::from)
        .unwrap_or_else(|| infer_mode(file));
    Ok((parse_to_graph(mode, &text), mode))
}

/// Infer the input syntax from the file extension; SQL when unknown.
fn infer_mode(file: &Path) -> QueryMode {
    match file.extension().and_then(|ext| ext.to_str()) {
        Some("js") | Some("jsx") | Some("ts") | Some("tsx") | Some("mjs") | Some("cjs") => {
            QueryMode::OrmJs
        }
        Some("py") => QueryMode::OrmPy,
        _ => QueryMode::Sql,
    }
}
