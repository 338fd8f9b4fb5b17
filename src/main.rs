use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use urlaction::cli::{self, DiscoveryArgs};
use urlaction::config::Config;
use urlaction::csharp::CSharpFrontend;
use urlaction::discover::{DiscoveryOptions, Discoverer};
use urlaction::scan::{self, ScanOptions};
use urlaction::symbols::SymbolGraph;
use urlaction::util;

fn discovery_options(args: &DiscoveryArgs) -> DiscoveryOptions {
    let mut options = DiscoveryOptions::from_config(Config::get());
    if args.include_abstract {
        options.skip_abstract = false;
    }
    if let Some(suffix) = &args.controller_suffix {
        options.controller_suffix = suffix.clone();
    }
    if let Some(ms) = args.timeout_ms {
        options.timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    for base in &args.controller_bases {
        if !options.controller_bases.contains(base) {
            options.controller_bases.push(base.clone());
        }
    }
    options
}

fn discoverer(args: &DiscoveryArgs) -> Discoverer {
    let discoverer = Discoverer::new(discovery_options(args));
    tracing::debug!(options = ?discoverer.options(), "discovery options");
    discoverer
}

fn emit<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => util::write_string(path, &rendered),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

fn graph_from_dir(path: &Path, no_ignore: bool) -> Result<SymbolGraph> {
    let files = scan::scan_sources(path, ScanOptions::new(no_ignore))
        .with_context(|| format!("scan {}", path.display()))?;
    let mut frontend = CSharpFrontend::new()?;
    for file in &files {
        let source = util::read_to_string(&file.abs_path)?;
        frontend.add_source(&file.rel_path, &source)?;
    }
    tracing::info!(files = files.len(), "parsed sources");
    Ok(frontend.build())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Discover {
            graph,
            discovery,
            output,
        } => {
            let graph = SymbolGraph::load(&graph)?;
            let areas = discoverer(&discovery).discover(&graph)?;
            emit(&areas, output.as_deref())
        }
        cli::Command::Scan {
            path,
            no_ignore,
            discovery,
            output,
            emit_graph,
        } => {
            let graph = graph_from_dir(&path, no_ignore)?;
            if emit_graph {
                return emit(&graph, output.as_deref());
            }
            let areas = discoverer(&discovery).discover(&graph)?;
            emit(&areas, output.as_deref())
        }
    }
}
