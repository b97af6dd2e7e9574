// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! routemap CLI
//!
//! Walks a declaratively described routing topology and prints the
//! collated documentation report.
//!
//! # Usage
//!
//! ```bash
//! # Render a topology file as text
//! routemap --config topology.toml
//!
//! # Render as JSON
//! routemap --config topology.toml --json
//!
//! # Generate an example topology file
//! routemap gen-config --output topology.toml
//!
//! # Validate a topology file
//! routemap validate --config topology.toml
//! ```

use clap::{Parser, Subcommand};
use routemap::{collate, walk, TopologyConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Request-dispatch topology documentation
#[derive(Parser, Debug)]
#[command(name = "routemap")]
#[command(about = "Request-dispatch topology documentation - walk, collate, and render route trees")]
#[command(version)]
struct Args {
    /// Topology file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the collated report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an example topology file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "topology.toml")]
        output: PathBuf,
    },

    /// Validate a topology file
    Validate {
        /// Topology file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config_path = args
        .config
        .ok_or("Missing --config (or use a subcommand)")?;
    let config = TopologyConfig::from_file(&config_path)?;
    let (registry, root) = config.build()?;
    let report = walk(registry.topology(), root, &registry)?;
    let collated = collate(report);

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &collated)?;
        println!();
    } else {
        routemap::render::dump(&collated, &mut stdout)?;
    }

    Ok(())
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = TopologyConfig::example();
    let text = toml::to_string_pretty(&config)?;
    std::fs::write(&output, text)?;
    println!("Wrote example topology to {}", output.display());
    Ok(())
}

fn cmd_validate(config: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = TopologyConfig::from_file(&config)?;
    let (registry, root) = config.build()?;
    let report = walk(registry.topology(), root, &registry)?;

    let items = report.app.items.len()
        + report
            .routers
            .iter()
            .map(|router| router.items.len())
            .sum::<usize>();
    println!("OK: {} routers, {} items", report.routers.len(), items);
    Ok(())
}
