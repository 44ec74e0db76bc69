//! readygate CLI
//!
//! Inspect bootstrap attributes and replay scripted page sessions against the
//! loader.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use readygate::Config;
use readygate_cli::{Report, Scenario};
use readygate_common::warning::{clear_warnings, warn_once};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// readygate: dependency-aware loader driver
#[derive(Parser, Debug)]
#[command(name = "readygate")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Show how a bootstrap attribute is read
    readygate parse 'dep=jquery|app&jb=/js/&err=1'

    # Replay a page session
    readygate run session.json

    # Machine-readable output
    readygate run --json session.json

    # Trace loader internals
    RUST_LOG=readygate=debug readygate run session.json
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a bootstrap attribute and print the configuration
    Parse {
        /// The `data` attribute value
        #[arg(value_name = "DATA")]
        data: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a JSON scenario and print what happened
    Run {
        /// Path to the scenario file
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    clear_warnings();

    match cli.command {
        Command::Parse { data, json } => {
            let config = Config::parse(Some(&data));
            warn_ignored(&config);
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        Command::Run { scenario, json } => {
            let report = Scenario::from_path(&scenario)?.run()?;
            warn_ignored(&report.config);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn warn_ignored(config: &Config) {
    for entry in &config.ignored {
        warn_once("Config", &format!("ignored entry '{entry}'"));
    }
}

fn print_list(items: &[String]) {
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  - {item}");
    }
}

fn print_config(config: &Config) {
    println!("=== Configuration ===");
    println!("dependencies:");
    print_list(&config.dependencies);
    println!("js base:        {}", config.js_base_url);
    println!("css base:       {}", config.css_base_url);
    println!("user js base:   {}", config.user_js_base_url);
    println!("user css base:  {}", config.user_css_base_url);
    println!("debug mode:     {}", config.show_errors);
    println!("load js:");
    print_list(&config.user_load_js);
    println!("load css:");
    print_list(&config.user_load_css);
    if let Some(ref parameter) = config.load_parameter {
        println!("load parameter: {parameter}");
    }
}

fn print_report(report: &Report) {
    print_config(&report.config);

    println!("\n=== Head ===");
    println!("{}", report.head);

    println!("\n=== Scripts ===");
    print_list(&report.scripts);

    println!("\n=== Stylesheets ===");
    print_list(&report.stylesheets);

    println!("\n=== Callbacks ===");
    if report.fired.is_empty() {
        println!("  (none)");
    }
    for fired in &report.fired {
        println!("  {:>6}ms  {}", fired.at_ms, fired.label);
    }

    println!("\n=== Readiness ===");
    println!("dom ready:          {}", report.readiness.dom_ready);
    println!("dependencies ready: {}", report.readiness.dependencies_ready);
    println!("gate:               {}", report.gate);
    println!("debug panel:        {}", report.debug_panel);
    println!("elapsed:            {}ms", report.elapsed_ms);

    if !report.log.is_empty() {
        println!("\n=== Log ===");
        for line in &report.log {
            println!("  {line}");
        }
    }
}
