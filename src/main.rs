//! Page Replacement Simulator - Main Entry Point
//!
//! Usage: page-sim [OPTIONS] <trace_file>
//!
//! Arguments:
//!   trace_file  - Trace of memory operations, one per line
//!                 ("<opcode> [parameter]"; 1=new job, 2=read, 3=write, 4=job end)
//!
//! Options:
//!   -p, --policy <name>  Run a single policy (fifo, lru, optimal);
//!                        may be repeated. Default: all three in order.
//!   -h, --help           Print help information

use std::env;
use std::process;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use page_sim::engine::{Event, PassReport, run_pass};
use page_sim::policy::PolicyKind;
use page_sim::trace::Trace;

/// Command-line configuration
struct Config {
    trace_file: String,
    policies: Vec<PolicyKind>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Page Replacement Simulator - Replays a memory trace under FIFO, LRU, and OPTIMAL");
    eprintln!();
    eprintln!("Usage: {program} [OPTIONS] <trace_file>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  trace_file  - Trace of memory operations, one per line:");
    eprintln!("                1 <size>    start a new job");
    eprintln!("                2 <address> read");
    eprintln!("                3 <address> write");
    eprintln!("                4           end the active job");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --policy <name>  Run a single policy (fifo, lru, optimal); may be repeated");
    eprintln!("  -h, --help           Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} Vm.dat");
    eprintln!("  {program} --policy lru Vm.dat");
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];

    let mut policies = Vec::new();
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-p" | "--policy" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--policy requires a value (fifo, lru, or optimal)".to_string())?;
                policies.push(value.parse::<PolicyKind>()?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {arg}\nUse --help for usage information."));
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    if positional.len() != 1 {
        print_help(program);
        return Err(format!("\nError: Expected 1 argument, got {}", positional.len()));
    }

    if policies.is_empty() {
        policies = PolicyKind::ALL.to_vec();
    }

    Ok(Config {
        trace_file: positional.remove(0),
        policies,
    })
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<()> {
    let trace = Trace::from_file(&config.trace_file)
        .with_context(|| format!("failed to load trace file '{}'", config.trace_file))?;
    debug!(file = %config.trace_file, operations = trace.len(), "trace loaded");

    for kind in &config.policies {
        let policy = kind.policy();
        println!("*** {} ***", policy.name());
        let report = run_pass(&trace, policy)
            .with_context(|| format!("{} pass aborted", policy.name()))?;
        print_report(&report);
        debug!(
            policy = policy.name(),
            jobs = report.totals.jobs,
            hits = report.totals.hits,
            faults = report.totals.faults,
            "pass complete"
        );
    }
    Ok(())
}

/// Print one pass's event stream and totals, with a blank line between jobs
fn print_report(report: &PassReport) {
    for (index, event) in report.events.iter().enumerate() {
        println!("{event}");
        if matches!(event, Event::JobEnd { .. }) && index + 1 < report.events.len() {
            println!();
        }
    }
    println!("{}", report.totals);
}
