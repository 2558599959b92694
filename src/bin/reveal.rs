use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reveal", version)]
struct Cli {
    /// Log scheduler and observer decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a page file and exit.
    Validate(PageArgs),
    /// Print the effective entrance delay of every node.
    Plan(PageArgs),
    /// Replay a scroll script and print every event as a JSON line.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scroll script JSON.
    #[arg(long)]
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    let value = serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))?;
    Ok(value)
}

fn cmd_validate(args: PageArgs) -> anyhow::Result<()> {
    let page: reveal::PageConfig = read_json(&args.in_path, "page")?;
    page.validate()?;
    eprintln!("ok: {} section(s)", page.sections.len());
    Ok(())
}

fn cmd_plan(args: PageArgs) -> anyhow::Result<()> {
    let page: reveal::PageConfig = read_json(&args.in_path, "page")?;
    let plan = page.plan()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (section, nodes) in plan {
        writeln!(out, "{section}")?;
        for node in nodes {
            writeln!(
                out,
                "{:indent$}{} +{:.3}s",
                "",
                node.id,
                node.effective_delay.as_secs_f64(),
                indent = 2 * (node.depth + 1)
            )?;
        }
    }
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let page: reveal::PageConfig = read_json(&args.in_path, "page")?;
    let script: reveal::ScrollScript = read_json(&args.script, "scroll script")?;
    let events = script.run(&page)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &events {
        serde_json::to_writer(&mut out, event).context("write event")?;
        writeln!(out)?;
    }
    tracing::debug!(events = events.len(), "simulation finished");
    Ok(())
}
