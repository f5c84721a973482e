//! `laform`: render a résumé from a SQLite database.
//!
//! # Usage
//!
//! ```text
//! laform render --db resume.sqlite3 [--layout modern|retro] [--output resume.tex]
//! laform dump --db resume.sqlite3 [--group skills]
//! ```

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use laform_core::{
    default_log_level, init_logging, render_resume, slim, EntityGroup, Layout, ResumeData,
    RetryPolicy, SqliteExecutor,
};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "laform",
    version,
    about = "Typeset a résumé from relational data",
    long_about = None,
)]
struct Cli {
    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the résumé as LaTeX source.
    Render(RenderArgs),

    /// Print visible entities of one or all groups as JSON.
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct DbArgs {
    /// Path to the résumé database.
    #[arg(long)]
    db: PathBuf,

    /// Seconds to keep retrying a busy or unavailable database.
    #[arg(long, default_value_t = 10)]
    retry_secs: u64,
}

impl DbArgs {
    fn open(&self) -> Result<ResumeData<SqliteExecutor>> {
        let policy = RetryPolicy::with_max_elapsed(Duration::from_secs(self.retry_secs));
        let executor = SqliteExecutor::open(&self.db, policy)
            .with_context(|| format!("failed to open database {}", self.db.display()))?;
        Ok(ResumeData::new(executor))
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    db: DbArgs,

    #[arg(long, default_value_t = Layout::Modern)]
    layout: Layout,

    /// Output `.tex` file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[command(flatten)]
    db: DbArgs,

    /// Single entity group to dump.
    #[arg(long)]
    group: Option<EntityGroup>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Dump(args) => dump(args),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut data = args.db.open()?;
    let doc = render_resume(args.layout, &mut data)
        .with_context(|| format!("failed to render {} layout", args.layout))?;
    let latex = doc.to_latex();

    match &args.output {
        Some(path) => {
            fs::write(path, latex).with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                "event=output_written module=cli status=ok path={}",
                path.display()
            );
        }
        None => std::io::stdout()
            .write_all(latex.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}

fn dump(args: DumpArgs) -> Result<()> {
    let mut data = args.db.open()?;
    let groups = match args.group {
        Some(group) => vec![group],
        None => EntityGroup::ALL.to_vec(),
    };

    let mut dumped = serde_json::Map::new();
    for group in groups {
        let records = data
            .fetch(group)
            .with_context(|| format!("failed to read {group}"))?;
        dumped.insert(group.to_string(), serde_json::to_value(slim(&records))?);
    }
    println!("{}", serde_json::to_string_pretty(&dumped)?);
    Ok(())
}
