use std::io::{self, Write};
use std::path::{Path, PathBuf};

use alsdiff::history::{Repository, Revision};
use alsdiff::{diff_documents, report, Change, Config, Document};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "alsdiff",
    version,
    about = "Show what changed between two versions of an Ableton Live set"
)]
struct Cli {
    /// Log alignment decisions
    #[arg(short = 'D', long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Diff two set files (gzip-compressed or plain XML)
    Diff {
        /// Older version
        #[arg(value_name = "OLD")]
        old: PathBuf,
        /// Newer version
        #[arg(value_name = "NEW")]
        new: PathBuf,
        #[command(flatten)]
        options: DiffOptions,
    },
    /// Diff every pair of adjacent revisions of a file in git history
    Log {
        /// Tracked set file, relative to the repository directory
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Repository directory (defaults to the current directory)
        #[arg(long, value_name = "DIR", default_value = ".")]
        repo: PathBuf,
        #[command(flatten)]
        options: DiffOptions,
    },
}

#[derive(Debug, Args)]
struct DiffOptions {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Additional tag to ignore (repeatable)
    #[arg(long = "ignore", value_name = "TAG")]
    ignore: Vec<String>,
    /// Do not ignore Live's view-state tags
    #[arg(long)]
    no_default_ignores: bool,
    /// Fractional digits kept when comparing time values
    #[arg(long, value_name = "DIGITS", default_value_t = 2)]
    precision: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl DiffOptions {
    fn config(&self) -> Config {
        let base = if self.no_default_ignores {
            Config::strict()
        } else {
            Config::default()
        };
        self.ignore
            .iter()
            .fold(base, |config, tag| config.ignore(tag.as_str()))
            .with_value_scale(self.precision)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    run(cli.command)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Diff { old, new, options } => diff_files(&old, &new, &options),
        Command::Log {
            file,
            repo,
            options,
        } => log_history(&repo, &file, &options),
    }
}

fn diff_files(old: &Path, new: &Path, options: &DiffOptions) -> Result<()> {
    let config = options.config();
    let old_doc = load(old)?;
    let new_doc = load(new)?;
    let changes = diff_documents(&old_doc, &new_doc, &config)
        .with_context(|| format!("failed to diff {} against {}", old.display(), new.display()))?;

    let mut stdout = io::stdout().lock();
    write_changes(&mut stdout, &changes, options.format)
}

fn log_history(repo: &Path, file: &Path, options: &DiffOptions) -> Result<()> {
    let config = options.config();
    let repository = Repository::open(repo)
        .with_context(|| format!("{} is not inside a git repository", repo.display()))?;
    let revisions = repository
        .revisions(file)
        .with_context(|| format!("failed to list revisions of {}", file.display()))?;

    let mut revisions = revisions.iter();
    let Some(newest) = revisions.next() else {
        bail!("{} has no history", file.display());
    };

    let mut stdout = io::stdout().lock();
    let mut newer = read_revision(&repository, newest)?;
    for older in revisions {
        let older_doc = read_revision(&repository, older)?;
        info!(old = older.short(), "comparing revision");

        let summary = repository.summary(&older.commit)?;
        writeln!(stdout, "{summary}\n")?;
        {
            let changes = diff_documents(&older_doc, &newer, &config)
                .with_context(|| format!("failed to diff revision {}", older.short()))?;
            write_changes(&mut stdout, &changes, options.format)?;
        }
        writeln!(stdout)?;
        newer = older_doc;
    }
    Ok(())
}

fn load(path: &Path) -> Result<Document> {
    alsdiff::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn read_revision(repository: &Repository, revision: &Revision) -> Result<Document> {
    let blob = repository.read(revision)?;
    let name = format!("{}:{}", revision.short(), revision.path);
    alsdiff::parse_input(&alsdiff::Input::from_bytes(&blob).with_filename(&name))
        .with_context(|| format!("failed to parse {name}"))
}

fn write_changes<W: Write>(out: &mut W, changes: &[Change<'_>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text if changes.is_empty() => writeln!(out, "no changes")?,
        OutputFormat::Text => out.write_all(report::render(changes).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, changes).context("failed to encode json")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
