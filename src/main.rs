//! `verselink` - find Bible references in notes and rewrite them as wiki links.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, Level};
use walkdir::WalkDir;

use verselink::constants::env::LOG;
use verselink::{
    document, BookRegistry, Config, DetectedReference, Error, Formatter, RangePolicy, ReferenceDetector, RenderMode,
};

#[derive(Parser, Debug)]
#[command(name = "verselink")]
#[command(about = "Detect Bible references in notes and turn them into wiki links")]
#[command(version)]
struct Cli {
    /// Settings file (JSON, plugin `data.json` layout)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Fail on malformed references and inverted ranges instead of leaving them as-is
    #[arg(long, global = true)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List unlinked references in files or directories of Markdown notes
    Detect {
        /// Files, or directories searched for *.md
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Show every detection instead of the first `maxVerses`
        #[arg(long)]
        all: bool,
    },
    /// Render a reference as links
    Link {
        /// Reference text, e.g. "Rom 8:1-3"
        text: String,

        /// Alias used when the text is a single reference
        #[arg(long)]
        alias: Option<String>,
    },
    /// Render a reference as embeds
    Embed {
        /// Reference text, e.g. "Rom 8:1-3"
        text: String,

        /// Alias used when the text is a single reference
        #[arg(long)]
        alias: Option<String>,
    },
    /// Rewrite every reference in a note
    Format {
        /// Markdown note to rewrite
        file: PathBuf,

        /// Produce embeds instead of links
        #[arg(long)]
        embed: bool,

        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// List known books, or resolve one name or abbreviation
    Books {
        /// Book name or abbreviation to resolve
        query: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Detections found in one file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    path: PathBuf,
    total: usize,
    detections: Vec<DetectedReference>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_with(cli.settings.as_deref())?;
    if cli.strict {
        config.range_policy = RangePolicy::Strict;
    }
    let registry = config.registry()?;

    match cli.command {
        Command::Detect { paths, json, all } => {
            let detector = ReferenceDetector::new(&registry)?.with_overlap_policy(config.overlap_policy);
            let max = if all { usize::MAX } else { config.max_verses };
            run_detect(&paths, &detector, max, json)
        }
        Command::Link { text, alias } => {
            let formatter = Formatter::from_config(&registry, &config);
            println!("{}", formatter.link_verse_range(&text, alias.as_deref())?);
            Ok(())
        }
        Command::Embed { text, alias } => {
            let formatter = Formatter::from_config(&registry, &config);
            println!("{}", formatter.embed_verse_range(&text, alias.as_deref())?);
            Ok(())
        }
        Command::Format { file, embed, in_place } => {
            let detector = ReferenceDetector::new(&registry)?.with_overlap_policy(config.overlap_policy);
            let formatter = Formatter::from_config(&registry, &config);
            let mode = if embed { RenderMode::Embed } else { RenderMode::Link };
            run_format(&file, &detector, &formatter, mode, in_place)
        }
        Command::Books { query, json } => run_books(&registry, query.as_deref(), json),
    }
}

/// Log to stderr; `-v` flags win over the `VERSELINK_LOG` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var(LOG).ok().and_then(|v| Level::from_str(&v).ok()).unwrap_or(Level::WARN),
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_detect(paths: &[PathBuf], detector: &ReferenceDetector, max: usize, json: bool) -> Result<()> {
    let files = collect_files(paths);
    info!("Scanning {} file(s)", files.len());

    let reports = files
        .par_iter()
        .map(|path| -> Result<(FileReport, String)> {
            let text = fs_err::read_to_string(path)?;
            let detections = detector.detect(&text);
            let total = detections.len();
            info!("{}: {total} reference(s)", path.display());
            let shown = document::visible(&detections, max).to_vec();
            Ok((FileReport { path: path.clone(), total, detections: shown }, text))
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        let reports: Vec<&FileReport> = reports.iter().map(|(r, _)| r).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for (report, text) in &reports {
        for detected in &report.detections {
            println!(
                "{}:{}: {} -> {}",
                report.path.display(),
                line_number(text, detected.start),
                detected.original_text,
                detected.normalized_text
            );
        }
        if report.total > report.detections.len() {
            println!(
                "{}: {} more not shown (use --all)",
                report.path.display(),
                report.total - report.detections.len()
            );
        }
    }
    Ok(())
}

/// Expand directory arguments into the Markdown files beneath them.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        files.extend(
            WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
                .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))),
        );
    }
    files
}

fn line_number(text: &str, offset: usize) -> usize {
    text.get(..offset).map_or(0, |s| s.matches('\n').count()) + 1
}

fn run_format(
    file: &Path,
    detector: &ReferenceDetector,
    formatter: &Formatter<'_>,
    mode: RenderMode,
    in_place: bool,
) -> Result<()> {
    let text = fs_err::read_to_string(file)?;
    let outcome = document::format_all(&text, detector, formatter, mode)
        .with_context(|| format!("Failed to format {}", file.display()))?;
    info!(
        "{}: formatted {} reference(s), skipped {}",
        file.display(),
        outcome.formatted,
        outcome.skipped
    );

    if in_place {
        fs_err::write(file, &outcome.text)?;
    } else {
        print!("{}", outcome.text);
    }
    Ok(())
}

fn run_books(registry: &BookRegistry, query: Option<&str>, json: bool) -> Result<()> {
    let books = match query {
        Some(query) => match registry.resolve(query) {
            Some(book) => std::slice::from_ref(book),
            None => {
                let err = Error::UnknownBook(query.to_string());
                return Err(match registry.closest(query) {
                    Some(book) => anyhow::Error::new(err).context(format!("Did you mean {}?", book.name)),
                    None => err.into(),
                });
            }
        },
        None => registry.books(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(books)?);
        return Ok(());
    }
    for book in books {
        println!("{}: {}", book.name, book.abbreviations.join(", "));
    }
    Ok(())
}
