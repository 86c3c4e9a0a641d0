use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use lemivon::error::read_text;
use lemivon::parser::{self, content, distractors, events, flashcards, lines, sentences};
use lemivon::{load_items, PlatformRandom, QuestionItem, Settings, StudySet};

/// Files handed to the worker pool per round.
const BUILD_CHUNK: usize = 64;

#[derive(Parser)]
#[command(
    name = "lemivon",
    about = "Extract quiz questions, flashcards and events from study material"
)]
struct Cli {
    /// Fixed RNG seed for reproducible option order
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Single-line JSON output
    #[arg(long, global = true)]
    compact: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look for a formatted multiple-choice block in a text file
    Scan { file: PathBuf },
    /// Run the full fallback chain over text and/or items
    Resolve {
        #[arg(short, long)]
        text: Option<PathBuf>,
        #[arg(short, long)]
        items: Option<PathBuf>,
    },
    /// One question per item, with sibling answers as distractors
    Distractors { items: PathBuf },
    /// Term/definition pairs found in notes
    Flashcards { file: PathBuf },
    /// Fill-in-the-blank questions from prose
    Cloze {
        file: PathBuf,
        /// Max questions
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },
    /// Dated lines as calendar entries
    Events { file: PathBuf },
    /// Full study set for each file (processed in parallel)
    Build {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Item JSON shared by every file
        #[arg(short, long)]
        items: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load().context("loading settings")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log.as_str().into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    if cli.compact {
        settings.pretty = false;
    }
    let mut rng = PlatformRandom::from_seed_option(settings.seed);

    let result = match cli.command {
        Commands::Scan { file } => {
            let text = read_text(&file)?;
            let q = lines::scan(&text);
            if q.is_none() {
                info!(file = %file.display(), "no formatted question block found");
            }
            emit(&q, &settings)
        }
        Commands::Resolve { text, items } => {
            let text = text.as_deref().map(read_text).transpose()?;
            let items = items.as_deref().map(read_items).transpose()?;
            let q = content::resolve(text.as_deref(), items.as_deref(), &mut rng);
            if q.is_none() {
                info!("no question found; regenerate the content or upload different material");
            }
            emit(&q, &settings)
        }
        Commands::Distractors { items } => {
            let items = read_items(&items)?;
            let results = distractors::synthesize(&items, &mut rng);
            info!(
                items = items.len(),
                built = results.iter().flatten().count(),
                "synthesized questions"
            );
            emit(&results, &settings)
        }
        Commands::Flashcards { file } => {
            let cards = flashcards::extract_flashcards(&read_text(&file)?);
            info!(cards = cards.len(), "extracted flashcards");
            emit(&cards, &settings)
        }
        Commands::Cloze { file, limit } => {
            let qs = sentences::cloze_questions(&read_text(&file)?, limit, &mut rng);
            emit(&qs, &settings)
        }
        Commands::Events { file } => {
            let found = events::extract_events(&read_text(&file)?);
            info!(events = found.len(), "extracted events");
            emit(&found, &settings)
        }
        Commands::Build { files, items } => {
            let items = items.as_deref().map(read_items).transpose()?;
            let sets = build_sets(&files, items.as_deref(), &settings)?;
            let empty = sets.iter().filter(|s| s.is_empty()).count();
            if empty > 0 {
                warn!(empty, "some files produced nothing");
            }
            emit(&sets, &settings)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_items(path: &Path) -> anyhow::Result<Vec<QuestionItem>> {
    let json = read_text(path)?;
    load_items(&json).with_context(|| format!("parsing items from {}", path.display()))
}

fn emit<T: Serialize>(value: &T, settings: &Settings) -> anyhow::Result<()> {
    println!("{}", render(value, settings.pretty)?);
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Each file gets its own RNG: seeded runs offset the seed by file position.
fn build_sets(
    files: &[PathBuf],
    items: Option<&[QuestionItem]>,
    settings: &Settings,
) -> anyhow::Result<Vec<StudySet>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut sets = Vec::with_capacity(files.len());
    for (chunk_idx, chunk) in files.chunks(BUILD_CHUNK).enumerate() {
        let results: Vec<anyhow::Result<StudySet>> = chunk
            .par_iter()
            .enumerate()
            .map(|(i, path)| -> anyhow::Result<StudySet> {
                let text = read_text(path)?;
                let position = (chunk_idx * BUILD_CHUNK + i) as u64;
                let seed = settings.seed.map(|s| s.wrapping_add(position));
                let mut rng = PlatformRandom::from_seed_option(seed);
                let source = path.display().to_string();
                let set = parser::build_study_set(&source, Some(&text), items, settings, &mut rng);
                pb.inc(1);
                Ok(set)
            })
            .collect();
        for r in results {
            sets.push(r?);
        }
    }

    pb.finish_and_clear();
    info!(files = files.len(), "built study sets");
    Ok(sets)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
