use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use kanadrill::catalog::{Catalog, Script};
use kanadrill::config::Config;
use kanadrill::error::DrillError;
use kanadrill::logging;
use kanadrill::session::{Trainer, TrainerEvent};
use kanadrill::store::backend::{Backend, MemoryBackend};
use kanadrill::store::json_store::JsonStore;
use kanadrill::store::schema::ExportData;

#[derive(Parser)]
#[command(
    name = "kanadrill",
    version,
    about = "Adaptive drill trainer for kana, kanji and radicals"
)]
struct Cli {
    #[arg(short, long, value_parser = parse_script, help = "Script (katakana, hiragana, kanji, radicals)")]
    script: Option<Script>,

    #[arg(short, long, help = "Grid rows (1-5)")]
    rows: Option<usize>,

    #[arg(short, long, help = "Grid columns (1-12)")]
    cols: Option<usize>,

    #[arg(long, help = "Directory for scores and preferences")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Practice rounds on stdin. `?` shows a hint, `!skip`, `!reshuffle`, `!quit`.
    Practice {
        #[arg(long, help = "Stop after this many rounds")]
        rounds: Option<usize>,
    },
    /// Show score and weight per character in the active pool.
    Stats,
    /// Forget all scores.
    Reset,
    /// Edit which characters are drilled.
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Set how often a trouble character may repeat in one round (1-10).
    MaxDup { value: usize },
    /// Write scores, preferences, filters and config to a JSON file.
    Export { path: PathBuf },
    /// Replace local data with an export file.
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum FilterAction {
    List,
    Toggle { id: String },
    All,
    None,
}

fn parse_script(value: &str) -> Result<Script, String> {
    Script::from_key(value).ok_or_else(|| format!("unknown script `{value}`"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    logging::init_tracing(&config.log_level);
    if let Some(e) = config_err {
        warn!("using default config: {e:#}");
    }

    if let Some(script) = cli.script {
        config.script = script;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    config.validate();

    let store = match cli.data_dir {
        Some(dir) => JsonStore::with_base_dir(dir),
        None => JsonStore::new(),
    };
    let store = match store {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("progress will not be saved: {e:#}");
            None
        }
    };
    if let Some(store) = &store
        && store.check_interrupted_import()
    {
        warn!("removed leftover backups from an interrupted import");
    }

    let command = cli.command.unwrap_or(Command::Practice { rounds: None });
    match command {
        Command::Export { path } => {
            let store = store.context("no data directory available")?;
            export(&store, &config, &path)
        }
        Command::Import { path } => {
            let store = store.context("no data directory available")?;
            import(&store, &path)
        }
        command => {
            let backend: Box<dyn Backend> = match store {
                Some(store) => Box::new(store),
                None => Box::new(MemoryBackend::default()),
            };
            let catalog = Catalog::load(config.script);
            if catalog.is_empty() {
                return Err(DrillError::EmptyCatalog(config.script).into());
            }
            let mut trainer = Trainer::new(config, catalog, backend);
            run(&mut trainer, command)
        }
    }
}

fn run<B: Backend>(trainer: &mut Trainer<B>, command: Command) -> Result<()> {
    match command {
        Command::Practice { rounds } => practice(trainer, rounds),
        Command::Stats => {
            print_stats(trainer);
            Ok(())
        }
        Command::Reset => {
            trainer.reset_scores();
            println!("All scores cleared.");
            Ok(())
        }
        Command::Filter { action } => filter(trainer, action),
        Command::MaxDup { value } => {
            trainer.set_max_duplicates(value);
            println!("Max duplicates: {}", trainer.max_duplicates());
            Ok(())
        }
        Command::Export { .. } | Command::Import { .. } => Ok(()),
    }
}

fn practice<B: Backend>(trainer: &mut Trainer<B>, rounds: Option<usize>) -> Result<()> {
    if trainer.total() == 0 {
        println!("Nothing to practice: every character is filtered out.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut completed = 0;
    trainer.drain_events();
    print_grid(trainer);

    loop {
        let Some(current) = trainer.current().cloned() else {
            break;
        };
        print!("{}/{} {} > ", trainer.index() + 1, trainer.total(), current.glyph);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "!quit" => break,
            "!skip" => trainer.skip(),
            "!reshuffle" => trainer.reshuffle(),
            "?" => {
                trainer.hint_pressed();
                println!("  hint: {}", current.answer);
                trainer.hint_released();
            }
            input => {
                trainer.submit_final(input);
            }
        }

        loop {
            let events = trainer.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    TrainerEvent::ErrorFlash { .. } => println!("  ✗ try again"),
                    TrainerEvent::RoundFinished => {
                        completed += 1;
                        print_summary(trainer);
                        if rounds.is_some_and(|limit| completed >= limit) {
                            return Ok(());
                        }
                        trainer.acknowledge();
                    }
                    TrainerEvent::Reseeded => print_grid(trainer),
                }
            }
        }
    }
    Ok(())
}

fn print_grid<B: Backend>(trainer: &Trainer<B>) {
    let cols = trainer.config().cols.max(1);
    println!();
    for (row_idx, row) in trainer.selection().chunks(cols).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if row_idx * cols + i == trainer.index() {
                    format!("[{}]", record.glyph)
                } else {
                    format!(" {} ", record.glyph)
                }
            })
            .collect();
        println!("{}", cells.join(""));
    }
    println!();
}

fn print_summary<B: Backend>(trainer: &Trainer<B>) {
    let summary = trainer.summary();
    if summary.is_clean() {
        println!("Round complete: all {} correct.", summary.total);
        return;
    }
    println!("Round complete. Characters to review:");
    for (id, count) in &summary.problems {
        let glyph = trainer
            .catalog()
            .get(id)
            .map_or(id.as_str(), |r| r.glyph.as_str());
        println!("  {glyph}  {id}  x{count}");
    }
}

fn print_stats<B: Backend>(trainer: &Trainer<B>) {
    println!(
        "{:<6} {:<8} {:>7} {:>7} {:>8} {:>6}",
        "char", "id", "score", "weight", "accuracy", "round"
    );
    for row in trainer.statistics() {
        println!(
            "{:<6} {:<8} {:>7.2} {:>7.2} {:>7.0}% {:>6}",
            row.glyph,
            row.id,
            row.score,
            row.weight,
            row.accuracy * 100.0,
            row.in_selection
        );
    }
}

fn filter<B: Backend>(trainer: &mut Trainer<B>, action: FilterAction) -> Result<()> {
    match action {
        FilterAction::List => {
            let filter = trainer.filter();
            for record in trainer.catalog().records() {
                let mark = if filter.contains(&record.id) { 'x' } else { ' ' };
                println!("[{mark}] {} {}", record.glyph, record.id);
            }
        }
        FilterAction::Toggle { id } => {
            let included = trainer.toggle_filter(&id)?;
            println!("{id}: {}", if included { "included" } else { "excluded" });
        }
        FilterAction::All => {
            trainer.select_all();
            println!("All {} characters selected.", trainer.catalog().len());
        }
        FilterAction::None => {
            trainer.clear_filter();
            println!("Selection cleared.");
        }
    }
    Ok(())
}

fn export(store: &JsonStore, config: &Config, path: &Path) -> Result<()> {
    let data = store.export_all(config);
    let json = serde_json::to_string_pretty(&data)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn import(store: &JsonStore, path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let data: ExportData = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    store.import_all(&data)?;

    let mut config = data.config;
    config.validate();
    if let Err(e) = config.save() {
        warn!("imported data but could not save config: {e:#}");
    }
    println!("Imported from {}", path.display());
    Ok(())
}
