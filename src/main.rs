use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gramdex::output;
use gramdex::utils::{cut_record, progress, AppConfig};
use gramdex::{Engine, FieldKey, Record};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gramdex")]
#[command(about = "Substring search over structured records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index file (defaults to the app data directory)
    #[arg(short, long, global = true)]
    index: Option<PathBuf>,

    /// Config file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Longest shingle length for a new index
    #[arg(short = 'k', long, global = true)]
    max_shingle_length: Option<usize>,

    /// Keep case when creating a new index
    #[arg(long, global = true)]
    case_sensitive: bool,

    /// When to color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorWhen,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorWhen {
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a record (JSON, or plain text when it does not parse)
    Add {
        record: String,

        /// Field names to leave out of the index
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Add every record of a JSON array or newline-delimited JSON file
    Import {
        file: PathBuf,

        /// Field names to leave out of the index
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Search for records containing a substring
    Search {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Print one JSON object per hit
        #[arg(long)]
        json: bool,
    },
    /// Remove a record by id
    Remove { id: u32 },
    /// Print a record by id
    Get { id: u32 },
    /// Remove every record, keeping the configuration
    Drop,
    /// Show index statistics
    Stats,
    /// Show the shingles of a text value
    Shingles {
        value: String,

        #[arg(short, long, default_value_t = 3)]
        length: usize,
    },
    /// Print the effective configuration
    Config {
        /// Write it back to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut app_config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(k) = cli.max_shingle_length {
        app_config.engine.max_shingle_length = k;
    }
    if cli.case_sensitive {
        app_config.engine.case_insensitive = false;
    }
    let index_path = app_config.index_path(cli.index.as_deref())?;
    let color = cli.color == ColorWhen::Auto;

    match cli.command {
        Commands::Add { record, exclude } => {
            let mut engine = open_engine(&index_path, &app_config)?;
            let id = add_record(&mut engine, parse_record(&record), &exclude)?;
            engine.save(&index_path)?;
            println!("{}", id);
        }
        Commands::Import { file, exclude } => {
            let mut engine = open_engine(&index_path, &app_config)?;
            let records = read_records(&file)?;
            let bar = progress::record_bar(records.len() as u64);
            for record in records {
                add_record(&mut engine, record, &exclude)?;
                bar.inc(1);
            }
            bar.finish_with_message("done");
            engine.save(&index_path)?;
            info!(records = engine.len(), path = %index_path.display(), "import complete");
        }
        Commands::Search { query, json } => {
            let engine = open_engine(&index_path, &app_config)?;
            let query = query.join(" ");
            let hits = engine.search_hits(query.as_str())?;
            if json {
                output::print_json_hits(&mut io::stdout().lock(), &hits)?;
            } else {
                let mut out = output::stdout(color);
                output::print_hits(&mut out, &hits, &query, engine.case_insensitive())?;
            }
        }
        Commands::Remove { id } => {
            let mut engine = open_engine(&index_path, &app_config)?;
            let record = engine.remove(id)?;
            engine.save(&index_path)?;
            println!("{}", record);
        }
        Commands::Get { id } => {
            let engine = open_engine(&index_path, &app_config)?;
            match engine.get(id)? {
                Some(record) => println!("{}", record),
                None => bail!("record {} has been removed", id),
            }
        }
        Commands::Drop => {
            let mut engine = open_engine(&index_path, &app_config)?;
            engine.clear();
            engine.save(&index_path)?;
        }
        Commands::Stats => {
            let engine = open_engine(&index_path, &app_config)?;
            let mut out = io::stdout().lock();
            writeln!(out, "Index file:       {}", index_path.display())?;
            output::print_stats(&mut out, &engine.stats())?;
        }
        Commands::Shingles { value, length } => {
            for shingle in cut_record(&parse_record(&value), length)? {
                println!("{}", shingle);
            }
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&app_config)?);
            if save {
                match &cli.config {
                    Some(path) => app_config.save_to(path)?,
                    None => app_config.save()?,
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GRAMDEX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the index file, or start an empty index if there is none yet
fn open_engine(path: &Path, config: &AppConfig) -> Result<Engine> {
    if path.exists() {
        return Engine::load(path);
    }
    info!(path = %path.display(), "creating new index");
    Ok(Engine::new(config.engine)?)
}

/// JSON when it parses, otherwise the raw text
fn parse_record(arg: &str) -> Record {
    serde_json::from_str(arg).unwrap_or_else(|_| Record::from(arg))
}

fn add_record(engine: &mut Engine, record: Record, exclude: &[String]) -> Result<u32> {
    let id = if exclude.is_empty() {
        engine.add(record)?
    } else {
        engine.add_filtered(record, |key: FieldKey<'_>, _: &Record| {
            key.as_name()
                .is_none_or(|name| !exclude.iter().any(|e| e == name))
        })?
    };
    Ok(id)
}

/// Records from a JSON array file or newline-delimited JSON
fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if content.trim_start().starts_with('[') {
        let records: Vec<Record> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        return Ok(records);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid JSON", path.display(), n + 1))
        })
        .collect()
}
