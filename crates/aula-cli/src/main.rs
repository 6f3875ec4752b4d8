//! `aula` — CLI driver for the parliamentary-data canonicalization
//! pipeline.
//!
//! # Usage
//!
//! ```
//! aula --db data/aula.db init-db
//! aula --db data/aula.db run --profiles-dir data/raw/openparlamento \
//!      --transcripts-dir data/raw/camera --chamber camera
//! aula --db data/aula.db unmatched
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use aula_core::{entity::Chamber, store::CanonicalStore as _};
use aula_pipeline::{Pipeline, PipelineConfig};
use aula_store_sqlite::SqliteStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "aula", about = "Parliamentary data canonicalization pipeline")]
struct Cli {
  /// Path to a TOML config file (db, profiles_dir, transcripts_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite database path (default: data/aula.db).
  #[arg(long, env = "AULA_DB")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run the ingestion pipeline over the configured source directories.
  Run {
    /// Directory of politician profile JSON files.
    #[arg(long, env = "AULA_PROFILES_DIR")]
    profiles_dir: Option<PathBuf>,

    /// Directory of session transcript JSON files.
    #[arg(long, env = "AULA_TRANSCRIPTS_DIR")]
    transcripts_dir: Option<PathBuf>,

    /// Chamber attributed to transcript units (their filenames do not
    /// encode it).
    #[arg(long, value_enum, default_value = "camera")]
    chamber: ChamberArg,
  },

  /// Create the database schema and exit.
  InitDb,

  /// Print the unresolved-speaker report as JSON, for manual review.
  Unmatched,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChamberArg {
  Camera,
  Senato,
}

impl From<ChamberArg> for Chamber {
  fn from(arg: ChamberArg) -> Self {
    match arg {
      ChamberArg::Camera => Chamber::Camera,
      ChamberArg::Senato => Chamber::Senato,
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file. CLI flags override it.
#[derive(Deserialize, Default)]
struct ConfigFile {
  db:              Option<PathBuf>,
  profiles_dir:    Option<PathBuf>,
  transcripts_dir: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let file_cfg: ConfigFile = if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let db_path = cli
    .db
    .or(file_cfg.db)
    .unwrap_or_else(|| PathBuf::from("data/aula.db"));
  if let Some(parent) = db_path.parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
  }

  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("opening store at {}", db_path.display()))?;

  match cli.command {
    Command::InitDb => {
      // Opening the store already ran the schema.
      tracing::info!(db = %db_path.display(), "database initialised");
    }

    Command::Run {
      profiles_dir,
      transcripts_dir,
      chamber,
    } => {
      let config = PipelineConfig {
        profiles_dir:    profiles_dir.or(file_cfg.profiles_dir),
        transcripts_dir: transcripts_dir.or(file_cfg.transcripts_dir),
        chamber:         chamber.into(),
      };
      let pipeline = Pipeline::new(store, config);
      let report = pipeline.run().await.context("pipeline run")?;

      let totals = report.totals();
      println!(
        "{}",
        serde_json::json!({
          "units": report.units.len(),
          "committed": report.committed(),
          "rolled_back": report.rolled_back(),
          "created": totals.created,
          "updated": totals.updated,
          "skipped": totals.skipped,
          "placeholders": totals.placeholders,
        })
      );
    }

    Command::Unmatched => {
      let placeholders = store
        .placeholder_persons()
        .await
        .context("loading placeholder persons")?;

      let entries: Vec<_> = placeholders
        .iter()
        .map(|p| {
          serde_json::json!({
            "person_id": p.person_id,
            "full_name": p.full_name,
            "family_name": p.family_name,
            "given_name": p.given_name,
            "normalized": aula_core::normalize::normalize_name(&p.full_name),
          })
        })
        .collect();

      let report = serde_json::json!({
        "total_unmatched": entries.len(),
        "unmatched_speakers": entries,
      });
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
  }

  Ok(())
}
