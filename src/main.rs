//! # Word Meaning CLI (`wm`)
//!
//! The `wm` binary manages the local lexicon and runs the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! wm --config ./config/wm.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wm init` | Create the SQLite database and relation tables |
//! | `wm add <type> <word> <candidates>` | Insert a lexicon entry |
//! | `wm lookup <word> --type <type>` | Query the local lexicon only |
//! | `wm analyze <word> --type <type>` | Run the full resolution pipeline |
//! | `wm stats` | Show entry counts per relation |
//! | `wm serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use word_meaning::models::RelationType;
use word_meaning::{config, lexicon, migrate, resolve, server, stats};

/// Word Meaning CLI: Arabic synonyms, antonyms and plurals from a local
/// lexicon with a web-search fallback.
#[derive(Parser)]
#[command(name = "wm", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/wm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the `synonyms`, `antonyms` and `plural` tables. Safe to run
    /// on an existing database.
    Init,

    /// Add a lexicon entry.
    Add {
        /// Relation: `synonyms`, `antonyms` or `plural`.
        relation: RelationType,
        /// The headword.
        word: String,
        /// Candidates separated by `;` (e.g. "فرِح ; مبتهج").
        candidates: String,
    },

    /// Look a word up in the local lexicon, without any network calls.
    Lookup {
        word: String,
        #[arg(long = "type")]
        relation: RelationType,
    },

    /// Resolve a word through validation, lexicon and web fallback.
    Analyze {
        word: String,
        #[arg(long = "type")]
        relation: RelationType,
    },

    /// Show lexicon entry counts.
    Stats,

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // `lookup` and `stats` only touch the database, so they fall back to
    // the default layout when no config file exists. A config file that is
    // present but invalid is always an error.
    let cfg = match &cli.command {
        Commands::Lookup { .. } | Commands::Stats if !cli.config.exists() => {
            config::Config::minimal()
        }
        _ => config::load_config(&cli.config)?,
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Add {
            relation,
            word,
            candidates,
        } => {
            lexicon::run_add(&cfg, relation, &word, &candidates).await?;
        }
        Commands::Lookup { word, relation } => {
            lexicon::run_lookup(&cfg, &word, relation).await?;
        }
        Commands::Analyze { word, relation } => {
            resolve::run_analyze(&cfg, &word, relation).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
