use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lexsearch::config::{self, EngineConfig};
use lexsearch::lexicon::{ImportOptions, LexiconRegistry};
use lexsearch::query::{parse_spec, SearchSet, SearchSpec};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexsearch")]
#[command(about = "Pattern, anagram and attribute search over word lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Word list, one word per line (text after the word is its definition)
    #[arg(short, long, global = true)]
    words: Option<PathBuf>,

    /// Keep definitions from the word list
    #[arg(long, global = true)]
    definitions: bool,

    /// Binary word graph to load instead of, or on top of, the word list
    #[arg(short, long, global = true)]
    graph: Option<PathBuf>,

    /// Stem files for the type I and stem-derived sets
    #[arg(long, global = true)]
    stems: Vec<PathBuf>,

    /// Saved attribute table to connect instead of building one
    #[arg(short, long, global = true)]
    attributes: Option<PathBuf>,

    /// Lexicon name
    #[arg(short, long, global = true, default_value = "default")]
    lexicon: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the lexicon
    Search {
        /// Query string, e.g. "pattern:C?T* -suffix:S"
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Read a JSON search specification instead of a query string
        #[arg(long, conflicts_with = "query")]
        spec: Option<PathBuf>,

        /// Upper-case every result
        #[arg(long)]
        caps: bool,

        /// Print results as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Show everything known about a word
    Info {
        word: String,
    },
    /// Print a word's definition
    Define {
        word: String,

        /// One definition per line
        #[arg(long)]
        resolve: bool,
    },
    /// List the word sets a word belongs to
    Sets {
        word: String,
    },
    /// Write the loaded words as a binary graph
    Compile {
        out: PathBuf,

        /// Write the reverse graph
        #[arg(long)]
        reversed: bool,
    },
    /// Save the attribute table for later runs
    SaveAttributes {
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexsearch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "using default config");
        EngineConfig::default()
    });
    config::init(&config);

    let registry = load_lexicon(&cli)?;
    let lexicon = cli.lexicon.as_str();

    match &cli.command {
        Commands::Search {
            query,
            spec,
            caps,
            json,
        } => {
            let spec = match spec {
                Some(path) => read_spec(path)?,
                None if query.is_empty() => bail!("no query given"),
                None => parse_spec(&query.join(" ")).context("Invalid query")?,
            };
            let results = registry.search(lexicon, &spec, *caps);
            if *json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for word in &results {
                    println!("{}", word);
                }
            }
        }
        Commands::Info { word } => {
            let info = registry.word_info(lexicon, word);
            if !info.is_valid() {
                bail!("'{}' has no attribute row", word);
            }
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Define { word, resolve } => {
            let definition = registry.definition(lexicon, word, *resolve);
            if definition.is_empty() {
                println!("{}: no definition", word.to_ascii_uppercase());
            } else {
                println!("{}", definition);
            }
        }
        Commands::Sets { word } => {
            if !registry.is_acceptable(lexicon, word) {
                bail!("'{}' is not in lexicon {}", word, lexicon);
            }
            for set in SearchSet::ALL {
                if registry.is_set_member(lexicon, word, set) {
                    println!("{}", set);
                }
            }
        }
        Commands::Compile { out, reversed } => {
            let entry = registry
                .entry(lexicon)
                .context("No lexicon loaded")?;
            let checksum = entry.graph().export_binary(out, *reversed)?;
            println!("Wrote {} words to {} (checksum {:08x})", entry.num_words(), out.display(), checksum);
        }
        Commands::SaveAttributes { out } => {
            registry.save_attributes(lexicon, out)?;
            println!("Saved attributes to {}", out.display());
        }
    }

    Ok(())
}

fn load_lexicon(cli: &Cli) -> Result<LexiconRegistry> {
    let mut registry = LexiconRegistry::new();
    let lexicon = cli.lexicon.as_str();

    if cli.words.is_none() && cli.graph.is_none() {
        bail!("either --words or --graph is required");
    }

    if let Some(path) = &cli.words {
        let options = ImportOptions {
            load_definitions: cli.definitions,
            build_attributes: false,
        };
        registry.import_text(lexicon, path, options)?;
    }
    if let Some(path) = &cli.graph {
        registry
            .import_binary(lexicon, path, false, None)
            .with_context(|| format!("Failed to load graph {}", path.display()))?;
    }
    for path in &cli.stems {
        registry.import_stems(lexicon, path)?;
    }

    match &cli.attributes {
        Some(path) => {
            registry.connect_attributes(lexicon, path)?;
        }
        None => {
            registry.build_attributes(lexicon)?;
        }
    }

    Ok(registry)
}

fn read_spec(path: &Path) -> Result<SearchSpec> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse search specification")
}
