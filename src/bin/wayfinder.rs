//! Wayfinder CLI: evidence-aware navigation over a knowledge graph.
//!
//! Usage:
//!   wayfinder navigate <seed> [--goal G] [--max-hops N] [--max-paths N]
//!   wayfinder zone <entity>
//!   wayfinder metrics <entity>
//!   wayfinder import <graph.json>
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wayfinder::{
    GraphDocument, GraphStore, InMemoryStore, NavigationPolicy, NavigationQuery, Navigator,
    OpenStore, SqliteStore,
};

#[derive(Parser)]
#[command(
    name = "wayfinder",
    version,
    about = "Evidence-aware navigation for knowledge graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Navigate a JSON graph document instead of the database
    #[arg(long, global = true, conflicts_with = "db")]
    graph: Option<PathBuf>,
    /// YAML navigation policy
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find evidence-backed paths from a seed entity
    Navigate {
        /// Seed entity: id, external reference, or unique name
        seed: String,
        /// Goal entity; without one, explore the neighborhood
        #[arg(long)]
        goal: Option<String>,
        /// Maximum traversals per path
        #[arg(long)]
        max_hops: Option<usize>,
        /// Maximum number of paths returned
        #[arg(long)]
        max_paths: Option<usize>,
    },
    /// Print the cognitive zone of an entity
    Zone {
        /// Entity id, external reference, or unique name
        entity: String,
    },
    /// Print the zone metrics of an entity
    Metrics {
        /// Entity id, external reference, or unique name
        entity: String,
    },
    /// Import a JSON graph document into the database
    Import {
        /// Path to the graph document
        #[arg(required = true)]
        path: PathBuf,
    },
}

/// Get the default database path (~/.local/share/wayfinder/wayfinder.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let wayfinder_dir = data_dir.join("wayfinder");
    std::fs::create_dir_all(&wayfinder_dir).ok();
    wayfinder_dir.join("wayfinder.db")
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "wayfinder=warn",
        1 => "wayfinder=debug",
        _ => "wayfinder=trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(path: &Path) -> Result<GraphDocument, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid graph document '{}': {}", path.display(), e))
}

fn open_store(db: Option<PathBuf>, graph: Option<PathBuf>) -> Result<Arc<dyn GraphStore>, String> {
    if let Some(path) = graph {
        let store = InMemoryStore::from_document(read_document(&path)?)
            .map_err(|e| format!("Failed to load graph: {}", e))?;
        return Ok(Arc::new(store));
    }
    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(Arc::new(store))
}

fn load_policy(path: Option<PathBuf>) -> Result<NavigationPolicy, String> {
    match path {
        Some(path) => NavigationPolicy::from_path(&path)
            .map_err(|e| format!("Failed to load policy '{}': {}", path.display(), e)),
        None => Ok(NavigationPolicy::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_navigate(navigator: &Navigator, query: NavigationQuery) -> i32 {
    match navigator.execute(&query) {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_zone(navigator: &Navigator, entity: &str) -> i32 {
    match navigator.detect_zone(entity) {
        Ok(zone) => print_json(&serde_json::json!({
            "entity": entity,
            "zone": zone,
            "description": zone.description(),
        })),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_metrics(navigator: &Navigator, entity: &str) -> i32 {
    match navigator.compute_zone_metrics(entity) {
        Ok(metrics) => print_json(&metrics),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_import(db: Option<PathBuf>, path: &Path) -> i32 {
    let document = match read_document(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let db_path = db.unwrap_or_else(default_db_path);
    let store = match SqliteStore::open(&db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: Failed to open database: {}", e);
            return 1;
        }
    };
    match store.import_document(&document) {
        Ok(version) => {
            println!(
                "Imported {} entities and {} edges into {} ({})",
                document.entities.len(),
                document.edges.len(),
                db_path.display(),
                version
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Import { path } = &cli.command {
        if cli.graph.is_some() {
            eprintln!("Error: import writes to the database; --graph is not allowed");
            std::process::exit(1);
        }
        std::process::exit(cmd_import(cli.db, path));
    }

    let policy = match load_policy(cli.policy) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = match open_store(cli.db, cli.graph) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let defaults = policy.search.clone();
    let navigator = Navigator::new(store, policy);

    let code = match cli.command {
        Commands::Navigate {
            seed,
            goal,
            max_hops,
            max_paths,
        } => {
            let mut query = NavigationQuery::from(seed)
                .max_hops(max_hops.unwrap_or(defaults.default_max_hops))
                .max_paths(max_paths.unwrap_or(defaults.default_max_paths));
            query.goal = goal;
            cmd_navigate(&navigator, query)
        }
        Commands::Zone { entity } => cmd_zone(&navigator, &entity),
        Commands::Metrics { entity } => cmd_metrics(&navigator, &entity),
        Commands::Import { .. } => 1,
    };
    std::process::exit(code);
}
