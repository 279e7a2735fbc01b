//! bookshelf-rs entry point.

use bookshelf_rs::{
    AppError,
    config::{Cli, Command, Config},
    library::{BookStore, MigrationPlan, migrate},
    server,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Migrate { dry_run, yes, dir }) => cmd_migrate(&config, dir, dry_run, yes),
        Some(Command::List { dir }) => cmd_list(&config, dir),
        Some(Command::Serve { bind, library }) => cmd_serve(config, bind, library).await,
        None => cmd_serve(config, None, None).await,
    }
}

/// Write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());
    println!("\nEdit config.toml to point [library] root at your book folders.");
    println!("Then run: bookshelf-rs serve");

    Ok(())
}

/// Store over `dir`, or the configured root.
fn open_store(config: &Config, dir: Option<PathBuf>) -> anyhow::Result<BookStore> {
    let root = dir.unwrap_or_else(|| config.library.root.clone());
    if !root.is_dir() {
        anyhow::bail!("Library directory does not exist: {}", root.display());
    }
    Ok(BookStore::new(root, config.library.cache_capacity))
}

/// List books with their effective slug.
fn cmd_list(config: &Config, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let store = open_store(config, dir)?;
    let books = store.list_books();

    if books.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    println!("{:<32} {:<8} {:<32} TITLE", "SLUG", "SOURCE", "FOLDER");
    println!("{}", "-".repeat(100));
    for resolved in books {
        println!(
            "{:<32} {:<8} {:<32} {}",
            resolved.slug,
            if resolved.slug.is_stored() { "stored" } else { "derived" },
            resolved.folder,
            resolved.book.metadata.title
        );
    }

    Ok(())
}

/// Plan and, after confirmation, apply slug migration.
fn cmd_migrate(
    config: &Config,
    dir: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let store = open_store(config, dir)?;
    let plan = MigrationPlan::build(&store);

    if plan.entries.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    println!("Found {} books\n", plan.entries.len());
    print_plan(&plan);

    if dry_run {
        println!("--- dry run, nothing changed ---");
        return Ok(());
    }

    let conflicts = plan.conflict_count();
    if conflicts > 0 {
        return Err(AppError::Conflict(conflicts).into());
    }

    let renames = plan.rename_count();
    if renames == 0 {
        println!("Nothing to migrate.");
        return Ok(());
    }

    if !yes && !confirm(&format!("Migrate {} books? (y/N): ", renames))? {
        println!("Cancelled.");
        return Ok(());
    }

    println!("\nMigrating...");
    let report = migrate::execute(&store, &plan)?;

    for (from, to) in &report.migrated {
        println!("  [{} -> {}]", from, to);
    }
    for failure in &report.failures {
        println!("  error: {}: {}", failure.folder, failure.error);
    }
    println!(
        "\nMigration complete: {}/{}",
        report.succeeded(),
        report.attempted
    );

    report.into_result()?;
    Ok(())
}

fn print_plan(plan: &MigrationPlan) {
    let unchanged: Vec<_> = plan.unchanged().collect();
    if !unchanged.is_empty() {
        println!("Unchanged:");
        for entry in unchanged {
            println!("  [{}] {}", entry.folder, entry.title);
        }
        println!();
    }

    let conflicts: Vec<_> = plan.conflicts().collect();
    if !conflicts.is_empty() {
        println!("Conflicts (resolve manually):");
        for entry in conflicts {
            println!("  [{}] {} -> {}", entry.folder, entry.title, entry.target_folder);
        }
        println!();
    }

    let renames: Vec<_> = plan.renames().collect();
    if !renames.is_empty() {
        println!("Will migrate:");
        for entry in renames {
            println!("  [{}] {} -> {}", entry.folder, entry.title, entry.target_folder);
        }
        println!();
    }
}

/// Ask a yes/no question on stdin.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Start the server.
async fn cmd_serve(
    mut config: Config,
    bind: Option<std::net::SocketAddr>,
    library: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(addr) = bind {
        config.server.bind = addr;
    }
    if let Some(root) = library {
        config.library.root = root;
    }

    if !config.library.root.is_dir() {
        tracing::warn!(
            root = %config.library.root.display(),
            "Library directory does not exist, serving an empty library"
        );
    }

    tracing::info!(
        bind = %config.server.bind,
        root = %config.library.root.display(),
        cache_capacity = config.library.cache_capacity,
        "Starting bookshelf-rs server"
    );

    let bind_addr = config.server.bind;
    let state = server::AppState::new(config);
    let app = server::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(address = %bind_addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
