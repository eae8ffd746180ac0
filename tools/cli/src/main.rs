//! gitvault CLI - sync a local vault to a Git-forge repository.
//!
//! This tool is the caller of the sync core: it owns the persisted
//! settings, resolves the forge client, runs passes, and renders the
//! per-pass report.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gitvault_remote::{create_default_registry, RemoteRepository};
use gitvault_store::FsVaultStore;
use gitvault_sync::{EngineConfig, SyncEngine, SyncOutcome, SyncScheduler, SyncSettings};

#[derive(Parser)]
#[command(name = "gitvault")]
#[command(about = "Sync a local vault to a Git-forge repository")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (defaults to the user config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the configured token against the forge.
    Auth,

    /// List repositories visible to the authenticated account.
    Repos,

    /// List branches of a repository.
    Branches {
        /// Repository full name (defaults to the configured one).
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Run a single sync pass.
    Sync {
        /// Vault directory to sync.
        #[arg(short = 'd', long)]
        vault: PathBuf,
    },

    /// Run scheduled passes until interrupted.
    Watch {
        /// Vault directory to sync.
        #[arg(short = 'd', long)]
        vault: PathBuf,

        /// Start even if auto-sync is disabled in the settings.
        #[arg(long)]
        force: bool,
    },

    /// Update persisted settings.
    Configure {
        /// Forge provider id.
        #[arg(long)]
        provider: Option<String>,

        /// Personal access token.
        #[arg(long)]
        token: Option<String>,

        /// Repository full name ("owner/name").
        #[arg(long)]
        repo: Option<String>,

        /// Branch to push to.
        #[arg(long)]
        branch: Option<String>,

        /// Device label embedded in commit messages.
        #[arg(long)]
        device: Option<String>,

        /// Sync interval in minutes.
        #[arg(long)]
        interval: Option<u64>,

        /// Enable or disable auto-sync.
        #[arg(long)]
        auto_sync: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let settings = config::load_settings(&config_path)?;

    match cli.command {
        Commands::Auth => {
            let remote = connect(&settings)?;
            let account = remote.authenticate().await?;
            println!("Authenticated as {}", account.login);
        }

        Commands::Repos => {
            let remote = connect(&settings)?;
            for repo in remote.list_repositories().await? {
                let marker = if repo.private { " (private)" } else { "" };
                println!("{}{}", repo.full_name, marker);
            }
        }

        Commands::Branches { repo } => {
            let repo = match repo.or_else(|| non_empty(&settings.repository)) {
                Some(repo) => repo,
                None => bail!("No repository given and none configured"),
            };
            let remote = connect(&settings)?;
            for branch in remote.list_branches(&repo).await? {
                let marker = if branch.protected { " (protected)" } else { "" };
                println!("{}{}", branch.name, marker);
            }
        }

        Commands::Sync { vault } => {
            let report = build_engine(&settings, &vault)?.run_pass(&settings).await?;
            for outcome in report.failures() {
                if let SyncOutcome::Failed {
                    path,
                    kind,
                    message,
                } = outcome
                {
                    eprintln!("failed ({:?}): {}: {}", kind, path, message);
                }
            }
            println!("{}", report.summary());
            if report.failed() > 0 {
                bail!("{} files failed to sync", report.failed());
            }
        }

        Commands::Watch { vault, force } => {
            if !settings.auto_sync && !force {
                bail!("Auto-sync is disabled; enable it or pass --force");
            }
            settings.validate()?;

            let engine = Arc::new(build_engine(&settings, &vault)?);
            let settings = Arc::new(settings);

            let mut scheduler = SyncScheduler::new();
            scheduler.start(settings.interval(), {
                let engine = engine.clone();
                let settings = settings.clone();
                move || {
                    let engine = engine.clone();
                    let settings = settings.clone();
                    async move { engine.run_scheduled(&settings).await }
                }
            });

            info!(
                "watching every {} minute(s), press Ctrl-C to stop",
                settings.sync_interval_mins
            );
            tokio::signal::ctrl_c().await.context("Failed to wait for Ctrl-C")?;
            scheduler.stop();

            // Let an in-flight pass reach its natural end.
            while engine.session().in_progress() {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }

        Commands::Configure {
            provider,
            token,
            repo,
            branch,
            device,
            interval,
            auto_sync,
        } => {
            let mut settings = settings;
            if let Some(provider) = provider {
                settings.provider = provider;
            }
            if let Some(token) = token {
                settings.token = gitvault_common::AccessToken::new(token);
            }
            if let Some(repo) = repo {
                settings.repository = repo;
            }
            if let Some(branch) = branch {
                settings.branch = branch;
            }
            if let Some(device) = device {
                settings.device_label = device;
            }
            if let Some(interval) = interval {
                settings.sync_interval_mins = interval;
            }
            if let Some(auto_sync) = auto_sync {
                settings.auto_sync = auto_sync;
            }
            config::save_settings(&config_path, &settings)?;
            println!("Settings saved to {}", config_path.display());
        }
    }

    Ok(())
}

/// Resolve the forge client for the configured provider.
fn connect(settings: &SyncSettings) -> Result<Arc<dyn RemoteRepository>> {
    let registry = create_default_registry();
    let client = registry.resolve(
        &settings.provider,
        serde_json::json!({ "token": settings.token.as_str() }),
    )?;
    Ok(client)
}

fn build_engine(
    settings: &SyncSettings,
    vault: &std::path::Path,
) -> Result<SyncEngine<dyn RemoteRepository, FsVaultStore>> {
    let remote = connect(settings)?;
    let store = Arc::new(FsVaultStore::new(vault)?);
    Ok(SyncEngine::from_arc(remote, store, EngineConfig::default()))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
