use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use store::config_store::{ConfigStore, build_config_store};
use store::model::{ColorValue, PartialThemeConfig, Scope, ThemeColors, ThemeMode};
use store::storage::{FileStorage, KeyValueStorage};
use tillcfg::config::{self, AppConfig, ConfigLoadResult, setup};
use tillcfg::logger::setup_logger;
use tillcfg::theme::{
    DisplayedTheme, DocumentRoot, InMemoryDocument, StaticSchemePreference, StylesheetDocument,
    ThemeEngine,
};

#[derive(Parser, Debug)]
#[command(
    name = "tillcfg",
    version,
    about = "Layered settings and themes for point-of-sale displays",
    arg_required_else_help = true
)]
struct Cli {
    /// Configuration file (default: ./tillcfg.toml, then the platform config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Paint the cached theme without touching the network.
    Boot,

    /// Fetch, resolve and apply the theme for a store.
    Init(SessionArgs),

    /// Print the resolved theme for a store as JSON.
    Show(SessionArgs),

    /// Save a theme preference and re-apply the result.
    Save(SaveArgs),

    /// Read or write a setting.
    #[command(subcommand)]
    Setting(SettingCommand),

    /// Inspect or clear the adapter cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Args, Debug)]
struct SessionArgs {
    #[arg(long, value_name = "STORE_ID")]
    store: String,

    #[arg(long, value_name = "USER_ID")]
    user: Option<String>,
}

#[derive(Args, Debug)]
struct SaveArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Layer to write: store or user.
    #[arg(long, default_value = "user")]
    scope: Scope,

    #[arg(long)]
    mode: Option<ThemeMode>,

    #[arg(long, value_name = "COLOR")]
    accent: Option<String>,

    #[arg(long, value_name = "COLOR")]
    primary: Option<String>,

    #[arg(long, value_name = "COLOR")]
    background: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SettingCommand {
    /// Resolved value, or the value at one scope.
    Get {
        key: String,
        #[arg(long)]
        scope: Option<Scope>,
    },
    /// Write a value; JSON is parsed, anything else is stored as a string.
    Set {
        key: String,
        value: String,
        #[arg(long, default_value = "store")]
        scope: Scope,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    Stats,
    Clear,
}

impl SaveArgs {
    fn preference(&self) -> PartialThemeConfig {
        let solid = |color: &Option<String>| color.as_deref().map(ColorValue::solid);
        let colors = ThemeColors {
            accent: solid(&self.accent),
            primary: solid(&self.primary),
            background: solid(&self.background),
            ..ThemeColors::default()
        };

        PartialThemeConfig {
            mode: self.mode,
            colors: (colors != ThemeColors::default()).then_some(colors),
            ..PartialThemeConfig::default()
        }
    }
}

fn load_app_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match config::load_config(path) {
        ConfigLoadResult::Success(config) => *config,
        ConfigLoadResult::LoadError(e) | ConfigLoadResult::DeserializeError(e) => bail!(e),
    };

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("{}\n", error.user_message());
        }
        bail!("{} configuration value(s) are invalid", errors.len());
    }
    Ok(config)
}

struct Runtime {
    store: Arc<dyn ConfigStore>,
    engine: ThemeEngine,
    document: Option<Arc<InMemoryDocument>>,
}

impl Runtime {
    fn new(config: &AppConfig) -> Result<Self> {
        let storage_dir = config.storage_dir()?;
        setup::create_dir_if_not_exists(&storage_dir)?;
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(storage_dir));

        let store = build_config_store(&config.store_options(), storage.clone())?;
        log::debug!("Using {} adapter", store.adapter_name());

        let mut document = None;
        let root: Arc<dyn DocumentRoot> = match config.display().stylesheet() {
            Some(path) => Arc::new(StylesheetDocument::new(path)),
            None => {
                let in_memory = Arc::new(InMemoryDocument::new());
                document = Some(in_memory.clone());
                in_memory
            }
        };
        let display = DisplayedTheme::new(
            root,
            Arc::new(StaticSchemePreference::new(config.display().prefers_dark())),
        );

        let engine = ThemeEngine::new(store.clone(), storage, display);
        Ok(Self {
            store,
            engine,
            document,
        })
    }

    /// Print the displayed frame when it is not written to a stylesheet file.
    fn print_frame(&self) {
        if self.document.is_none() {
            return;
        }
        if let Some(rendered) = self.engine.display().current() {
            println!("{}", rendered.to_stylesheet());
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_app_config(cli.config.as_deref())?;
    setup_logger(config.logging()).context("failed to initialize logging")?;

    let runtime = Runtime::new(&config)?;

    match cli.command {
        Commands::Boot => {
            let source = runtime.engine.boot();
            eprintln!("Booted from {source:?}");
            runtime.print_frame();
        }
        Commands::Init(session) => {
            runtime.engine.boot();
            let applied = runtime
                .engine
                .initialize(&session.store, session.user.as_deref())
                .await?;
            eprintln!(
                "Applied {} theme from {:?}",
                applied.mode.as_str(),
                applied.source
            );
            runtime.print_frame();
        }
        Commands::Show(session) => {
            let theme = runtime
                .store
                .get_theme(&session.store, session.user.as_deref())
                .await?;
            print_json(&theme)?;
        }
        Commands::Save(save) => {
            runtime
                .engine
                .initialize(&save.session.store, save.session.user.as_deref())
                .await?;
            let applied = runtime
                .engine
                .save_theme_preference(save.scope, save.preference())
                .await?;
            eprintln!("Saved {} preference", save.scope);
            print_json(&applied.theme)?;
        }
        Commands::Setting(SettingCommand::Get { key, scope }) => {
            let setting = runtime.store.get_setting(&key, scope).await?;
            print_json(&setting)?;
        }
        Commands::Setting(SettingCommand::Set { key, value, scope }) => {
            let value = serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));
            runtime.store.set_setting(&key, scope, value).await?;
            eprintln!("Saved {key} at {scope} scope");
        }
        Commands::Cache(CacheCommand::Stats) => {
            print_json(&runtime.store.get_cache_stats().await?)?;
        }
        Commands::Cache(CacheCommand::Clear) => {
            runtime.store.clear_cache().await?;
            eprintln!("Cleared {} adapter cache", runtime.store.adapter_name());
        }
    }

    Ok(())
}
