//! `sitecfg`: command-line editor for the site configuration.
//!
//! Every command starts from [`PersistenceOrchestrator::load`], so it sees
//! the same effective configuration the page would render.  Mutating
//! commands edit that value in memory and hand it back to
//! [`PersistenceOrchestrator::save`], then print the save status.
//!
//! ```text
//! sitecfg show hero.title
//! sitecfg set hero.title '"Nova coleção"'
//! sitecfg add-item projects.items
//! sitecfg remove-image projects.items.0 1
//! sitecfg --require-publish import site-config.json
//! sitecfg --json reset --yes
//! ```
//!
//! The exit code is non-zero when a save did not succeed, or, with
//! `--require-publish`, when it did not reach the published file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde_json::Value;
use sitecfg_core::{append_item, get_path, remove_item, set_path, ConfigPath, SaveResult};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sitecfg_store::application::persistence::PersistenceOrchestrator;
use sitecfg_store::infrastructure::bootstrap::build_orchestrator;
use sitecfg_store::infrastructure::settings::{
    load_settings_from, save_settings_to, settings_file_path, Settings,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Edit, publish and reset the site configuration.
#[derive(Debug, Parser)]
#[command(name = "sitecfg", about = "Site configuration editor", version)]
struct Cli {
    /// Settings file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "SITECFG_SETTINGS")]
    settings: Option<PathBuf>,

    /// Base location of the site (`http(s)://…/` or `file:///…/`).
    /// Overrides `site.base_url`.
    #[arg(long, global = true, env = "SITECFG_SITE")]
    site: Option<String>,

    /// Published file to write on save.  Overrides `publish.target`.
    #[arg(long, global = true, env = "SITECFG_PUBLISH_TARGET")]
    target: Option<PathBuf>,

    /// Write the published file without asking first.
    #[arg(long, global = true)]
    no_confirm: bool,

    /// Print save results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Exit non-zero unless a save updated the published file.
    #[arg(long, global = true)]
    require_publish: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective configuration, or the value at PATH.
    Show { path: Option<String> },
    /// Print a short overview of every section.
    Summary,
    /// Set the value at PATH.  VALUE is parsed as JSON, else taken as text.
    Set { path: String, value: String },
    /// Append a new item, shaped like the first default item, to a list.
    AddItem { list: String },
    /// Remove the list item at ITEM, e.g. `media.items.2`.
    RemoveItem { item: String },
    /// Remove image INDEX from the gallery of a project or collection item.
    /// A gallery left empty gets the placeholder image.
    RemoveImage { item: String, index: usize },
    /// Give every project and collection item a non-empty gallery.
    Normalize,
    /// Load a configuration file, complete it with defaults and save it.
    Import { file: PathBuf },
    /// Write the effective configuration to a file.
    Export { file: PathBuf },
    /// Save the default configuration.
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Write a settings file with every default spelled out.
    InitSettings {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    fn settings_path(&self) -> anyhow::Result<PathBuf> {
        match &self.settings {
            Some(path) => Ok(path.clone()),
            None => settings_file_path().context("locating the settings file"),
        }
    }

    /// Applies command-line overrides on top of the settings file.
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(site) = &self.site {
            settings.site.base_url = site.clone();
        }
        if let Some(target) = &self.target {
            settings.publish.target = Some(target.clone());
        }
        if self.no_confirm {
            settings.publish.confirm = false;
        }
    }
}

/// Parses a command-line value: JSON when it parses, a plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn report(result: &SaveResult, cli: &Cli) -> anyhow::Result<ExitCode> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", result.status());
    }
    Ok(if save_succeeded(result, cli.require_publish) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn save_succeeded(result: &SaveResult, require_publish: bool) -> bool {
    result.ok && (!require_publish || result.status().is_published())
}

async fn confirm(prompt: String) -> anyhow::Result<bool> {
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact_opt()
    })
    .await??;
    Ok(answer == Some(true))
}

fn print_summary(orchestrator: &PersistenceOrchestrator, config: &sitecfg_core::SiteConfig) {
    println!("source:      {}", orchestrator.remote_location());
    println!(
        "publishing:  {}",
        if orchestrator.has_file_capability() {
            "enabled"
        } else {
            "disabled (saves stay on this machine)"
        }
    );
    println!("hero:        {}", config.hero.title);
    println!("stats:       {}", config.about.stats.len());
    println!("services:    {}", config.services.len());
    println!("collections: {}", config.collections.items.len());
    println!("projects:    {}", config.projects.items.len());
    println!("media:       {}", config.media.items.len());
    println!("steps:       {}", config.process.steps.len());
    println!("whatsapp:    {}", config.whatsapp.number);
}

async fn run(cli: Cli, settings: Settings) -> anyhow::Result<ExitCode> {
    if let Command::InitSettings { force } = &cli.command {
        let force = *force;
        let path = cli.settings_path()?;
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        save_settings_to(&path, &settings)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let orchestrator = build_orchestrator(&settings).context("configuring storage")?;

    match &cli.command {
        Command::Show { path } => {
            let config = orchestrator.load().await;
            let value = match path {
                Some(raw) => {
                    let path = ConfigPath::parse(raw)?;
                    get_path(&config, &path)
                        .cloned()
                        .with_context(|| format!("nothing at `{path}`"))?
                }
                None => config,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Summary => {
            let config = orchestrator
                .load_typed()
                .await
                .context("the stored configuration does not match the site schema")?;
            print_summary(&orchestrator, &config);
            Ok(ExitCode::SUCCESS)
        }
        Command::Set { path, value } => {
            let path = ConfigPath::parse(path)?;
            let mut config = orchestrator.load().await;
            set_path(&mut config, &path, parse_value(value))?;
            debug!("set {path}");
            report(&orchestrator.save(&config).await, &cli)
        }
        Command::AddItem { list } => {
            let path = ConfigPath::parse(list)?;
            let mut config = orchestrator.load().await;
            let index = append_item(&mut config, &path)?;
            info!("added {path}.{index}");
            report(&orchestrator.save(&config).await, &cli)
        }
        Command::RemoveItem { item } => {
            let path = ConfigPath::parse(item)?;
            let mut config = orchestrator.load().await;
            remove_item(&mut config, &path)?;
            info!("removed {path}");
            report(&orchestrator.save(&config).await, &cli)
        }
        Command::RemoveImage { item, index } => {
            let path = ConfigPath::parse(item)?;
            let mut config = orchestrator
                .load_typed()
                .await
                .context("the stored configuration does not match the site schema")?;
            let removed = config.remove_gallery_image(&path, *index)?;
            info!("removed {} from {path}", removed.src);
            report(&orchestrator.save_typed(&config).await, &cli)
        }
        Command::Normalize => {
            let mut config = orchestrator
                .load_typed()
                .await
                .context("the stored configuration does not match the site schema")?;
            let seeded = config.normalize_galleries();
            info!("seeded {seeded} galleries");
            report(&orchestrator.save_typed(&config).await, &cli)
        }
        Command::Import { file } => {
            let result = orchestrator
                .import_file(file)
                .await
                .with_context(|| format!("importing {}", file.display()))?;
            report(&result, &cli)
        }
        Command::Export { file } => {
            let config = orchestrator.load().await;
            orchestrator
                .export_to(&config, file)
                .await
                .with_context(|| format!("exporting to {}", file.display()))?;
            println!("exported to {}", file.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset { yes } => {
            if !*yes && !confirm("Restore the default configuration?".to_string()).await? {
                println!("{}", SaveResult::cancelled().status());
                return Ok(ExitCode::SUCCESS);
            }
            report(&orchestrator.reset().await, &cli)
        }
        Command::InitSettings { .. } => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings_path = cli.settings_path()?;
    let loaded = load_settings_from(&settings_path);

    // `RUST_LOG` wins; otherwise the settings file's level, then `info`.
    let level = loaded
        .as_ref()
        .map(|s| s.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let mut settings =
        loaded.with_context(|| format!("loading settings from {}", settings_path.display()))?;
    cli.apply_overrides(&mut settings);
    debug!("settings: {settings:?}");

    run(cli, settings).await
}
