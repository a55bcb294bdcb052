//! Profile forms - apply a JSON document to the saved qualifications
//!
//! Loads the saved values from the local store, applies the document as the
//! edited form state and runs the selected save flow.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use profile_forms::config::FormsConfig;
use profile_forms::services::{
    Catalog, FileProfileStore, LogNavigator, LogNotifier, RuleValidator, SessionSignals,
};
use profile_forms::state::FormState;
use profile_forms::{FormSessionCoordinator, SaveFlowResult, Services, SessionMode};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "profile-forms",
    version,
    about = "Save qualification entries through the profile form workflow"
)]
struct Cli {
    /// JSON document holding the edited form values
    #[arg(required_unless_present = "write_config")]
    values: Option<PathBuf>,

    /// Workflow the form belongs to
    #[arg(long, value_enum, default_value_t = ModeArg::Edit)]
    mode: ModeArg,

    /// Save button to press
    #[arg(long, value_enum, default_value_t = FlowArg::Save)]
    flow: FlowArg,

    /// Path to config file (default: the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration and exit
    #[arg(long)]
    write_config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Create,
    Edit,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Create => SessionMode::Create,
            ModeArg::Edit => SessionMode::Edit,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FlowArg {
    /// Save and stay on the form
    Save,
    /// Save and go to the next section
    Next,
    /// Save and leave the form
    Finish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_forms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => FormsConfig::load_from(path)?,
        None => FormsConfig::load()?,
    };

    if cli.write_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        tracing::info!("Configuration written");
        return Ok(());
    }

    let Some(values_path) = cli.values else {
        anyhow::bail!("a values document is required");
    };

    let store = FileProfileStore::in_dir(config.store_dir.as_deref())?;
    tracing::info!("Using profile store {}", store.path().display());

    let services = Services {
        store: Arc::new(store),
        validator: Arc::new(RuleValidator::qualifications()),
        navigator: Arc::new(LogNavigator),
        notifier: Arc::new(LogNotifier),
        localizer: Arc::new(Catalog::english()),
        signals: Arc::new(SessionSignals::new()),
    };

    let session = FormSessionCoordinator::load(
        cli.mode.into(),
        config.layout(),
        None,
        config.routes.clone(),
        services,
    )
    .await?;

    let content = tokio::fs::read_to_string(&values_path)
        .await
        .with_context(|| format!("Failed to read {}", values_path.display()))?;
    let values: FormState = serde_json::from_str(&content)?;
    if !session.on_fields_changed(values) {
        tracing::info!("No changes to save");
        return Ok(());
    }

    let result = match cli.flow {
        FlowArg::Save => session.save().await,
        FlowArg::Next => session.save_and_advance().await,
        FlowArg::Finish => session.save_and_finish().await,
    };

    // Handle any errors
    if !matches!(result, SaveFlowResult::Succeeded) {
        eprintln!("Error: {result:?}");
        std::process::exit(1);
    }

    Ok(())
}
