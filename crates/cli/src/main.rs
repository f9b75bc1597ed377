//! Intent Router CLI
//!
//! A thin wrapper around agent-router-core that provides the interactive prompt.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use agent_router_core::{
    AppConfig, Calculator, ConfigOverrides, GeminiClient, GoogleTranslator, Router,
    RouterSettings, Session, Transcript, Variant,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "agent-router")]
#[command(about = "Route chat input to a calculator, a translator or Gemini")]
struct Args {
    /// Assistant variant (defaults to the config file, then agent)
    #[arg(long, value_enum)]
    level: Option<VariantArg>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transcript file to append to
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Gemini model name
    #[arg(long)]
    model: Option<String>,

    /// Drop raw expressions that overlap an "add/multiply X and Y" phrase
    #[arg(long)]
    dedupe: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    #[value(alias = "level1")]
    Basic,
    #[value(alias = "level2")]
    Calculator,
    #[value(alias = "level3")]
    Agent,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Basic => Variant::Basic,
            VariantArg::Calculator => Variant::Calculator,
            VariantArg::Agent => Variant::Agent,
        }
    }
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            variant: self.level.map(Variant::from),
            transcript: self.transcript.clone(),
            model: self.model.clone(),
            dedupe_overlapping_matches: self.dedupe,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let config = AppConfig::load(&args.overrides())?;
    tracing::debug!(
        variant = config.variant.as_str(),
        model = %config.model,
        transcript = %config.transcript_path.display(),
        "Configuration loaded"
    );

    let evaluator = Calculator;
    let translator = GoogleTranslator::new(&config.translation, config.request_timeout)?;
    let model = GeminiClient::new(&config)?;

    let router = Router::new(RouterSettings::from(&config), &evaluator, &translator, &model);
    let transcript = Transcript::new(&config.transcript_path);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&router, &transcript).run(stdin.lock(), stdout.lock())?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
