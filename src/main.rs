// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};

use cms_translate::app_config::{Config, LogLevel, ProviderKind};
use cms_translate::database::{DatabaseConnection, Repository, TranslationRepository};
use cms_translate::entities::EntityKind;
use cms_translate::events::LogEventSink;
use cms_translate::orchestrator::{EntityReport, TranslationPipeline, orchestrator_for};
use cms_translate::providers::build_provider;
use cms_translate::{BatchController, BatchEntry, BatchReport};

/// CLI wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Google,
    Anthropic,
    Ollama,
    Mock,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Google => ProviderKind::Google,
            CliProvider::Anthropic => ProviderKind::Anthropic,
            CliProvider::Ollama => ProviderKind::Ollama,
            CliProvider::Mock => ProviderKind::Mock,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate one entity into every target language (or just one)
    Translate {
        /// Content type (package, blog, testimonial, gallery, section, navigation_item)
        #[arg(short, long)]
        kind: EntityKind,

        /// Entity id
        #[arg(short, long)]
        id: i64,

        /// Re-translate languages that already have a translation
        #[arg(short, long)]
        force: bool,

        /// Only translate into this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Translate every published entity of one content type
    Batch {
        /// Content type
        #[arg(short, long)]
        kind: EntityKind,

        /// Re-translate languages that already have a translation
        #[arg(short, long)]
        force: bool,
    },

    /// Translate every published entity of every content type
    BatchAll {
        /// Re-translate languages that already have a translation
        #[arg(short, long)]
        force: bool,
    },

    /// Show the stored translations of one entity
    Status {
        /// Content type
        #[arg(short, long)]
        kind: EntityKind,

        /// Entity id
        #[arg(short, long)]
        id: i64,
    },

    /// Create the database schema and print row counts
    InitDb,

    /// Generate shell completions for cms-translate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// cms-translate - automatic translation of CMS content
///
/// Translates packages, blog posts, testimonials, gallery items, sections and
/// navigation items from the source language into every site language.
#[derive(Parser, Debug)]
#[command(name = "cms-translate")]
#[command(version)]
#[command(about = "Automatic translation of CMS content into every site language")]
#[command(long_about = "cms-translate reads source-language CMS content from SQLite and stores one translation per entity and language.

EXAMPLES:
    cms-translate translate -k package -i 12              # Translate package #12
    cms-translate translate -k blog -i 3 -l en --force    # Re-translate blog #3 into English
    cms-translate batch -k gallery                        # Every published gallery item
    cms-translate batch-all --provider mock               # Dry run over all content
    cms-translate status -k section -i 1                  # Stored translations of section #1
    cms-translate completions bash > cms-translate.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google    - Google Cloud Translation (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    ollama    - Local Ollama server (default: llama3.2:3b)
    mock      - Offline provider that tags text with the target language")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Source language code (e.g. 'id')
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Comma-separated supported language codes, source included (e.g. 'id,en')
    #[arg(long, global = true, value_delimiter = ',')]
    languages: Option<Vec<String>>,

    /// Translation provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// SQLite database path
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "\x1B[1;31m"),
            Level::Warn => ("🚧 ", "\x1B[1;33m"),
            Level::Info => (" ", "\x1B[1;32m"),
            Level::Debug => ("🔍 ", "\x1B[1;36m"),
            Level::Trace => ("📋 ", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "cms-translate", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let repository = Arc::new(open_repository(&config)?);

    match cli.command {
        Commands::Translate { kind, id, force, language } => {
            let pipeline = build_pipeline(&config, repository)?;
            let orchestrator = orchestrator_for(kind);
            let report = match language {
                Some(language) => pipeline.translate_language(orchestrator, id, &language, force).await?,
                None => pipeline.translate_entity(orchestrator, id, force).await?,
            };
            print_entity_report(&report);
            if !report.is_success() {
                return Err(anyhow!("{} #{} failed for {} language(s)", kind, id, report.failed_count()));
            }
        }
        Commands::Batch { kind, force } => {
            let pipeline = build_pipeline(&config, repository)?;
            let controller = BatchController::new(Arc::new(pipeline)).with_progress(batch_progress_bar());
            let report = controller.translate_all(kind, force).await?;
            print_batch_report(&report);
        }
        Commands::BatchAll { force } => {
            let pipeline = build_pipeline(&config, repository)?;
            let controller = BatchController::new(Arc::new(pipeline)).with_progress(batch_progress_bar());
            for report in controller.translate_everything(force).await {
                print_batch_report(&report);
            }
        }
        Commands::Status { kind, id } => {
            let records = repository.list_translations(kind, id).await?;
            if records.is_empty() {
                println!("{} #{} has no stored translations", kind, id);
            }
            for record in records {
                println!(
                    "{} #{} [{}] auto={} created={} updated={}",
                    kind, id, record.language, record.is_auto_translated, record.created_at, record.updated_at
                );
                for (field, value) in &record.fields {
                    println!("    {}: {}", field, value.as_deref().unwrap_or("NULL"));
                }
            }
        }
        Commands::InitDb => {
            let stats = repository.connection().stats()?;
            info!("Database ready at {:?}", repository.connection().path());
            println!("{}", stats);
        }
        // Handled before the configuration is loaded
        Commands::Completions { .. } => {}
    }

    Ok(())
}

// Loads the config file and applies command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(source) = &cli.source_language {
        config.languages.source = source.clone();
    }
    if let Some(languages) = &cli.languages {
        config.languages.supported = languages.clone();
    }
    if let Some(provider) = &cli.provider {
        let kind: ProviderKind = provider.clone().into();
        if kind != config.provider.kind {
            config.provider.kind = kind;
            config.provider.model.clear();
            config.provider.endpoint.clear();
        }
    }
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn open_repository(config: &Config) -> Result<Repository> {
    match &config.database_path {
        Some(path) => Ok(Repository::new(DatabaseConnection::new(path)?)),
        None => Repository::new_default(),
    }
}

fn build_pipeline(config: &Config, repository: Arc<Repository>) -> Result<TranslationPipeline> {
    let provider = build_provider(&config.provider)?;
    info!(
        "Using {} ({}) for {} -> {}",
        config.provider.kind.display_name(),
        provider.name(),
        config.languages.source,
        config.languages.target_languages().join(", ")
    );
    Ok(TranslationPipeline::from_config(config, provider, repository, Arc::new(LogEventSink)))
}

fn batch_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entities ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}

fn print_entity_report(report: &EntityReport) {
    for outcome in report.languages.iter().chain(report.related.iter()) {
        println!("{} #{} [{}] {}", outcome.kind, outcome.entity_id, outcome.language, outcome.status);
        if !outcome.skipped_fields.is_empty() {
            warn!("Fields not stored: {}", outcome.skipped_fields.join(", "));
        }
    }
}

fn print_batch_report(report: &BatchReport) {
    if let Some(listing_error) = &report.error {
        error!("{}: {}", report.kind, listing_error);
        return;
    }

    for entry in &report.entries {
        if let BatchEntry::Failed { entity_id, error } = entry {
            error!("{} #{} failed: {}", report.kind, entity_id, error);
        }
    }

    println!(
        "{}: {} entities, {} failed, {} failed languages",
        report.kind,
        report.total(),
        report.failed(),
        report.language_failures()
    );
}
