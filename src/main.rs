use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use rdf_entity_exporter::{
    config::{Configuration, OutputFormat},
    core::{HashDedupeBag, ProducerFlag, ProducerPolicy, RdfBuilder},
    lookup::{InMemoryEntityLookup, StaticPageProps},
    sink::TripleStats,
    model::{EntityDocument, EntityId},
    utils::{validate_rdf_triples, RdfSerializer},
};

#[derive(Parser)]
#[command(
    name = "rdf_entity_exporter",
    about = "Export knowledge-base entities as RDF",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export entity documents as RDF
    Export {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Entity JSON files or directories
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,

        /// Comma separated producer flags (overrides config)
        #[arg(long, value_delimiter = ',')]
        flags: Option<Vec<String>>,

        /// Stub entities referenced by values
        #[arg(long)]
        resolve: bool,

        /// Entity JSON files or directories used to resolve referenced entities
        #[arg(long)]
        lookup: Vec<PathBuf>,

        /// Redirects as FROM=TO, e.g. Q100=Q42
        #[arg(long)]
        redirect: Vec<String>,

        /// Write the dump header
        #[arg(long)]
        dump_header: bool,

        /// Page properties JSON file ({"Q1": {"wb-claims": 3}})
        #[arg(long)]
        page_props: Option<PathBuf>,

        /// Check the output triples before writing
        #[arg(long)]
        validate: bool,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long)]
        output: PathBuf,

        /// Configuration format (yaml or json)
        #[arg(short, long, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// List producer flags
    ListFlags,
}

#[derive(clap::ValueEnum, Clone)]
enum OutputFormatArg {
    Turtle,
    NTriples,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::Turtle => Self::Turtle,
            OutputFormatArg::NTriples => Self::NTriples,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone)]
enum ConfigFormat {
    Yaml,
    Json,
}

struct ExportOptions {
    output: Option<PathBuf>,
    format: Option<OutputFormatArg>,
    flags: Option<Vec<String>>,
    resolve: bool,
    lookup: Vec<PathBuf>,
    redirects: Vec<String>,
    dump_header: bool,
    page_props: Option<PathBuf>,
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            config,
            input,
            output,
            format,
            flags,
            resolve,
            lookup,
            redirect,
            dump_header,
            page_props,
            validate,
        } => {
            let options = ExportOptions {
                output,
                format,
                flags,
                resolve,
                lookup,
                redirects: redirect,
                dump_header,
                page_props,
                validate,
            };
            export_command(config, input, options).await
        }
        Commands::Validate { config } => validate_command(config).await,
        Commands::GenerateConfig { output, format } => generate_config_command(output, format).await,
        Commands::ListFlags => list_flags_command(),
    }
}

/// Entity files under `paths`, directories walked recursively in name order
fn collect_entity_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to read directory: {}", path.display()))?;
            let is_entity_file = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == "json" || ext == "jsonl" || ext == "ndjson");
            if entry.file_type().is_file() && is_entity_file {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

async fn load_documents(paths: &[PathBuf]) -> Result<Vec<EntityDocument>> {
    let mut documents = Vec::new();
    for path in collect_entity_files(paths)? {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read entity file: {}", path.display()))?;
        let parsed = EntityDocument::parse_many(&content)
            .with_context(|| format!("Failed to parse entity file: {}", path.display()))?;
        info!("Loaded {} entities from {}", parsed.len(), path.display());
        documents.extend(parsed);
    }
    Ok(documents)
}

fn parse_redirect(value: &str) -> Result<(EntityId, EntityId)> {
    let (from, to) = value
        .split_once('=')
        .with_context(|| format!("Redirect must look like FROM=TO: {}", value))?;
    Ok((EntityId::parse(from.trim())?, EntityId::parse(to.trim())?))
}

async fn export_command(config_path: PathBuf, input: Vec<PathBuf>, options: ExportOptions) -> Result<()> {
    eprintln!("{}", "Starting RDF export...".bright_blue().bold());

    let mut config = Configuration::from_file(&config_path)?;
    if let Some(flags) = options.flags {
        config.flags = flags;
    }
    if let Some(format) = options.format {
        config.output_format = format.into();
    }
    config.validate()?;

    let policy = config.policy()?;
    eprintln!(" Configuration: {}", config.name.bright_green());
    eprintln!(" Flags: {}", policy.to_string().bright_cyan());

    let documents = load_documents(&input).await?;
    eprintln!(" Entities: {}", documents.len());

    let redirects = options
        .redirects
        .iter()
        .map(|value| parse_redirect(value))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = RdfBuilder::from_config(&config, Arc::new(HashDedupeBag::new()))?;
    if let Some(path) = &options.page_props {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read page properties: {}", path.display()))?;
        let props = StaticPageProps::from_json(&content).context("Failed to parse page properties")?;
        builder.set_page_props(Box::new(props));
    }

    builder.start_document();
    if options.dump_header {
        builder.add_dump_header(Utc::now().timestamp());
    }

    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.dim} [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );

    for document in &documents {
        progress.set_message(document.id.to_string());
        builder.add_entity(document);
        if let (Some(revision), Some(modified)) = (document.lastrevid, document.modified) {
            builder.add_entity_revision_info(&document.id, revision, modified);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    for (from, to) in &redirects {
        builder.add_entity_redirect(from, to);
    }

    if options.resolve {
        if !policy.contains(ProducerFlag::ResolvedEntities) {
            warn!("--resolve has no effect without the {} flag", ProducerFlag::ResolvedEntities.name());
        }
        let mut known = load_documents(&options.lookup).await?;
        known.extend(documents.iter().cloned());
        builder.resolve_mentioned_entities(&InMemoryEntityLookup::new(known));
    }

    let triples = builder.get_rdf();
    builder.log_summary();
    debug!("{}", TripleStats::of(&triples));

    if options.validate {
        let issues = validate_rdf_triples(&triples);
        for issue in &issues {
            warn!("{}", issue);
        }
        if !issues.is_empty() {
            eprintln!(" {} validation issues", issues.len().to_string().bright_yellow());
        }
    }

    let serialized = RdfSerializer::new().serialize(&triples, &config.output_format, builder.prefixes())?;
    match &options.output {
        Some(path) => {
            tokio::fs::write(path, &serialized)
                .await
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!(" Export written to: {}", path.display().to_string().bright_green());
        }
        None => print!("{}", serialized),
    }

    print_summary(&builder, policy);
    Ok(())
}

fn print_summary(builder: &RdfBuilder, policy: ProducerPolicy) {
    let report = builder.report();

    eprintln!("\n{}", " Export Summary".bright_green().bold());
    eprintln!(" Entities: {}", report.entities.to_string().bright_cyan());
    eprintln!(" Stubs: {}", report.stubs.to_string().bright_cyan());
    eprintln!(" Redirects: {}", report.redirects.to_string().bright_cyan());
    eprintln!(" Triples: {}", report.triples.to_string().bright_cyan());
    if policy.contains(ProducerFlag::ResolvedEntities) {
        let unresolved = builder.mentioned_entities();
        if !unresolved.is_empty() {
            eprintln!(" Unresolved mentions: {}", unresolved.len().to_string().bright_yellow());
        }
    }

    if report.skipped.is_empty() {
        eprintln!(" {} completed successfully!", "Export".bright_green());
    } else {
        for item in &report.skipped {
            eprintln!("  - {}", item.to_string().bright_yellow());
        }
        eprintln!(" {} completed with {} skipped items", "Export".bright_yellow(), report.skipped.len());
    }
}

async fn validate_command(config_path: PathBuf) -> Result<()> {
    println!("{}", " Validating configuration...".bright_blue().bold());

    match Configuration::from_file(&config_path) {
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!(" Configuration is valid!");
                println!(" Name: {}", config.name.bright_green());
                println!(" Version: {}", config.version);
                println!(" Concept base: {}", config.vocabulary.concept_base);
                println!(" Sites: {}", config.sites.len());
                println!(" Flags: {}", config.flags.join(", "));
                Ok(())
            }
            Err(e) => {
                error!(" Configuration validation failed: {}", e);
                Err(e)
            }
        },
        Err(e) => {
            error!(" Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

async fn generate_config_command(output_path: PathBuf, format: ConfigFormat) -> Result<()> {
    println!("{}", " Generating example configuration...".bright_blue().bold());

    let config = Configuration::example();

    let content = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };

    write_file(&output_path, content).await?;

    println!(" Example configuration generated at: {}", output_path.display().to_string().bright_green());
    println!(" Edit the file to point at your repository's URIs and sites");

    Ok(())
}

async fn write_file(path: &Path, content: String) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn list_flags_command() -> Result<()> {
    println!("{}", " Producer flags".bright_blue().bold());
    for flag in ProducerFlag::ALL {
        println!("  {} {}", format!("{:<20}", flag.name()).bright_cyan(), flag.description());
    }
    println!("  {} every flag above", format!("{:<20}", "all").bright_cyan());
    Ok(())
}
