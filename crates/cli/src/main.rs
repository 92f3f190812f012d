//! AsyncAPI to OpenAPI CLI
//!
//! Command-line interface for turning realtime AsyncAPI specs into OpenAPI
//! documents and event-handler modules.

use anyhow::{Context, Result};
use asyncapi_openapi_common::{ClientMessagesSource, RenameMode, TransformConfig};
use asyncapi_openapi_generator::{HandlerGenerator, HandlerOptions};
use asyncapi_openapi_transform::{transform, transform_files, TransformOutput};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asyncapi-openapi")]
#[command(version, about = "Turn AsyncAPI message specs into OpenAPI documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform an AsyncAPI spec into an OpenAPI document
    #[command(after_help = "EXAMPLES:\n  \
        # Use the defaults (../schemas/realtime.yml -> openapi-transformed.yaml)\n  \
        asyncapi-openapi transform\n\n  \
        # Explicit files and publish messages\n  \
        asyncapi-openapi transform \\\n    \
        --input realtime.yml \\\n    \
        --template template-openapi.yaml \\\n    \
        --output openapi.yaml \\\n    \
        --publish StartRecognition,AddAudio,EndOfStream\n\n  \
        # Settings from a config file\n  \
        asyncapi-openapi transform --config bridge.yaml")]
    Transform {
        #[command(flatten)]
        spec: SpecArgs,

        /// OpenAPI template to merge schemas into
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where ClientMessages takes its names from
        #[arg(long)]
        client_messages: Option<ClientMessagesArg>,
    },

    /// Show how messages are split into publish and subscribe
    Classify {
        #[command(flatten)]
        spec: SpecArgs,

        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the event-handler module for server messages
    #[command(after_help = "EXAMPLES:\n  \
        asyncapi-openapi handlers \\\n    \
        --input realtime.yml \\\n    \
        --output src/realtime/handlers.rs")]
    Handlers {
        #[command(flatten)]
        spec: SpecArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Module path of the generated models
        #[arg(long, default_value = "crate::realtime::models")]
        models_path: String,

        /// Generate future-returning handlers and an async dispatcher
        #[arg(long = "async")]
        asynchronous: bool,
    },
}

/// Options shared by every command that reads a spec
#[derive(Args)]
struct SpecArgs {
    /// YAML config file (flags override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// AsyncAPI spec file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Comma-separated list of client-originated message names
    #[arg(short, long, value_delimiter = ',')]
    publish: Option<Vec<String>>,

    /// Comma-separated list of type names to prefix
    #[arg(long, value_delimiter = ',')]
    rename: Option<Vec<String>>,

    /// Prefix for renamed types
    #[arg(long)]
    prefix: Option<String>,

    /// How renamed types are located
    #[arg(long)]
    rename_mode: Option<RenameModeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenameModeArg {
    /// Exact match on schema keys and $ref targets
    Tree,
    /// Left-bounded match on the raw text
    Text,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ClientMessagesArg {
    /// Same list as ServerMessages
    Subscribe,
    /// Client-originated messages
    Publish,
}

impl From<RenameModeArg> for RenameMode {
    fn from(arg: RenameModeArg) -> Self {
        match arg {
            RenameModeArg::Tree => RenameMode::Tree,
            RenameModeArg::Text => RenameMode::Text,
        }
    }
}

impl From<ClientMessagesArg> for ClientMessagesSource {
    fn from(arg: ClientMessagesArg) -> Self {
        match arg {
            ClientMessagesArg::Subscribe => ClientMessagesSource::Subscribe,
            ClientMessagesArg::Publish => ClientMessagesSource::Publish,
        }
    }
}

impl SpecArgs {
    /// Config file (or defaults) with command-line overrides applied
    fn resolve(&self) -> Result<TransformConfig> {
        let mut config = match &self.config {
            Some(path) => TransformConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TransformConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(publish) = &self.publish {
            config.publish_messages = publish.clone();
        }
        if let Some(rename) = &self.rename {
            config.rename_targets = rename.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.rename_prefix = prefix.clone();
        }
        if let Some(mode) = self.rename_mode {
            config.rename_mode = mode.into();
        }

        config.validate().context("Invalid configuration")?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Transform {
            spec,
            template,
            output,
            client_messages,
        } => {
            let mut config = spec.resolve()?;
            if let Some(template) = template {
                config.template_path = template;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(source) = client_messages {
                config.client_messages_source = source.into();
            }
            transform_command(&config, cli.verbose)?;
        }

        Commands::Classify { spec, json } => {
            let config = spec.resolve()?;
            classify_command(&config, json)?;
        }

        Commands::Handlers {
            spec,
            output,
            models_path,
            asynchronous,
        } => {
            let config = spec.resolve()?;
            let options = HandlerOptions {
                models_path,
                asynchronous,
                ..HandlerOptions::default()
            };
            handlers_command(&config, &output, options, cli.verbose)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn transform_command(config: &TransformConfig, verbose: bool) -> Result<()> {
    println!(
        "{} Transforming spec: {}",
        "→".cyan(),
        config.input_path.display()
    );

    if verbose {
        println!("  Template: {}", config.template_path.display());
        println!("  Output: {}", config.output_path.display());
        println!("  Publish: {}", config.publish_messages.join(", "));
        println!(
            "  Rename: {} ({:?}, prefix {})",
            config.rename_targets.join(", "),
            config.rename_mode,
            config.rename_prefix
        );
        println!("  ClientMessages: {:?}", config.client_messages_source);
    }

    let output = transform_files(config).context("Failed to transform AsyncAPI spec")?;

    println!("\n{}", "✓ Transformation complete!".green().bold());
    println!("\n{}", "Summary:".bold());
    println!(
        "  Messages: {} ({} publish, {} subscribe)",
        output.classification.len(),
        output.classification.publish.len(),
        output.classification.subscribe.len()
    );
    println!("  Schemas: {}", output.schema_names().len());
    if let Some(line) = warning_summary(&output) {
        println!("  {}", line.yellow());
    }
    println!("  📄 {}", config.output_path.display());

    if verbose {
        println!("\n{}", "Schemas:".bold());
        for name in output.schema_names() {
            println!("  • {}", name.cyan());
        }
    }

    Ok(())
}

fn classify_command(config: &TransformConfig, json: bool) -> Result<()> {
    let output = transform_spec_only(config)?;

    if json {
        let rendered = serde_json::to_string_pretty(&output.classification)
            .context("Failed to serialize classification")?;
        println!("{}", rendered);
        return Ok(());
    }

    if let Some(line) = warning_summary(&output) {
        println!("{}", line.yellow());
    }

    println!("\n{}", "Publish (client → server):".bold());
    for name in &output.classification.publish {
        println!("  • {}", name.cyan());
    }

    println!("\n{}", "Subscribe (server → client):".bold());
    for name in &output.classification.subscribe {
        println!("  • {}", name.yellow());
    }

    Ok(())
}

fn handlers_command(
    config: &TransformConfig,
    output: &Path,
    options: HandlerOptions,
    verbose: bool,
) -> Result<()> {
    println!(
        "{} Generating handlers from: {}",
        "→".cyan(),
        config.input_path.display()
    );

    let transformed = transform_spec_only(config)?;
    if let Some(line) = warning_summary(&transformed) {
        println!("  {}", line.yellow());
    }

    let generator = HandlerGenerator::new(&transformed.classification, options)
        .context("Failed to create generator")?;

    if verbose {
        for name in generator.messages() {
            println!("  handle_{}", asyncapi_openapi_generator::to_snake_case(name));
        }
    }

    generator
        .generate_to_file(output)
        .context("Failed to generate handlers")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!(
        "  📄 {} ({} handlers)",
        output.display(),
        generator.messages().len()
    );

    Ok(())
}

/// Run the pipeline on the configured spec without a template or output file
fn transform_spec_only(config: &TransformConfig) -> Result<TransformOutput> {
    let spec = std::fs::read_to_string(&config.input_path)
        .with_context(|| format!("Failed to read {}", config.input_path.display()))?;

    transform(&spec, "{}", config).context("Failed to parse AsyncAPI spec")
}

/// Count line for the summary; the warnings themselves are logged by the pipeline
fn warning_summary(output: &TransformOutput) -> Option<String> {
    match output.warnings.len() {
        0 => None,
        1 => Some("⚠ 1 warning (see log)".to_string()),
        n => Some(format!("⚠ {} warnings (see log)", n)),
    }
}
