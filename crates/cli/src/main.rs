use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use armgen_astmodel::prelude::{IdentifierFactory, TypeDefinitionSet};
use armgen_config::ObjectModelConfiguration;
use armgen_pipeline::{default_pipeline, StageContext};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "armgenctl", version, about = "Armgen resource type generator")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "format", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the default pipeline over a definition set
    Generate {
        /// Object model configuration (YAML)
        #[arg(long = "config")]
        config: Option<PathBuf>,
        /// Input definition set (JSON array)
        #[arg(long = "input")]
        input: PathBuf,
        /// Where to write the resulting set; stdout when omitted
        #[arg(long = "output")]
        output: Option<PathBuf>,
        /// Stop after this stage, e.g. "applyArmConversionInterface"
        #[arg(long = "stop-after")]
        stop_after: Option<String>,
    },
    /// List the default stage catalogue
    Stages,
    /// Parse a configuration file without running the pipeline
    CheckConfig {
        /// Object model configuration (YAML)
        #[arg(long = "config")]
        config: PathBuf,
    },
}

fn init_tracing() {
    let env = std::env::var("ARMGEN_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate { config, input, output, stop_after } => {
            let configuration = load_config(config.as_deref())?;
            let text = std::fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let definitions: TypeDefinitionSet =
                serde_json::from_str(&text).with_context(|| format!("parsing definitions from {}", input.display()))?;
            info!(definitions = definitions.len(), input = %input.display(), "loaded definitions");

            let ids = IdentifierFactory::new();
            let ctx = StageContext::new(&configuration, &ids);
            let pipeline = default_pipeline();
            let result = match stop_after.as_deref() {
                Some(stage) => pipeline.run_until(definitions, &ctx, stage)?,
                None => pipeline.run(definitions, &ctx)?,
            };

            let resources = result.resources().count();
            match output {
                Some(path) => {
                    let body = serde_json::to_string_pretty(&result)?;
                    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
                    match cli.output {
                        Output::Human => println!("wrote {} definitions ({} resources) to {}", result.len(), resources, path.display()),
                        Output::Json => println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "definitions": result.len(),
                                "resources": resources,
                                "output": path.display().to_string(),
                            }))?
                        ),
                    }
                }
                None => match cli.output {
                    Output::Human => {
                        for def in &result {
                            println!("{} • {}", def.name(), def.ty());
                        }
                        println!("{} definitions • {} resources", result.len(), resources);
                    }
                    Output::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                },
            }
        }
        Commands::Stages => {
            let pipeline = default_pipeline();
            match cli.output {
                Output::Human => {
                    for (i, stage) in pipeline.stages().enumerate() {
                        if stage.prerequisites().is_empty() {
                            println!("{:>2}. {} • {}", i + 1, stage.id(), stage.description());
                        } else {
                            println!("{:>2}. {} • {} (after {})", i + 1, stage.id(), stage.description(), stage.prerequisites().join(", "));
                        }
                    }
                }
                Output::Json => {
                    let rows: Vec<_> = pipeline
                        .stages()
                        .map(|s| json!({ "id": s.id(), "description": s.description(), "prerequisites": s.prerequisites() }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
            }
        }
        Commands::CheckConfig { config } => {
            let configuration = load_config(Some(&config))?;
            let summary = configuration.summary();
            match cli.output {
                Output::Human => println!(
                    "ok • groups={} versions={} types={} properties={}",
                    summary.groups, summary.versions, summary.types, summary.properties
                ),
                Output::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ObjectModelConfiguration> {
    let Some(path) = path else { return Ok(ObjectModelConfiguration::default()) };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let configuration =
        ObjectModelConfiguration::parse(&text).with_context(|| format!("parsing configuration {}", path.display()))?;
    info!(path = %path.display(), summary = ?configuration.summary(), "loaded configuration");
    Ok(configuration)
}
