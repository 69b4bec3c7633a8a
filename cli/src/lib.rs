//! Command-line front end: load a parameter document, run one generator,
//! print the task list as JSON.

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use kepler_uow::CatalogLookup;
use kepler_uow::InMemoryCatalog;
use kepler_uow::InMemoryLogStore;
use kepler_uow::LogStore;
use kepler_uow::UnitOfWorkTaskGenerator;
use kepler_uow::UowParameters;
use kepler_uow::generator::CadenceUowTaskGenerator;
use kepler_uow::generator::KeplerIdChunkCadenceUowTaskGenerator;
use kepler_uow::generator::KeplerIdChunkUowTaskGenerator;
use kepler_uow::generator::KicGroupUowTaskGenerator;
use kepler_uow::generator::ModOutCadenceUowTaskGenerator;
use kepler_uow::generator::ModOutUowTaskGenerator;

#[derive(Debug, Parser)]
#[command(name = "uow-gen", version, about = "Split a pipeline launch into unit-of-work tasks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: GeneratorCommand,

    /// TOML document holding the parameter sections.
    #[arg(long, short = 'p', global = true, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// JSON object mapping Kepler ID to sky group.
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// JSON array of pixel log records.
    #[arg(long, global = true, value_name = "FILE")]
    pub pixel_logs: Option<PathBuf>,

    /// List the parameter sections the generator requires and exit.
    #[arg(long, global = true)]
    pub show_required: bool,

    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum GeneratorCommand {
    /// Cadence ranges.
    Cadence,
    /// Channels or channel groups.
    ModOut,
    /// Channels crossed with cadence ranges.
    ModOutCadence,
    /// Kepler ID chunks per sky group.
    KeplerIdChunk,
    /// Kepler ID chunks crossed with cadence ranges.
    KeplerIdChunkCadence,
    /// Fixed-size Kepler ID intervals.
    KicGroup,
}

/// Runs the selected generator and returns what should go to stdout.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let log_store = cli
        .pixel_logs
        .as_deref()
        .map(load_log_store)
        .transpose()?;
    let catalog = cli.catalog.as_deref().map(load_catalog).transpose()?;

    match cli.command {
        GeneratorCommand::Cadence => {
            let mut generator = CadenceUowTaskGenerator::new();
            if let Some(log_store) = log_store {
                generator = generator.with_log_store(log_store);
            }
            render(&generator, cli)
        }
        GeneratorCommand::ModOut => render(&ModOutUowTaskGenerator, cli),
        GeneratorCommand::ModOutCadence => {
            let mut generator = ModOutCadenceUowTaskGenerator::new();
            if let Some(log_store) = log_store {
                generator = generator.with_log_store(log_store);
            }
            render(&generator, cli)
        }
        GeneratorCommand::KeplerIdChunk => {
            render(&KeplerIdChunkUowTaskGenerator::new(require_catalog(catalog)?), cli)
        }
        GeneratorCommand::KeplerIdChunkCadence => render(
            &KeplerIdChunkCadenceUowTaskGenerator::new(require_catalog(catalog)?),
            cli,
        ),
        GeneratorCommand::KicGroup => {
            let mut generator = KicGroupUowTaskGenerator::new();
            if let Some(catalog) = catalog {
                generator = generator.with_catalog(catalog);
            }
            render(&generator, cli)
        }
    }
}

fn render<G: UnitOfWorkTaskGenerator>(generator: &G, cli: &Cli) -> anyhow::Result<String> {
    if cli.show_required {
        return Ok(generator
            .required_parameters()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"));
    }

    let path = cli
        .params
        .as_deref()
        .context("--params is required to generate tasks")?;
    let params = UowParameters::load(path)
        .with_context(|| format!("failed to load parameters from {}", path.display()))?;

    let tasks = generator
        .generate_tasks(&params)
        .with_context(|| format!("{} task generation failed", generator.name()))?;
    tracing::info!(generator = generator.name(), tasks = tasks.len(), "writing task list");

    let json = if cli.pretty {
        serde_json::to_string_pretty(&tasks)?
    } else {
        serde_json::to_string(&tasks)?
    };
    Ok(json)
}

fn load_log_store(path: &Path) -> anyhow::Result<Arc<dyn LogStore>> {
    let log_store = InMemoryLogStore::from_json_path(path)?;
    Ok(Arc::new(log_store))
}

fn load_catalog(path: &Path) -> anyhow::Result<Arc<dyn CatalogLookup>> {
    let catalog = InMemoryCatalog::from_json_path(path)?;
    tracing::info!(entries = catalog.len(), path = %path.display(), "loaded catalog");
    Ok(Arc::new(catalog))
}

fn require_catalog(catalog: Option<Arc<dyn CatalogLookup>>) -> anyhow::Result<Arc<dyn CatalogLookup>> {
    catalog.context("--catalog is required for Kepler ID chunk generation")
}
