use clap::Parser;
use gausstable::{init_filter, GaussConfig, GaussError, GaussTable, SpanMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Gaussian scale-space table builder (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Print a human-readable dump of the tables to stderr.
    #[arg(long)]
    print_tables: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

/// Span mode accepted under the names `SpanMode` parses.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "String")]
struct SpanModeConfig(SpanMode);

impl TryFrom<String> for SpanModeConfig {
    type Error = GaussError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map(SpanModeConfig)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    sigma0: f32,
    levels: usize,
    initial_blur: f32,
    span_mode: SpanModeConfig,
    output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sigma0: gausstable::DEFAULT_SIGMA0,
            levels: gausstable::DEFAULT_LEVELS,
            initial_blur: gausstable::DEFAULT_INITIAL_BLUR,
            span_mode: SpanModeConfig::default(),
            output_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct LevelRecord {
    level: usize,
    sigma: f32,
    span: usize,
    taps: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct Output {
    epoch: u64,
    initial_sigma: f32,
    required_filter_stages: usize,
    incremental: Vec<LevelRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    from_level_1: Vec<LevelRecord>,
}

fn half_taps(row: &[f32], span: usize) -> Vec<f32> {
    row.iter().take(span + 1).copied().collect()
}

fn incremental_records(table: &GaussTable) -> Vec<LevelRecord> {
    (0..table.required_filter_stages())
        .filter_map(|level| {
            let span = table.span(level)?;
            Some(LevelRecord {
                level,
                sigma: table.sigma(level)?,
                span,
                taps: half_taps(table.incremental_row(level)?, span),
            })
        })
        .collect()
}

#[cfg(feature = "absolute-sigma")]
fn absolute_records(table: &GaussTable) -> Vec<LevelRecord> {
    (2..table.required_filter_stages())
        .filter_map(|level| {
            let span = table.abs_span(level)?;
            Some(LevelRecord {
                level,
                sigma: table.abs_sigma(level)?,
                span,
                taps: half_taps(table.from_level1_row(level)?, span),
            })
        })
        .collect()
}

#[cfg(not(feature = "absolute-sigma"))]
fn absolute_records(_table: &GaussTable) -> Vec<LevelRecord> {
    Vec::new()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("gausstable=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;

    let gauss = GaussConfig::default()
        .with_span_mode(config.span_mode.0)
        .with_initial_blur(config.initial_blur);
    let published = init_filter(&gauss, config.sigma0, config.levels)?;
    let table = published.table();

    if cli.print_tables {
        eprint!("{table}");
    }

    let output = Output {
        epoch: published.epoch(),
        initial_sigma: table.initial_sigma(),
        required_filter_stages: table.required_filter_stages(),
        incremental: incremental_records(table),
        from_level_1: absolute_records(table),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => {
            fs::write(&path, json)?;
            tracing::info!(path = %path, "wrote gauss table");
        }
        None => println!("{json}"),
    }

    Ok(())
}
