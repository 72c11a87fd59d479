//! CLI entry point for the health dataset engine.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use health_data::{
    Aggregation, ChartRequest, CleaningConfig, ColumnStatistics, DatasetMetadata, DatasetService,
    MissingValueStrategy, ServiceConfig, charts, store::InMemoryStore,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[cfg(feature = "ai")]
use health_data::ai::AnthropicProvider;
#[cfg(feature = "ai")]
use std::sync::Arc;

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Drop rows with a missing value
    Remove,
    /// Use the column mean
    Mean,
    /// Use the column median
    Median,
    /// Use the most frequent value
    Mode,
    /// Use zero
    Zero,
}

impl From<CliMissingStrategy> for MissingValueStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Remove => MissingValueStrategy::Remove,
            CliMissingStrategy::Mean => MissingValueStrategy::Mean,
            CliMissingStrategy::Median => MissingValueStrategy::Median,
            CliMissingStrategy::Mode => MissingValueStrategy::Mode,
            CliMissingStrategy::Zero => MissingValueStrategy::Zero,
        }
    }
}

/// CLI-compatible aggregation enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl From<CliAggregation> for Aggregation {
    fn from(cli: CliAggregation) -> Self {
        match cli {
            CliAggregation::Sum => Aggregation::Sum,
            CliAggregation::Avg => Aggregation::Avg,
            CliAggregation::Count => Aggregation::Count,
            CliAggregation::Min => Aggregation::Min,
            CliAggregation::Max => Aggregation::Max,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Heatmap,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistics, cleaning and chart data for health datasets",
    long_about = "Profile, clean and chart tabular health datasets.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ANTHROPIC_API_KEY    API key for the insights command (CLAUDE_API_KEY also accepted)\n\n\
                  EXAMPLES:\n  \
                  # Column statistics\n  \
                  health-data profile heart.csv\n\n  \
                  # Drop duplicates, fill gaps with the median, z-score two columns\n  \
                  health-data clean heart.csv --remove-duplicates --missing median \\\n    \
                  --standardize chol,trestbps -o heart_clean.csv\n\n  \
                  # Average cholesterol per chest pain type\n  \
                  health-data chart heart.csv --type bar --category cp --value chol --aggregation avg"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the JSON result is written.
    #[arg(long, global = true)]
    json: bool,

    /// Fail on rows whose field count differs from the header
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show inferred column types and summary statistics
    Profile {
        /// Dataset file (.csv, .data, .txt, ...)
        input: PathBuf,
    },

    /// Clean a dataset and write the result as CSV
    Clean(CleanArgs),

    /// Generate chart data
    Chart(ChartArgs),

    /// Ask the AI provider for an analysis of the dataset
    Insights {
        /// Dataset file (.csv, .data, .txt, ...)
        input: PathBuf,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Dataset file (.csv, .data, .txt, ...)
    input: PathBuf,

    /// Remove exact duplicate rows
    #[arg(long)]
    remove_duplicates: bool,

    /// Strategy for missing values (omit to leave them untouched)
    #[arg(long, value_enum)]
    missing: Option<CliMissingStrategy>,

    /// Comma-separated columns to z-score
    #[arg(long, value_delimiter = ',')]
    standardize: Vec<String>,

    /// Output CSV path (defaults to <input>_cleaned.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Dataset file (.csv, .data, .txt, ...)
    input: PathBuf,

    /// Chart type
    #[arg(long = "type", value_enum)]
    chart_type: CliChartType,

    /// Category field (bar, pie)
    #[arg(long, default_value = "")]
    category: String,

    /// Value field (bar, pie, heatmap)
    #[arg(long, default_value = "")]
    value: String,

    /// Aggregation (bar: default sum, line: default avg)
    #[arg(long, value_enum)]
    aggregation: Option<CliAggregation>,

    /// Time field (line)
    #[arg(long, default_value = "")]
    time: String,

    /// Comma-separated value fields (line)
    #[arg(long, value_delimiter = ',')]
    values: Vec<String>,

    /// X field (scatter)
    #[arg(long, default_value = "")]
    x: String,

    /// Y field (scatter)
    #[arg(long, default_value = "")]
    y: String,

    /// Label field (scatter)
    #[arg(long)]
    label: Option<String>,

    /// Size field (scatter)
    #[arg(long)]
    size: Option<String>,

    /// Row field (heatmap)
    #[arg(long, default_value = "")]
    row: String,

    /// Column field (heatmap)
    #[arg(long, default_value = "")]
    column: String,
}

impl ChartArgs {
    fn request(&self) -> ChartRequest {
        match self.chart_type {
            CliChartType::Bar => ChartRequest::Bar {
                category_field: self.category.clone(),
                value_field: self.value.clone(),
                aggregation: self.aggregation.map(Into::into).unwrap_or_default(),
            },
            CliChartType::Line => ChartRequest::Line {
                time_field: self.time.clone(),
                value_fields: self.values.clone(),
                aggregation: self.aggregation.map(Into::into),
            },
            CliChartType::Pie => ChartRequest::Pie {
                category_field: self.category.clone(),
                value_field: self.value.clone(),
            },
            CliChartType::Scatter => ChartRequest::Scatter {
                x_field: self.x.clone(),
                y_field: self.y.clone(),
                label_field: self.label.clone(),
                size_field: self.size.clone(),
            },
            CliChartType::Heatmap => ChartRequest::Heatmap {
                row_field: self.row.clone(),
                column_field: self.column.clone(),
                value_field: self.value.clone(),
            },
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = ServiceConfig {
        strict_parsing: cli.strict,
        ..ServiceConfig::default()
    };
    let service = DatasetService::new(InMemoryStore::new(), config)?;

    match &cli.command {
        Command::Profile { input } => {
            let metadata = load(&service, input)?;
            if cli.json {
                print_json(&metadata)
            } else {
                print_profile(&metadata);
                Ok(())
            }
        }
        Command::Clean(args) => run_clean(&service, args, cli.json),
        Command::Chart(args) => {
            let metadata = load(&service, &args.input)?;
            let result = service.chart(&metadata.id, &args.request())?;
            print_json(&charts::chart_json(&result)?)?;
            result.map(|_| ()).map_err(|e| anyhow!("{}", e))
        }
        Command::Insights { input, model } => {
            let service = with_provider(service, model.as_deref())?;
            let metadata = load(&service, input)?;
            let analysis = service.analyze(&metadata.id)?;
            if cli.json {
                print_json(&serde_json::json!({ "analysis": analysis }))
            } else {
                println!("{}", analysis);
                Ok(())
            }
        }
    }
}

fn load(service: &DatasetService, input: &Path) -> Result<DatasetMetadata> {
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    let bytes = std::fs::read(input).with_context(|| format!("Reading {}", input.display()))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    info!("Loading dataset from: {}", input.display());
    let metadata = service.upload(&bytes, &file_name, None)?;
    info!(
        "Dataset loaded successfully: {} rows, {} columns",
        metadata.row_count,
        metadata.column_types.len()
    );
    Ok(metadata)
}

fn run_clean(service: &DatasetService, args: &CleanArgs, json: bool) -> Result<()> {
    let metadata = load(service, &args.input)?;

    let mut builder = CleaningConfig::builder().remove_duplicates(args.remove_duplicates);
    if let Some(strategy) = args.missing {
        builder = builder.missing_values(strategy.into());
    }
    if !args.standardize.is_empty() {
        builder = builder.standardize(args.standardize.iter().cloned());
    }
    let config = builder.build()?;

    let outcome = service.clean(&metadata.id, &config)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    std::fs::write(&output, service.download_csv(&metadata.id)?)
        .with_context(|| format!("Writing {}", output.display()))?;
    info!("Saved cleaned dataset to: {}", output.display());

    if json {
        return print_json(&outcome);
    }

    println!("Rows: {} -> {}", outcome.rows_before, outcome.rows_after);
    for action in &outcome.actions {
        println!("  - {}", action);
    }
    println!("Output: {}", output.display());
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    input.with_file_name(format!("{}_cleaned.csv", stem))
}

/// Human-readable column table.
///
/// Uses `println!` intentionally: this is the command's output, not a log.
fn print_profile(metadata: &DatasetMetadata) {
    println!("\n{}", "=".repeat(80));
    println!("{} ({} rows)", metadata.name, metadata.row_count);
    println!("{}\n", "=".repeat(80));

    println!(
        "{:<20} {:<10} {:<8} {:<8} {:<30}",
        "Column", "Type", "Count", "Missing", "Summary"
    );
    println!("{}", "-".repeat(80));

    for (name, stats) in &metadata.summary {
        let column_type = metadata
            .column_types
            .get(name)
            .map(|t| t.as_str())
            .unwrap_or("-");
        let detail = match stats {
            ColumnStatistics::Numeric(n) => format!(
                "mean {:.2}, median {:.2}, sd {:.2}, outliers {}",
                n.mean, n.median, n.std_dev, n.outlier_count
            ),
            ColumnStatistics::Categorical(c) => format!(
                "{} unique, mode {} ({:.1}%)",
                c.unique_count,
                c.mode.as_deref().unwrap_or("-"),
                c.mode_percentage
            ),
        };
        println!(
            "{:<20} {:<10} {:<8} {:<8} {:<30}",
            truncate_str(name, 19),
            column_type,
            stats.count(),
            stats.missing_count(),
            detail
        );
    }
    println!();
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(feature = "ai")]
fn api_key_from_env() -> Option<String> {
    ["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}

#[cfg(feature = "ai")]
fn with_provider(service: DatasetService, model: Option<&str>) -> Result<DatasetService> {
    use health_data::ai::AnthropicConfig;

    let api_key =
        api_key_from_env().ok_or_else(|| anyhow!("ANTHROPIC_API_KEY is not set"))?;
    let mut config = AnthropicConfig::builder();
    if let Some(model) = model {
        config = config.model(model);
    }

    info!("Requesting insights from Anthropic");
    let provider = Arc::new(AnthropicProvider::with_config(api_key, config.build())?);
    Ok(service.with_ai_provider(provider))
}

/// Fallback when the "ai" feature is disabled
#[cfg(not(feature = "ai"))]
fn with_provider(_service: DatasetService, _model: Option<&str>) -> Result<DatasetService> {
    Err(anyhow!(
        "AI support not compiled in. Compile with --features ai to enable the insights command."
    ))
}
