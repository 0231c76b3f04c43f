use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use gts_monitor::apis::{DatasetFile, MapApiClient};
use gts_monitor::config::Config;
use gts_monitor::constants;
use gts_monitor::domain::{ObjectKind, TechnicalCondition};
use gts_monitor::legend::PRIORITIES;
use gts_monitor::logging;
use gts_monitor::pipeline::processing::aggregate::{
    self, ConditionFilter, FilterSpec, PriorityFilter, RegionFilter, SortOrder,
};
use gts_monitor::pipeline::MapPipeline;
use gts_monitor::types::{RawCollections, RecordSource, SourceQuery};

#[derive(Parser)]
#[command(name = "gts_monitor")]
#[command(about = "Water body and hydro-facility map data: normalization, priorities, summaries")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = constants::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print summary counts for the visible objects
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the visible objects as JSON
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// priority_desc, priority_asc, name_asc, name_desc, condition_desc, condition_asc
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Print regional, priority and condition distributions of water bodies and facilities as JSON
    Regions {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the condition and priority legend
    Legend,
    /// Download all collections from the backend into a dataset file
    Fetch {
        /// Output path (defaults to data.dataset_path from config)
        #[arg(long)]
        output: Option<String>,
        /// Region passed through to the backend
        #[arg(long)]
        region: Option<String>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Dataset file to read (defaults to data.dataset_path from config)
    #[arg(long)]
    input: Option<String>,
    /// Read from the backend instead of a dataset file
    #[arg(long)]
    from_api: bool,
    /// Year used for passport age (defaults to config, then the local clock)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive name search
    #[arg(long)]
    search: Option<String>,
    /// Exact region name, or "all"
    #[arg(long, default_value = constants::FILTER_ALL)]
    region: String,
    /// Technical condition 1-5, or "all"
    #[arg(long, default_value = constants::FILTER_ALL)]
    condition: ConditionFilter,
    /// high, medium, low, or "all"
    #[arg(long, default_value = constants::FILTER_ALL)]
    priority: PriorityFilter,
    /// Map layers to include (comma-separated): waterBody, facility, criticalZone
    #[arg(long, value_delimiter = ',')]
    kind: Vec<ObjectKind>,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            search_text: self.search.clone(),
            region: RegionFilter::parse(&self.region),
            condition: self.condition,
            kinds: (!self.kind.is_empty()).then(|| self.kind.clone()),
            priority: self.priority,
        }
    }
}

fn current_year(source: &SourceArgs, config: &Config) -> i32 {
    source
        .year
        .or(config.current_year)
        .unwrap_or_else(|| chrono::Local::now().year())
}

async fn load_raw(source: &SourceArgs, config: &Config) -> Result<RawCollections> {
    if source.from_api {
        let client = MapApiClient::from_config(&config.api)?;
        info!(base_url = %config.api.base_url, "loading records from backend");
        return client
            .fetch_all(&SourceQuery::default())
            .await
            .context("failed to fetch records from backend");
    }

    let path = source
        .input
        .clone()
        .unwrap_or_else(|| config.data.dataset_path.clone());
    DatasetFile::new(&path)
        .load()
        .await
        .with_context(|| format!("failed to read dataset '{}'", path))
}

fn print_summary(result: &gts_monitor::PipelineResult) {
    let counts = &result.aggregate.counts;
    println!("\n📊 Map summary:");
    println!("   Records received: {}", result.total_records);
    println!("   Dropped: {}", result.dropped.len());
    println!("   Conditions defaulted: {}", result.coerced_conditions());
    println!("   Visible: {}", counts.total);
    println!(
        "     {}: {}  {}: {}  {}: {}",
        ObjectKind::WaterBody.label(),
        counts.by_kind.water_bodies,
        ObjectKind::Facility.label(),
        counts.by_kind.facilities,
        ObjectKind::CriticalZone.label(),
        counts.by_kind.critical_zones
    );
    println!(
        "   Condition bands: good {} / medium {} / bad {}",
        counts.by_condition_band.good, counts.by_condition_band.medium, counts.by_condition_band.bad
    );
    println!("   High priority: {}", counts.high_priority_count);

    if !result.dropped.is_empty() {
        println!("\n⚠️  Dropped records:");
        for dropped in &result.dropped {
            println!(
                "   - {} #{} (id: {}): {:?}",
                dropped.kind,
                dropped.index,
                dropped.id.as_deref().unwrap_or("-"),
                dropped.reason
            );
        }
    }
}

fn print_legend() {
    println!("Technical condition:");
    for condition in TechnicalCondition::all() {
        let info = condition.info();
        println!("  {} {}  {} — {}", info.level, info.color, info.label, info.description);
    }
    println!("\nPriority = (6 - condition) × 3 + passport age; ≥12 high, 6-11 medium, <6 low");
    for info in &PRIORITIES {
        println!("  {:<6} {}  {} — {}", info.level.as_str(), info.color, info.label, info.description);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Summary { source, filter } => {
            let raw = load_raw(&source, &config).await?;
            let result = MapPipeline::new(current_year(&source, &config)).run(&raw, &filter.to_spec());
            print_summary(&result);
        }
        Commands::List { source, filter, sort } => {
            let raw = load_raw(&source, &config).await?;
            let mut result = MapPipeline::new(current_year(&source, &config)).run(&raw, &filter.to_spec());
            if let Some(order) = sort {
                aggregate::sort_objects(&mut result.aggregate.visible, order);
            }
            println!("{}", serde_json::to_string_pretty(&result.aggregate)?);
        }
        Commands::Regions { source } => {
            let raw = load_raw(&source, &config).await?;
            let filter = FilterSpec::kinds_only(&ObjectKind::PASSPORTED);
            let result = MapPipeline::new(current_year(&source, &config)).run(&raw, &filter);
            let objects = result.aggregate.visible;
            let distribution = serde_json::json!({
                "regions": aggregate::regional_distribution(&objects),
                "priority": aggregate::priority_distribution(&objects),
                "condition": aggregate::condition_distribution(&objects),
            });
            println!("{}", serde_json::to_string_pretty(&distribution)?);
        }
        Commands::Legend => print_legend(),
        Commands::Fetch { output, region } => {
            let client = MapApiClient::from_config(&config.api)?;
            let query = SourceQuery {
                region,
                condition: None,
            };
            let collections = client.fetch_all(&query).await?;
            let path = output.unwrap_or_else(|| config.data.dataset_path.clone());
            DatasetFile::new(&path).save(&collections).await?;
            println!("✅ Saved {} records to {}", collections.total_records(), path);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Command failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
